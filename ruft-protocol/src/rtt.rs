//! Adaptive round-trip-time estimation
//!
//! Maintains smoothed RTT and RTT variance from observed round trips and
//! derives the probe timeout (PTO) used to decide when an in-flight packet
//! is presumed lost.

use std::time::Duration;

/// Smoothing factor for SRTT
const ALPHA: f64 = 0.25;

/// Smoothing factor for RTT variance
const BETA: f64 = 0.25;

/// RTT estimator
///
/// A pure function of its sample history: feeding the same samples in the
/// same order always yields the same SRTT/RTTVAR/PTO.
#[derive(Debug, Clone)]
pub struct RttEstimator {
    /// Smoothed RTT (seconds); 0 until the first sample
    srtt: f64,
    /// RTT variance (seconds)
    rtt_var: f64,
    /// Probe timeout (seconds)
    pto: f64,
    /// Largest sample observed so far (seconds)
    max_sample: f64,
    /// Number of samples recorded
    sample_count: u64,
}

impl RttEstimator {
    /// Create a new estimator with no samples recorded
    pub fn new() -> Self {
        RttEstimator {
            srtt: 0.0,
            rtt_var: 0.0,
            pto: 0.0,
            max_sample: 0.0,
            sample_count: 0,
        }
    }

    /// Record an observed round trip
    ///
    /// The first sample seeds SRTT and RTTVAR directly. Subsequent samples
    /// update the variance first, using the pre-update SRTT, then SRTT.
    pub fn on_sample(&mut self, rtt: Duration) {
        let sample = rtt.as_secs_f64();

        if self.sample_count == 0 {
            self.srtt = sample;
            self.rtt_var = sample / 2.0;
        } else {
            self.rtt_var = (1.0 - BETA) * self.rtt_var + BETA * (self.srtt - sample).abs();
            self.srtt = (1.0 - ALPHA) * self.srtt + ALPHA * sample;
        }

        self.pto = self.srtt + 4.0 * self.rtt_var;
        self.max_sample = self.max_sample.max(sample);
        self.sample_count += 1;
    }

    /// Horizon after which an in-flight packet is considered lost
    ///
    /// Uses the maximum observed sample rather than the PTO alone, which
    /// tolerates one-off latency spikes at the cost of slower loss detection
    /// under sustained high loss.
    pub fn timeout_threshold(&self) -> Duration {
        Duration::from_secs_f64(self.srtt.max(self.max_sample).max(0.0))
    }

    /// Smoothed RTT
    pub fn srtt(&self) -> Duration {
        Duration::from_secs_f64(self.srtt)
    }

    /// RTT variance
    pub fn rtt_var(&self) -> Duration {
        Duration::from_secs_f64(self.rtt_var)
    }

    /// Probe timeout: SRTT + 4·RTTVAR
    pub fn pto(&self) -> Duration {
        Duration::from_secs_f64(self.pto)
    }

    /// Number of samples recorded so far
    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }
}

impl Default for RttEstimator {
    fn default() -> Self {
        Self::new()
    }
}
