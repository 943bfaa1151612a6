//! Acknowledgment send-delay jitter
//!
//! Models variable network latency on the acknowledgment path: each ack is
//! delayed by an independent, bounded random duration before transmission.
//! The delay is applied inline in the receive loop, so acknowledgments are
//! never reordered relative to their triggering packets.

use rand::Rng;
use std::time::Duration;

/// Default upper bound on the per-ack delay
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(20);

/// Bounded random delay generator
#[derive(Debug, Clone, Copy)]
pub struct AckJitter {
    max: Duration,
}

impl AckJitter {
    /// Create a jitter source with the given upper bound
    pub fn new(max: Duration) -> Self {
        AckJitter { max }
    }

    /// A jitter source that never delays
    pub fn disabled() -> Self {
        AckJitter {
            max: Duration::ZERO,
        }
    }

    /// Draw one delay
    ///
    /// The product of two uniform draws biases delays toward zero, so most
    /// acks go out quickly while the occasional one straggles.
    pub fn sample(&self) -> Duration {
        if self.max.is_zero() {
            return Duration::ZERO;
        }

        let mut rng = rand::thread_rng();
        let factor: f64 = rng.gen::<f64>() * rng.gen::<f64>();
        self.max.mul_f64(factor)
    }

    /// Upper bound on delays from this source
    pub fn max(&self) -> Duration {
        self.max
    }
}

impl Default for AckJitter {
    fn default() -> Self {
        AckJitter::new(DEFAULT_MAX_DELAY)
    }
}
