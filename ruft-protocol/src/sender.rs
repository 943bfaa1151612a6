//! Send-side engine
//!
//! Owns the full segment list, tracks per-segment send timestamps, applies
//! the RTT estimator, runs the loss-detection strategies, and drains pending
//! acknowledgments before declaring the transfer complete.

use crate::rtt::RttEstimator;
use crate::transport::{Datagram, TransportError};
use crate::wire::{Ack, Packet, DEFAULT_SEGMENT_SIZE};
use bytes::Bytes;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Default bounded-wait duration for acknowledgment receipt
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_millis(30);

/// Sentinel for "nothing acknowledged yet" in range computations
const NOTHING_ACKED: i64 = -1;

/// Sentinel for "no acknowledgment processed yet", distinct from an
/// acknowledgment whose largest value is packet 0
const NO_ACK_SEEN: i64 = -2;

/// Loss-detection strategy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossDetection {
    /// Resend in-flight packets older than the RTT-derived threshold
    Timeout,
    /// Resend unacknowledged packets below the largest acknowledged one
    OutOfOrder,
    /// Run both strategies each pass
    Both,
}

impl LossDetection {
    /// Whether the timeout strategy is active
    pub fn uses_timeout(self) -> bool {
        matches!(self, LossDetection::Timeout | LossDetection::Both)
    }

    /// Whether the out-of-order strategy is active
    pub fn uses_out_of_order(self) -> bool {
        matches!(self, LossDetection::OutOfOrder | LossDetection::Both)
    }
}

impl FromStr for LossDetection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "timeout" => Ok(LossDetection::Timeout),
            "out_of_order" => Ok(LossDetection::OutOfOrder),
            "both" => Ok(LossDetection::Both),
            other => Err(format!(
                "unknown loss detection method '{}' (expected timeout, out_of_order or both)",
                other
            )),
        }
    }
}

/// Sender configuration
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// Probability in [0, 1] that a given send is silently dropped before
    /// transmission (deliberate loss injection)
    pub loss_probability: f64,
    /// Selected loss-detection strategy
    pub loss_detection: LossDetection,
    /// Payload bytes per segment
    pub segment_size: usize,
    /// Bounded-wait duration for acknowledgment receipt
    pub receive_timeout: Duration,
}

impl Default for SenderConfig {
    fn default() -> Self {
        SenderConfig {
            loss_probability: 0.0,
            loss_detection: LossDetection::OutOfOrder,
            segment_size: DEFAULT_SEGMENT_SIZE,
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
        }
    }
}

/// Transfer lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    /// Waiting for the peer's initiation datagram
    AwaitingPeer,
    /// Sending segments in sequence order while reacting to acknowledgments
    Transmitting,
    /// Resending whatever remains unacknowledged
    Draining,
    /// All segments acknowledged, sentinel sent
    Finished,
}

/// Counters for one transfer
#[derive(Debug, Clone, Default)]
pub struct TransferStats {
    /// Data packet transmissions that reached the transport (first sends
    /// and retransmissions)
    pub packets_sent: u64,
    /// Sends suppressed by deliberate loss injection
    pub deliberate_drops: u64,
    /// Acknowledgments decoded and processed
    pub acks_received: u64,
    /// Acknowledgments discarded as malformed
    pub malformed_acks: u64,
    /// Retransmissions triggered by the timeout strategy
    pub timeout_retransmits: u64,
    /// Retransmissions triggered by the out-of-order strategy
    pub out_of_order_retransmits: u64,
    /// Retransmissions issued while draining
    pub drain_retransmits: u64,
    /// Wall-clock duration of the transfer
    pub elapsed: Duration,
}

/// Sender errors
#[derive(Error, Debug)]
pub enum SenderError {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
}

/// Send-side transfer state for one run
///
/// Owns all mutable transfer state exclusively; every method is driven from
/// a single control thread and every blocking receive is timeout-bounded.
pub struct SenderEngine {
    config: SenderConfig,
    /// All segments, indexed directly by sequence number
    segments: Vec<Packet>,
    state: TransferState,
    /// Send timestamp per sequence number sent but not yet acknowledged
    in_flight: HashMap<u32, Instant>,
    /// Acknowledged sequence numbers, seeded with the -1 sentinel
    acknowledged: HashSet<i64>,
    /// `largest_acknowledged` of the most recent processed acknowledgment
    last_largest_acknowledged: i64,
    rtt: RttEstimator,
    stats: TransferStats,
}

impl SenderEngine {
    /// Create a new engine with no payload loaded
    pub fn new(config: SenderConfig) -> Self {
        let mut acknowledged = HashSet::new();
        acknowledged.insert(NOTHING_ACKED);

        SenderEngine {
            config,
            segments: Vec::new(),
            state: TransferState::AwaitingPeer,
            in_flight: HashMap::new(),
            acknowledged,
            last_largest_acknowledged: NO_ACK_SEEN,
            rtt: RttEstimator::new(),
            stats: TransferStats::default(),
        }
    }

    /// Segment a payload into sequenced packets
    ///
    /// Sequence numbers are assigned contiguously from 0; the final segment
    /// may be shorter than the configured segment size. A zero segment size
    /// is treated as 1. Segments are immutable once created.
    pub fn load_payload(&mut self, data: &[u8]) {
        let payload = Bytes::copy_from_slice(data);
        let size = self.config.segment_size.max(1);

        let count = (data.len() + size - 1) / size;
        self.segments = (0..count)
            .map(|i| {
                let start = i * size;
                let end = (start + size).min(payload.len());
                Packet::new(i as u32, payload.slice(start..end))
            })
            .collect();

        info!(
            segments = self.segments.len(),
            bytes = data.len(),
            "payload loaded"
        );
    }

    /// Number of segments loaded
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Current lifecycle state
    pub fn state(&self) -> TransferState {
        self.state
    }

    /// Transfer counters
    pub fn stats(&self) -> &TransferStats {
        &self.stats
    }

    /// RTT estimator state
    pub fn rtt(&self) -> &RttEstimator {
        &self.rtt
    }

    /// Whether every loaded segment has been acknowledged
    pub fn is_complete(&self) -> bool {
        (0..self.segments.len() as u32).all(|seq| self.acknowledged.contains(&i64::from(seq)))
    }

    /// Run the transfer to completion
    ///
    /// Blocks until every segment is acknowledged and the end-of-transfer
    /// sentinel has been sent. Receive timeouts drive loop continuation and
    /// malformed acknowledgments are discarded; only transport failures
    /// abort the run.
    pub fn run<T: Datagram>(&mut self, transport: &mut T) -> Result<TransferStats, SenderError> {
        let peer = self.await_peer(transport)?;
        let start = Instant::now();

        self.state = TransferState::Transmitting;
        for seq in 0..self.segments.len() as u32 {
            self.send_segment(transport, peer, seq)?;
            self.detect_lost_packets(transport, peer)?;
            self.poll_ack(transport)?;
        }

        self.state = TransferState::Draining;
        self.drain(transport, peer)?;
        self.stats.elapsed = start.elapsed();

        transport.send_to(&Packet::end_of_transfer().to_bytes(), peer)?;
        self.state = TransferState::Finished;
        info!(
            elapsed = ?self.stats.elapsed,
            sent = self.stats.packets_sent,
            dropped = self.stats.deliberate_drops,
            "transfer finished"
        );

        Ok(self.stats.clone())
    }

    /// Block until a single initiation datagram reveals the peer's address
    fn await_peer<T: Datagram>(&mut self, transport: &mut T) -> Result<SocketAddr, SenderError> {
        info!("waiting for peer");
        let mut buf = [0u8; 2048];
        loop {
            if let Some((_, addr)) = transport.recv_timeout(&mut buf, self.config.receive_timeout)?
            {
                info!(peer = %addr, "peer connected");
                return Ok(addr);
            }
        }
    }

    /// Send one segment, recording its send timestamp
    ///
    /// The timestamp is recorded before the deliberate-loss decision, so a
    /// dropped send still counts as in flight and remains subject to loss
    /// detection.
    fn send_segment<T: Datagram>(
        &mut self,
        transport: &mut T,
        peer: SocketAddr,
        seq: u32,
    ) -> Result<(), SenderError> {
        self.in_flight.insert(seq, Instant::now());

        if rand::thread_rng().gen::<f64>() < self.config.loss_probability {
            trace!(seq, "deliberately dropped before transmission");
            self.stats.deliberate_drops += 1;
            return Ok(());
        }

        let packet = &self.segments[seq as usize];
        transport.send_to(&packet.to_bytes(), peer)?;
        self.stats.packets_sent += 1;
        trace!(seq, len = packet.payload.len(), "segment sent");
        Ok(())
    }

    /// Wait up to the receive timeout for one acknowledgment
    ///
    /// A timeout is the expected signal that no acknowledgment is currently
    /// available and simply returns; a malformed acknowledgment is discarded.
    fn poll_ack<T: Datagram>(&mut self, transport: &mut T) -> Result<(), SenderError> {
        let mut buf = [0u8; 64];
        let Some((len, _)) = transport.recv_timeout(&mut buf, self.config.receive_timeout)? else {
            return Ok(());
        };

        match Ack::from_bytes(&buf[..len]) {
            Ok(ack) => self.process_ack(ack),
            Err(err) => {
                warn!(%err, "discarding malformed ack");
                self.stats.malformed_acks += 1;
            }
        }
        Ok(())
    }

    /// Apply one decoded acknowledgment
    ///
    /// The RTT sample and `last_largest_acknowledged` update only when the
    /// acknowledged number was in flight, so duplicate acknowledgments leave
    /// the estimator untouched.
    fn process_ack(&mut self, ack: Ack) {
        self.stats.acks_received += 1;
        self.acknowledged.insert(i64::from(ack.ack_number));

        if let Some(sent_at) = self.in_flight.remove(&ack.ack_number) {
            let rtt = sent_at.elapsed();
            self.rtt.on_sample(rtt);
            self.last_largest_acknowledged = i64::from(ack.largest_acknowledged);
            debug!(
                ack = ack.ack_number,
                largest = ack.largest_acknowledged,
                range = ack.ack_range,
                gap = ack.gap,
                ?rtt,
                "ack processed"
            );
        } else {
            debug!(ack = ack.ack_number, "duplicate ack");
        }
    }

    /// Run the configured loss-detection strategies once
    ///
    /// Each detected loss is resent synchronously, immediately followed by a
    /// bounded wait for its acknowledgment. When both strategies are active
    /// the same sequence number may be resent twice in one pass; the
    /// receiver is idempotent, so this is harmless.
    fn detect_lost_packets<T: Datagram>(
        &mut self,
        transport: &mut T,
        peer: SocketAddr,
    ) -> Result<(), SenderError> {
        if self.config.loss_detection.uses_timeout() {
            let threshold = self.rtt.timeout_threshold();
            let mut timed_out: Vec<u32> = self
                .in_flight
                .iter()
                .filter(|(_, sent_at)| sent_at.elapsed() > threshold)
                .map(|(&seq, _)| seq)
                .collect();
            timed_out.sort_unstable();

            for seq in timed_out {
                debug!(seq, ?threshold, "timed out, resending");
                self.stats.timeout_retransmits += 1;
                self.send_segment(transport, peer, seq)?;
                self.poll_ack(transport)?;
            }
        }

        if self.config.loss_detection.uses_out_of_order() {
            for seq in self.missing_below(self.last_largest_acknowledged) {
                debug!(seq, "behind largest acknowledged, resending");
                self.stats.out_of_order_retransmits += 1;
                self.send_segment(transport, peer, seq)?;
                self.poll_ack(transport)?;
            }
        }

        Ok(())
    }

    /// Sequence numbers strictly below `limit` not yet acknowledged
    ///
    /// `limit` is clamped to the loaded segment range, so a peer claiming a
    /// largest acknowledgment beyond the transfer cannot drive resends of
    /// sequence numbers that were never sent.
    fn missing_below(&self, limit: i64) -> Vec<u32> {
        let limit = limit.max(0).min(self.segments.len() as i64) as u32;
        (0..limit)
            .filter(|&seq| !self.acknowledged.contains(&i64::from(seq)))
            .collect()
    }

    /// Resend every unacknowledged segment until none remain
    ///
    /// Covers the full sequence range, so no segment is left unacknowledged
    /// even if the main loop exits before full coverage.
    fn drain<T: Datagram>(
        &mut self,
        transport: &mut T,
        peer: SocketAddr,
    ) -> Result<(), SenderError> {
        loop {
            let missing: Vec<u32> = (0..self.segments.len() as u32)
                .filter(|&seq| !self.acknowledged.contains(&i64::from(seq)))
                .collect();
            if missing.is_empty() {
                return Ok(());
            }

            debug!(pending = missing.len(), "draining unacknowledged segments");
            for seq in missing {
                self.stats.drain_retransmits += 1;
                self.send_segment(transport, peer, seq)?;
                self.poll_ack(transport)?;
            }
        }
    }
}
