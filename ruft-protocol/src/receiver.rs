//! Receive-side engine
//!
//! Consumes incoming datagrams, stores packets keyed by sequence number, and
//! constructs one acknowledgment per received packet summarizing the highest
//! contiguous run of received sequence numbers.

use crate::wire::{Ack, Packet, WireError};
use bytes::{Bytes, BytesMut};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Outcome of processing one datagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiverEvent {
    /// A data packet was recorded; send this acknowledgment to the peer
    Ack(Ack),
    /// The end-of-transfer sentinel arrived; stop processing datagrams
    EndOfTransfer,
}

/// Receive-side transfer state for one run
///
/// Packets accumulate for the duration of the transfer. Re-receiving an
/// already-stored sequence number overwrites with identical data, so the
/// engine is idempotent under retransmission.
#[derive(Debug, Default)]
pub struct ReceiverEngine {
    /// Received packets keyed by sequence number
    received: BTreeMap<u32, Bytes>,
}

impl ReceiverEngine {
    /// Create a new engine with nothing received
    pub fn new() -> Self {
        ReceiverEngine {
            received: BTreeMap::new(),
        }
    }

    /// Process one received datagram
    ///
    /// Decodes the datagram, checks for the end-of-transfer sentinel before
    /// normal packet processing, records the packet, and builds the
    /// acknowledgment for it. Decode failures are returned for the caller to
    /// discard; they never corrupt engine state.
    pub fn on_datagram(&mut self, bytes: &[u8]) -> Result<ReceiverEvent, WireError> {
        let packet = Packet::from_bytes(bytes)?;

        if packet.is_end_of_transfer() {
            debug!("end of transfer detected");
            return Ok(ReceiverEvent::EndOfTransfer);
        }

        let seq = packet.sequence_number;
        self.received.insert(seq, packet.payload);
        trace!(seq, total = self.received.len(), "packet recorded");

        Ok(ReceiverEvent::Ack(self.build_ack(seq)))
    }

    /// Build the acknowledgment triggered by packet `ack_number`
    ///
    /// Scans downward from the largest received sequence number, counting
    /// contiguous entries until the first missing one. O(largest) in the
    /// worst case, which is acceptable since it runs once per received
    /// packet and ranges are bounded by the transfer size.
    fn build_ack(&self, ack_number: u32) -> Ack {
        let largest_acknowledged = *self
            .received
            .keys()
            .next_back()
            .expect("ack is only built after a packet is recorded");

        let mut ack_range = 0u32;
        let mut gap = false;
        for seq in (0..=largest_acknowledged).rev() {
            if self.received.contains_key(&seq) {
                ack_range += 1;
            } else {
                gap = true;
                break;
            }
        }

        Ack {
            ack_number,
            largest_acknowledged,
            ack_range,
            gap,
        }
    }

    /// Number of distinct packets received so far
    pub fn packet_count(&self) -> usize {
        self.received.len()
    }

    /// Look up a stored payload by sequence number
    pub fn payload(&self, seq: u32) -> Option<&Bytes> {
        self.received.get(&seq)
    }

    /// Reassemble the stored payloads in sequence order
    ///
    /// Concatenates whatever has been received; callers wanting a complete
    /// transfer should first check that no gap remains.
    pub fn reassemble(&self) -> Bytes {
        let total: usize = self.received.values().map(Bytes::len).sum();
        let mut out = BytesMut::with_capacity(total);
        for payload in self.received.values() {
            out.extend_from_slice(payload);
        }
        out.freeze()
    }
}
