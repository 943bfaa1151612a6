//! RUFT wire format: packet and acknowledgment serialization
//!
//! A data packet is an 8-byte header (two 32-bit big-endian fields: sequence
//! number and payload length) followed by the payload bytes. An acknowledgment
//! is a fixed 16-byte message of four 32-bit big-endian fields.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Size of the packet header in bytes (sequence number + payload length)
pub const HEADER_SIZE: usize = 8;

/// Size of an acknowledgment message in bytes (4 fields × 4 bytes each)
pub const ACK_SIZE: usize = 16;

/// Default payload bytes per segment
pub const DEFAULT_SEGMENT_SIZE: usize = 5120;

/// Payload marking the end of a transfer
///
/// Recognized by content, never by sequence number: a receiver must compare
/// the decoded payload against this literal before normal packet processing.
pub const END_OF_TRANSFER: &[u8] = b"###END###";

/// A sequenced segment of the transfer payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Sequence number, contiguous from 0 in segmentation order
    pub sequence_number: u32,
    /// Segment payload (at most the configured segment size)
    pub payload: Bytes,
}

impl Packet {
    /// Create a new packet
    pub fn new(sequence_number: u32, payload: Bytes) -> Self {
        Packet {
            sequence_number,
            payload,
        }
    }

    /// Create the end-of-transfer sentinel packet
    ///
    /// The sequence number carries no meaning for sentinel packets.
    pub fn end_of_transfer() -> Self {
        Packet {
            sequence_number: 0,
            payload: Bytes::from_static(END_OF_TRANSFER),
        }
    }

    /// Check whether this packet's payload is the end-of-transfer sentinel
    pub fn is_end_of_transfer(&self) -> bool {
        self.payload == END_OF_TRANSFER
    }

    /// Total encoded size (header + payload)
    pub fn size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Serialize the packet to bytes (network byte order)
    pub fn to_bytes(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(self.size());
        buf.put_u32(self.sequence_number);
        buf.put_u32(self.payload.len() as u32);
        buf.put_slice(&self.payload);
        buf
    }

    /// Parse a packet from a received datagram
    ///
    /// Fails when fewer than [`HEADER_SIZE`] bytes are present or when the
    /// declared payload length disagrees with the bytes actually received.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        if bytes.len() < HEADER_SIZE {
            return Err(WireError::TruncatedHeader { actual: bytes.len() });
        }

        let mut buf = &bytes[..HEADER_SIZE];
        let sequence_number = buf.get_u32();
        let declared = buf.get_u32() as usize;
        let actual = bytes.len() - HEADER_SIZE;

        if declared != actual {
            return Err(WireError::PayloadLengthMismatch { declared, actual });
        }

        Ok(Packet {
            sequence_number,
            payload: Bytes::copy_from_slice(&bytes[HEADER_SIZE..]),
        })
    }
}

/// Receiver-to-sender acknowledgment
///
/// Summarizes the highest contiguous run of received sequence numbers,
/// counting downward from `largest_acknowledged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    /// Sequence number of the packet that triggered this acknowledgment
    pub ack_number: u32,
    /// Highest sequence number received so far
    pub largest_acknowledged: u32,
    /// Count of contiguous sequence numbers received, downward from
    /// `largest_acknowledged` until the first missing one
    pub ack_range: u32,
    /// Whether a missing sequence number was found before reaching 0
    pub gap: bool,
}

impl Ack {
    /// Serialize the acknowledgment to its fixed 16-byte form
    pub fn to_bytes(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(ACK_SIZE);
        buf.put_u32(self.ack_number);
        buf.put_u32(self.largest_acknowledged);
        buf.put_u32(self.ack_range);
        buf.put_u32(self.gap as u32);
        buf
    }

    /// Parse an acknowledgment from bytes
    ///
    /// Fails when fewer than [`ACK_SIZE`] bytes are supplied. Trailing bytes
    /// are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        if bytes.len() < ACK_SIZE {
            return Err(WireError::TruncatedAck { actual: bytes.len() });
        }

        let mut buf = &bytes[..ACK_SIZE];
        Ok(Ack {
            ack_number: buf.get_u32(),
            largest_acknowledged: buf.get_u32(),
            ack_range: buf.get_u32(),
            gap: buf.get_u32() != 0,
        })
    }
}

/// Wire decoding errors
#[derive(Error, Debug)]
pub enum WireError {
    #[error("malformed packet: header truncated ({actual} of {HEADER_SIZE} bytes)")]
    TruncatedHeader { actual: usize },

    #[error("malformed packet: declared payload length {declared} but received {actual}")]
    PayloadLengthMismatch { declared: usize, actual: usize },

    #[error("malformed ack: {actual} of {ACK_SIZE} bytes")]
    TruncatedAck { actual: usize },
}

impl WireError {
    /// Whether this error concerns an acknowledgment rather than a packet
    pub fn is_ack(&self) -> bool {
        matches!(self, WireError::TruncatedAck { .. })
    }
}
