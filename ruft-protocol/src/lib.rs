//! RUFT Protocol Core Implementation
//!
//! This crate implements the core of RUFT (Reliable UDP File Transfer): the
//! packet/acknowledgment wire codec, the adaptive RTT estimator, the
//! receiver's acknowledgment-range construction, and the sender's
//! outstanding-packet bookkeeping and retransmission logic.

pub mod receiver;
pub mod rtt;
pub mod sender;
pub mod transport;
pub mod wire;

pub use receiver::{ReceiverEngine, ReceiverEvent};
pub use rtt::RttEstimator;
pub use sender::{
    LossDetection, SenderConfig, SenderEngine, SenderError, TransferState, TransferStats,
};
pub use transport::{Datagram, TransportError};
pub use wire::{Ack, Packet, WireError, ACK_SIZE, DEFAULT_SEGMENT_SIZE, END_OF_TRANSFER, HEADER_SIZE};
