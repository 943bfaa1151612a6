//! RUFT I/O
//!
//! Datagram transport and network-simulation helpers: a socket2-backed UDP
//! implementation of the protocol's transport seam, plus the acknowledgment
//! jitter used to model variable network delay.

pub mod jitter;
pub mod socket;

pub use jitter::AckJitter;
pub use socket::UdpTransport;
