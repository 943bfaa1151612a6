//! RUFT - Reliable UDP File Transfer
//!
//! A minimal reliable-delivery transport over unreliable, unordered
//! datagrams. This crate re-exports the public API of the protocol and I/O
//! crates.

pub use ruft_io::{AckJitter, UdpTransport};
pub use ruft_protocol::*;
