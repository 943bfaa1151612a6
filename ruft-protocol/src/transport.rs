//! Datagram transport seam
//!
//! The engines never touch sockets directly; they drive any implementation
//! of [`Datagram`]. `ruft-io` provides the UDP implementation, tests provide
//! in-memory ones.

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Transport-level failures
///
/// A receive timeout is not represented here: it is the expected signal that
/// no datagram is currently available, and surfaces as `Ok(None)` from
/// [`Datagram::recv_timeout`]. Anything that reaches this type aborts the
/// transfer.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address")]
    InvalidAddress,
}

/// Unreliable, unordered datagram transmission
pub trait Datagram {
    /// Send one datagram to the given address
    fn send_to(&mut self, buf: &[u8], target: SocketAddr) -> Result<usize, TransportError>;

    /// Wait up to `timeout` for one datagram
    ///
    /// Returns `Ok(None)` when the timeout elapses without a datagram,
    /// `Ok(Some((len, source)))` on receipt, and `Err` only for fatal
    /// transport failures.
    fn recv_timeout(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<Option<(usize, SocketAddr)>, TransportError>;
}
