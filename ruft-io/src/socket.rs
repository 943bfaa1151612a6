//! UDP transport for RUFT
//!
//! Wraps a blocking UDP socket with per-call receive timeouts, implementing
//! the protocol's [`Datagram`] seam. A timed-out receive surfaces as
//! `Ok(None)` rather than an error, matching the engines' expectation that
//! "nothing arrived yet" drives loop continuation.

use ruft_protocol::{Datagram, TransportError};
use socket2::{Domain, Protocol, Socket, Type};
use std::io::ErrorKind;
use std::mem::MaybeUninit;
use std::net::SocketAddr;
use std::time::Duration;

/// Blocking UDP datagram transport
pub struct UdpTransport {
    inner: Socket,
    /// Read timeout currently applied to the socket
    read_timeout: Option<Duration>,
}

impl UdpTransport {
    /// Create a transport bound to the given address
    pub fn bind(addr: SocketAddr) -> Result<Self, TransportError> {
        let domain = if addr.is_ipv4() {
            Domain::IPV4
        } else {
            Domain::IPV6
        };

        let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        socket.bind(&addr.into())?;

        Ok(UdpTransport {
            inner: socket,
            read_timeout: None,
        })
    }

    /// Get the local address this socket is bound to
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.inner
            .local_addr()?
            .as_socket()
            .ok_or(TransportError::InvalidAddress)
    }

    /// Set the receive buffer size
    pub fn set_recv_buffer_size(&self, size: usize) -> Result<(), TransportError> {
        self.inner.set_recv_buffer_size(size)?;
        Ok(())
    }

    fn apply_timeout(&mut self, timeout: Duration) -> Result<(), TransportError> {
        if self.read_timeout != Some(timeout) {
            self.inner.set_read_timeout(Some(timeout))?;
            self.read_timeout = Some(timeout);
        }
        Ok(())
    }
}

impl Datagram for UdpTransport {
    fn send_to(&mut self, buf: &[u8], target: SocketAddr) -> Result<usize, TransportError> {
        Ok(self.inner.send_to(buf, &target.into())?)
    }

    fn recv_timeout(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<Option<(usize, SocketAddr)>, TransportError> {
        self.apply_timeout(timeout)?;

        // socket2 takes MaybeUninit; the buffer is already initialized
        let uninit_buf = unsafe {
            std::slice::from_raw_parts_mut(buf.as_mut_ptr() as *mut MaybeUninit<u8>, buf.len())
        };

        match self.inner.recv_from(uninit_buf) {
            Ok((n, addr)) => {
                let addr = addr.as_socket().ok_or(TransportError::InvalidAddress)?;
                Ok(Some((n, addr)))
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                Ok(None)
            }
            Err(e) => Err(TransportError::Io(e)),
        }
    }
}
