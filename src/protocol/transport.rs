//! Datagram transport abstraction.
//!
//! Concrete implementations:
//! - UDP socket bound on the station interface (`adapters::udp`)
//! - in-memory mocks in the integration tests
//!
//! The control loop is generic over `DatagramTransport`; nothing above this
//! trait knows about sockets.

use core::net::SocketAddr;

/// Connectionless, message-oriented channel.
pub trait DatagramTransport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Start listening on `port`. Opening an already-open transport rebinds.
    fn open(&mut self, port: u16) -> Result<(), Self::Error>;

    /// Stop listening. Closing a closed transport is a no-op.
    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Receive at most one datagram into `buf` without blocking.
    ///
    /// Returns `Ok(None)` when nothing is pending. A datagram larger than
    /// `buf` is truncated to `buf.len()`.
    fn recv(&mut self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>, Self::Error>;

    /// Send one datagram to `addr`.
    fn send_to(&mut self, data: &[u8], addr: SocketAddr) -> Result<(), Self::Error>;
}

/// A transport that is never open and never receives anything.
/// Used before the link reaches `Running` in bring-up builds.
pub struct NullTransport;

impl DatagramTransport for NullTransport {
    type Error = ();

    fn open(&mut self, _port: u16) -> Result<(), ()> {
        Err(())
    }

    fn close(&mut self) {}

    fn is_open(&self) -> bool {
        false
    }

    fn recv(&mut self, _buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>, ()> {
        Ok(None)
    }

    fn send_to(&mut self, _data: &[u8], _addr: SocketAddr) -> Result<(), ()> {
        Ok(())
    }
}
