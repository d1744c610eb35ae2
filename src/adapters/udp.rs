//! UDP datagram transport adapter.
//!
//! Implements [`DatagramTransport`] over a non-blocking
//! `std::net::UdpSocket`. ESP-IDF ships a std-compatible lwIP socket layer,
//! so the same code serves the firmware and the host simulation.
//!
//! ## Connection model
//!
//! 1. `open(port)` binds `0.0.0.0:port` and switches the socket to
//!    non-blocking mode.
//! 2. `recv()` returns `Ok(None)` when nothing is pending instead of
//!    blocking the control loop.
//! 3. Replies go back to whichever peer sent the last datagram.
//! 4. `close()` drops the socket; the link FSM reopens it after the next
//!    successful association.

use core::fmt;
use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};

use log::{info, warn};

use crate::protocol::transport::DatagramTransport;

// ───────────────────────────────────────────────────────────────
// Error type
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UdpTransportError {
    /// Socket creation, bind or I/O failure.
    Io(ErrorKind),
    /// Operation requires a bound socket.
    NotOpen,
}

impl fmt::Display for UdpTransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(kind) => write!(f, "socket I/O error ({kind:?})"),
            Self::NotOpen => write!(f, "socket not open"),
        }
    }
}

impl From<std::io::Error> for UdpTransportError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.kind())
    }
}

// ───────────────────────────────────────────────────────────────
// UdpTransport
// ───────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UdpTransport {
    socket: Option<UdpSocket>,
    bind_addr: Option<Ipv4Addr>,
}

impl UdpTransport {
    /// Transport that binds on all interfaces.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport that binds on one interface only (host tests use loopback).
    pub fn bound_to(addr: Ipv4Addr) -> Self {
        Self {
            socket: None,
            bind_addr: Some(addr),
        }
    }

    /// Address actually bound, if open. Port 0 resolves to the ephemeral port.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }
}

impl DatagramTransport for UdpTransport {
    type Error = UdpTransportError;

    fn open(&mut self, port: u16) -> Result<(), UdpTransportError> {
        self.close();
        let ip = self.bind_addr.unwrap_or(Ipv4Addr::UNSPECIFIED);
        let socket = UdpSocket::bind(SocketAddrV4::new(ip, port))?;
        socket.set_nonblocking(true)?;
        info!("UDP: listening on {}", socket.local_addr()?);
        self.socket = Some(socket);
        Ok(())
    }

    fn close(&mut self) {
        if self.socket.take().is_some() {
            info!("UDP: socket closed");
        }
    }

    fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>, UdpTransportError> {
        let socket = self.socket.as_ref().ok_or(UdpTransportError::NotOpen)?;
        match socket.recv_from(buf) {
            Ok(datagram) => Ok(Some(datagram)),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => {
                warn!("UDP: recv_from failed: {}", e);
                Err(e.into())
            }
        }
    }

    fn send_to(&mut self, data: &[u8], addr: SocketAddr) -> Result<(), UdpTransportError> {
        let socket = self.socket.as_ref().ok_or(UdpTransportError::NotOpen)?;
        socket.send_to(data, addr)?;
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
