//! Mock adapters for integration tests.
//!
//! Records every relay write, datagram and event so tests can assert on the
//! full history without touching real GPIO, sockets or flash.

use std::collections::VecDeque;
use std::net::SocketAddr;

use relayx4::adapters::nvs::NvsAdapter;
use relayx4::app::events::AppEvent;
use relayx4::app::ports::{EventSink, InputPort, InputSnapshot, OutputPort, StoragePort};
use relayx4::error::StoreError;
use relayx4::protocol::DatagramTransport;
use relayx4::registry::Relay;

// ── MockHardware ──────────────────────────────────────────────

/// Relay coils plus switch levels the test sets directly.
#[derive(Debug, Default)]
pub struct MockHardware {
    pub coils: [bool; 4],
    pub writes: Vec<(Relay, bool)>,
    pub inputs: InputSnapshot,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coil(&self, relay: Relay) -> bool {
        self.coils[relay.index()]
    }

    /// Close or open the shared limit line.
    pub fn set_limit(&mut self, closed: bool) {
        self.inputs.top_raw = closed;
        self.inputs.bottom_raw = closed;
    }

    /// Close or open the function-mode selector.
    pub fn set_selector(&mut self, closed: bool) {
        self.inputs.func_mode = closed;
    }
}

impl OutputPort for MockHardware {
    fn set_relay(&mut self, relay: Relay, energised: bool) {
        self.coils[relay.index()] = energised;
        self.writes.push((relay, energised));
    }
}

impl InputPort for MockHardware {
    fn read_inputs(&mut self) -> InputSnapshot {
        self.inputs
    }
}

// ── MockTransport ─────────────────────────────────────────────

pub fn peer() -> SocketAddr {
    SocketAddr::from(([192, 168, 137, 1], 50_000))
}

#[derive(Debug, Default)]
pub struct MockTransport {
    pub port: Option<u16>,
    pub inbox: VecDeque<Vec<u8>>,
    pub sent: Vec<(Vec<u8>, SocketAddr)>,
    pub refuse_open: bool,
    pub opens: u32,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, packet: &[u8]) {
        self.inbox.push_back(packet.to_vec());
    }

    pub fn last_reply(&self) -> Option<&[u8]> {
        self.sent.last().map(|(bytes, _)| bytes.as_slice())
    }
}

impl DatagramTransport for MockTransport {
    type Error = &'static str;

    fn open(&mut self, port: u16) -> Result<(), &'static str> {
        if self.refuse_open {
            return Err("address in use");
        }
        self.opens += 1;
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) {
        self.port = None;
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>, &'static str> {
        let Some(packet) = self.inbox.pop_front() else {
            return Ok(None);
        };
        let len = packet.len().min(buf.len());
        buf[..len].copy_from_slice(&packet[..len]);
        Ok(Some((len, peer())))
    }

    fn send_to(&mut self, data: &[u8], addr: SocketAddr) -> Result<(), &'static str> {
        self.sent.push((data.to_vec(), addr));
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saw(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── FlakyStore ────────────────────────────────────────────────

/// Simulated NVS whose writes can be made to fail.
pub struct FlakyStore {
    pub inner: NvsAdapter,
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: NvsAdapter::new().expect("sim NVS"),
            fail_writes: false,
        }
    }
}

impl StoragePort for FlakyStore {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StoreError> {
        self.inner.read(namespace, key, buf)
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Io);
        }
        self.inner.write(namespace, key, data)
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StoreError> {
        self.inner.delete(namespace, key)
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.inner.exists(namespace, key)
    }
}
