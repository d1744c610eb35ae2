//! Port traits: the hexagonal boundary between the controller core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (GPIO, NVS, Wi-Fi, event sinks) implement these traits.
//! The [`AppService`](super::service::AppService) consumes them via
//! generics, so the domain core never touches hardware directly.
//!
//! The datagram transport port lives next to the codec in
//! [`protocol::transport`](crate::protocol::transport).

use crate::error::{LinkError, StoreError};
use crate::registry::Relay;

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → relay coils)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the four relay outputs.
pub trait OutputPort {
    /// Energise (`true`) or release (`false`) one relay.
    fn set_relay(&mut self, relay: Relay, energised: bool);

    /// Release every relay: safe state.
    fn all_off(&mut self) {
        for relay in Relay::ALL {
            self.set_relay(relay, false);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: switches → domain)
// ───────────────────────────────────────────────────────────────

/// Logical level of every digital input, sampled together.
///
/// `true` means the contact is closed, after polarity correction.
/// `top_raw` and `bottom_raw` are the sensor lines as wired; on boards where
/// both share a pin they always read the same and the
/// [`LimitResolver`](crate::safety::LimitResolver) decides which end is meant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    /// Function-mode selector level, reported through the registry.
    pub func_mode: bool,
    pub top_raw: bool,
    pub bottom_raw: bool,
}

/// Read-side port for the selector and limit switches.
pub trait InputPort {
    fn read_inputs(&mut self) -> InputSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage for the settings record and Wi-Fi
/// credentials.
///
/// Keys are namespaced to prevent collisions between subsystems. A single
/// `write` must be atomic: after power loss the key holds either the old or
/// the new blob. The ESP-IDF NVS API guarantees this natively.
pub trait StoragePort {
    /// Read a value. Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StoreError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StoreError>;

    /// Delete a key. Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StoreError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Connectivity port (driven adapter: domain ↔ Wi-Fi station)
// ───────────────────────────────────────────────────────────────

/// Station-side link status as reported by the Wi-Fi driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// Not associated and not trying.
    Down,
    /// Association in progress.
    Associating,
    /// Associated; `ip_ready` once DHCP or the static address is up.
    Associated { ip_ready: bool },
    /// The last association attempt was refused or failed.
    Failed,
}

/// Wi-Fi station control.
///
/// Implementations are polled; nothing here blocks for longer than a
/// driver call.
pub trait ConnectivityPort {
    /// Install credentials for the next association. Validates them first.
    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), LinkError>;

    fn has_credentials(&self) -> bool;

    /// Forget the installed credentials (and drop any association).
    fn clear_credentials(&mut self);

    /// Start associating with the configured network.
    fn begin_association(&mut self) -> Result<(), LinkError>;

    fn status(&mut self) -> LinkStatus;

    /// Drop the association (idempotent).
    fn disconnect(&mut self);
}
