//! Inbound commands to the application service.
//!
//! These come from the local operator (Wi-Fi config button) or from a
//! provisioning front-end, never from the datagram protocol.

use super::credentials::WifiCredentials;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Leave `Invalid` / `Disconnected` now instead of waiting out the backoff.
    RetryLink,

    /// Erase stored credentials and restart at `Configuring`.
    ForgetCredentials,

    /// Store new credentials and reconnect with them.
    Provision(WifiCredentials),
}
