//! Wi-Fi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the hexagonal boundary for network
//! connectivity. Every call returns promptly; association progress is
//! observed by polling [`status`](ConnectivityPort::status) from the
//! control loop and the link FSM decides what to do about it.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF Wi-Fi driver via
//!   `esp_idf_svc::wifi::EspWifi`, with an optional fixed-address STA netif.
//! - **all other targets**: a scripted simulation for host-side tests. An
//!   association walks `Associating → Associated → IP ready` over three
//!   polls unless the test has asked it to fail.

use log::{info, warn};

use crate::app::credentials::{MAX_PASSWORD_LEN, MAX_SSID_LEN, validate_password, validate_ssid};
use crate::app::ports::{ConnectivityPort, LinkStatus};
use crate::error::LinkError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// Simulation script
// ───────────────────────────────────────────────────────────────

/// How the simulated access point answers the next association.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimOutcome {
    /// Associate and obtain an address.
    #[default]
    Accept,
    /// Refuse the association (wrong password, AP gone).
    Reject,
    /// Associate but never obtain an address.
    NoAddress,
    /// Stay in `Associating` forever.
    Hang,
}

// ───────────────────────────────────────────────────────────────
// Wi-Fi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    ssid: heapless::String<MAX_SSID_LEN>,
    password: heapless::String<MAX_PASSWORD_LEN>,
    status: LinkStatus,
    #[cfg(target_os = "espidf")]
    driver: EspWifi<'static>,
    #[cfg(target_os = "espidf")]
    started: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_outcome: SimOutcome,
    #[cfg(not(target_os = "espidf"))]
    sim_polls: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_associations: u32,
}

#[cfg(target_os = "espidf")]
impl WifiAdapter {
    /// Wrap an initialised driver. A static STA netif, if any, must already
    /// be swapped in by the caller.
    pub fn new(driver: EspWifi<'static>) -> Self {
        Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            status: LinkStatus::Down,
            driver,
            started: false,
        }
    }

    fn platform_begin(&mut self) -> Result<(), LinkError> {
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let conf = Configuration::Client(ClientConfiguration {
            ssid: self.ssid.as_str().try_into().map_err(|_| LinkError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| LinkError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });
        self.driver.set_configuration(&conf).map_err(|e| {
            warn!("WiFi: set_configuration failed: {}", e);
            LinkError::AssociationFailed
        })?;
        if !self.started {
            self.driver.start().map_err(|e| {
                warn!("WiFi: driver start failed: {}", e);
                LinkError::AssociationFailed
            })?;
            self.started = true;
        }
        self.driver.connect().map_err(|e| {
            warn!("WiFi: connect failed: {}", e);
            LinkError::AssociationFailed
        })
    }

    fn platform_poll(&mut self) -> LinkStatus {
        let associated = self.driver.is_connected().unwrap_or(false);
        let ip_ready = associated && self.driver.sta_netif().is_up().unwrap_or(false);
        match (self.status, associated) {
            (LinkStatus::Down, _) | (LinkStatus::Failed, _) => self.status,
            (_, true) => LinkStatus::Associated { ip_ready },
            // Was associated, now dropped.
            (LinkStatus::Associated { .. }, false) => LinkStatus::Down,
            (LinkStatus::Associating, false) => LinkStatus::Associating,
        }
    }

    fn platform_disconnect(&mut self) {
        if let Err(e) = self.driver.disconnect() {
            warn!("WiFi: disconnect returned {}", e);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl WifiAdapter {
    pub fn new() -> Self {
        Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            status: LinkStatus::Down,
            sim_outcome: SimOutcome::Accept,
            sim_polls: 0,
            sim_associations: 0,
        }
    }

    /// Script the answer to the next association attempt.
    pub fn sim_set_outcome(&mut self, outcome: SimOutcome) {
        self.sim_outcome = outcome;
    }

    /// Drop an established association, as if the AP went away.
    pub fn sim_drop_link(&mut self) {
        if matches!(self.status, LinkStatus::Associated { .. }) {
            warn!("WiFi(sim): link dropped");
            self.status = LinkStatus::Down;
        }
    }

    /// Association attempts started since construction.
    pub fn sim_associations(&self) -> u32 {
        self.sim_associations
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    fn platform_begin(&mut self) -> Result<(), LinkError> {
        self.sim_associations += 1;
        self.sim_polls = 0;
        info!("WiFi(sim): associating with '{}' (attempt {})", self.ssid, self.sim_associations);
        Ok(())
    }

    fn platform_poll(&mut self) -> LinkStatus {
        if self.status != LinkStatus::Associating
            && self.status != (LinkStatus::Associated { ip_ready: false })
        {
            return self.status;
        }
        self.sim_polls += 1;
        match (self.sim_outcome, self.sim_polls) {
            (SimOutcome::Hang, _) | (_, 1) => LinkStatus::Associating,
            (SimOutcome::Reject, _) => LinkStatus::Failed,
            (SimOutcome::NoAddress, _) | (SimOutcome::Accept, 2) => {
                LinkStatus::Associated { ip_ready: false }
            }
            (SimOutcome::Accept, _) => LinkStatus::Associated { ip_ready: true },
        }
    }

    fn platform_disconnect(&mut self) {
        info!("WiFi(sim): disconnected");
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), LinkError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|()| LinkError::InvalidSsid)?;
        self.password.clear();
        self.password
            .push_str(password)
            .map_err(|()| LinkError::InvalidPassword)?;
        info!("WiFi: credentials updated (SSID='{}')", self.ssid);
        Ok(())
    }

    fn has_credentials(&self) -> bool {
        !self.ssid.is_empty()
    }

    fn clear_credentials(&mut self) {
        self.disconnect();
        self.ssid.clear();
        self.password.clear();
        info!("WiFi: credentials cleared");
    }

    fn begin_association(&mut self) -> Result<(), LinkError> {
        if self.ssid.is_empty() {
            return Err(LinkError::NoCredentials);
        }
        info!("WiFi: associating with '{}'", self.ssid);
        self.status = LinkStatus::Associating;
        if let Err(e) = self.platform_begin() {
            self.status = LinkStatus::Failed;
            return Err(e);
        }
        Ok(())
    }

    fn status(&mut self) -> LinkStatus {
        let next = self.platform_poll();
        if next != self.status {
            info!("WiFi: {:?} -> {:?}", self.status, next);
            self.status = next;
        }
        self.status
    }

    fn disconnect(&mut self) {
        if self.status != LinkStatus::Down {
            self.platform_disconnect();
            self.status = LinkStatus::Down;
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_ssid() {
        let mut a = WifiAdapter::new();
        assert_eq!(a.set_credentials("", "password123"), Err(LinkError::InvalidSsid));
    }

    #[test]
    fn rejects_short_password() {
        let mut a = WifiAdapter::new();
        assert_eq!(a.set_credentials("MyNet", "short"), Err(LinkError::InvalidPassword));
    }

    #[test]
    fn associate_without_credentials_fails() {
        let mut a = WifiAdapter::new();
        assert_eq!(a.begin_association(), Err(LinkError::NoCredentials));
        assert_eq!(a.status(), LinkStatus::Down);
    }

    #[test]
    fn accepted_association_reaches_ip_ready() {
        let mut a = WifiAdapter::new();
        a.set_credentials("Bench", "relaybench1").unwrap();
        a.begin_association().unwrap();
        assert_eq!(a.status(), LinkStatus::Associating);
        assert_eq!(a.status(), LinkStatus::Associated { ip_ready: false });
        assert_eq!(a.status(), LinkStatus::Associated { ip_ready: true });
        assert_eq!(a.status(), LinkStatus::Associated { ip_ready: true });
    }

    #[test]
    fn rejected_association_fails() {
        let mut a = WifiAdapter::new();
        a.set_credentials("Bench", "relaybench1").unwrap();
        a.sim_set_outcome(SimOutcome::Reject);
        a.begin_association().unwrap();
        a.status();
        assert_eq!(a.status(), LinkStatus::Failed);
    }

    #[test]
    fn dropped_link_reads_down() {
        let mut a = WifiAdapter::new();
        a.set_credentials("Bench", "").unwrap();
        a.begin_association().unwrap();
        for _ in 0..3 {
            a.status();
        }
        a.sim_drop_link();
        assert_eq!(a.status(), LinkStatus::Down);
    }

    #[test]
    fn clearing_credentials_disconnects() {
        let mut a = WifiAdapter::new();
        a.set_credentials("Bench", "").unwrap();
        a.begin_association().unwrap();
        a.clear_credentials();
        assert!(!a.has_credentials());
        assert_eq!(a.status(), LinkStatus::Down);
    }
}
