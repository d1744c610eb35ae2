//! Controller configuration parameters
//!
//! Build-time defaults for the relay controller. Operating settings that the
//! peer may change at runtime (actuation delay, code mode) live in
//! [`settings`](crate::settings) instead.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::protocol::codes::TIMER_INTERVAL_MS;
use crate::registry::Relay;
use crate::safety::LimitWiring;

/// Static IPv4 assignment for the station interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticIpv4 {
    pub ip: [u8; 4],
    pub gateway: [u8; 4],
    pub netmask: [u8; 4],
}

impl StaticIpv4 {
    /// Prefix length of `netmask` (counts the leading one bits).
    pub fn prefix_len(&self) -> u8 {
        u32::from_be_bytes(self.netmask).leading_ones() as u8
    }
}

impl Default for StaticIpv4 {
    fn default() -> Self {
        Self {
            ip: [192, 168, 137, 20],
            gateway: [192, 168, 137, 1],
            netmask: [255, 255, 255, 0],
        }
    }
}

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    // --- Network ---
    /// Local UDP port the command service listens on
    pub udp_port: u16,
    /// Fallback SSID when no credentials are stored (empty = none)
    pub wifi_ssid: String<32>,
    /// Fallback WPA2 passphrase (empty = open network)
    pub wifi_password: String<64>,
    /// `None` selects DHCP
    pub static_ip: Option<StaticIpv4>,

    // --- Link timing ---
    /// Time allowed in `Connected` before the attempt is declared failed
    pub association_timeout_ms: u32,
    /// First retry delay after `Invalid` / `Disconnected`
    pub retry_min_ms: u32,
    /// Retry delay ceiling
    pub retry_max_ms: u32,

    // --- Test-stand axis ---
    /// Motion deadline: the axis must reach a limit within this window
    pub motion_timeout_ms: u32,
    pub axis_up_relay: Relay,
    pub axis_down_relay: Relay,
    pub limit_wiring: LimitWiring,
    /// Switch contacts pull the line low when closed
    pub switch_active_low: bool,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub loop_interval_ms: u32,
    /// Wi-Fi config button hold time that forgets credentials
    pub button_long_press_ms: u32,
    /// Task watchdog timeout
    pub watchdog_timeout_ms: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            // Network
            udp_port: 4210,
            wifi_ssid: String::new(),
            wifi_password: String::new(),
            static_ip: Some(StaticIpv4::default()),

            // Link timing
            association_timeout_ms: 15_000,
            retry_min_ms: 2_000,
            retry_max_ms: 60_000,

            // Axis
            motion_timeout_ms: TIMER_INTERVAL_MS,
            axis_up_relay: Relay::R1,
            axis_down_relay: Relay::R2,
            limit_wiring: LimitWiring::Shared,
            switch_active_low: true,

            // Timing
            loop_interval_ms: 10,     // 100 Hz
            button_long_press_ms: 5_000,
            watchdog_timeout_ms: 5_000,
        }
    }
}

impl ControllerConfig {
    /// Range-check every field. Called once at boot before anything is
    /// constructed from the config.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.udp_port == 0 {
            return Err("udp_port must be non-zero");
        }
        if self.axis_up_relay == self.axis_down_relay {
            return Err("axis_up_relay and axis_down_relay must differ");
        }
        if !(1_000..=TIMER_INTERVAL_MS * 6).contains(&self.motion_timeout_ms) {
            return Err("motion_timeout_ms must be 1000–60000");
        }
        if !(1..=100).contains(&self.loop_interval_ms) {
            return Err("loop_interval_ms must be 1–100");
        }
        if self.retry_min_ms == 0 || self.retry_min_ms > self.retry_max_ms {
            return Err("retry_min_ms must be non-zero and <= retry_max_ms");
        }
        if self.association_timeout_ms < 1_000 {
            return Err("association_timeout_ms must be >= 1000");
        }
        if self.watchdog_timeout_ms <= self.loop_interval_ms {
            return Err("watchdog_timeout_ms must exceed loop_interval_ms");
        }
        Ok(())
    }
}
