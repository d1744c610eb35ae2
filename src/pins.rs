//! GPIO pin assignments for the four-relay controller board.
//!
//! Single source of truth: the component registry and the hardware bring-up
//! in `main` both reference this module rather than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Relay outputs (active HIGH, opto-isolated relay drivers)
// ---------------------------------------------------------------------------

pub const RELAY_1_GPIO: i32 = 15;
pub const RELAY_2_GPIO: i32 = 14;
pub const RELAY_3_GPIO: i32 = 12;
pub const RELAY_4_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Switch inputs (pull-up, closed = LOW)
// ---------------------------------------------------------------------------

/// Function-mode selector: open = relay mode, closed = test-stand mode.
pub const FUNC_MODE_GPIO: i32 = 5;

/// Test-stand top limit switch.
pub const TOP_SWITCH_GPIO: i32 = 4;

/// Test-stand bottom limit switch.
///
/// Shares GPIO 4 with the top switch on the current board revision; both
/// ends are wired in parallel to one sensor input. See
/// [`LimitWiring::Shared`](crate::safety::LimitWiring::Shared).
pub const BOTTOM_SWITCH_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Status / provisioning
// ---------------------------------------------------------------------------

/// "ACTIVE" status LED; also the pin recorded for the `Connection` component.
pub const ACTIVE_LED_GPIO: i32 = 2;

/// Wi-Fi configuration push-button (active-low).
pub const WIFI_CONF_GPIO: i32 = 16;

/// Relay output pins in component order (Relay1..Relay4).
pub const RELAY_GPIOS: [i32; 4] = [RELAY_1_GPIO, RELAY_2_GPIO, RELAY_3_GPIO, RELAY_4_GPIO];

/// True when both limit switches land on the same physical input.
pub const fn limit_switches_share_pin() -> bool {
    TOP_SWITCH_GPIO == BOTTOM_SWITCH_GPIO
}
