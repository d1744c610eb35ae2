//! Bit-exact wire constants.
//!
//! These values are shared with deployed control software and must never
//! change. Nothing outside [`codec`](super::codec) and the
//! [`ComponentId`](crate::registry::ComponentId) discriminants should need
//! them.

// ── Class bytes (byte 0) ──────────────────────────────────────
pub const ACTUATE_SIMPLE: u8 = 0xA0;
pub const ACTUATE_MULTIPLE: u8 = 0x0A;
pub const PROGRAM_SETTINGS: u8 = 0xC0;
pub const SIMPLE_REQUEST: u8 = 0xB0;
pub const MULTIPLE_REQUEST: u8 = 0x0B;

// ── PROGRAM_SETTINGS sub-commands ─────────────────────────────
pub const SET_RELAYS_DELAY: u8 = 0x00;
pub const CHANGE_CODE: u8 = 0x01;
pub const GENERIC_CODE: u8 = 0x00;
pub const OPTIMIZED_CODE: u8 = 0x01;

// ── Relay actions ─────────────────────────────────────────────
pub const OPEN: u8 = 0x01;
pub const CLOSE: u8 = 0x00;

// ── Test-stand actions ────────────────────────────────────────
pub const STOP: u8 = 0x00;
pub const GO_DOWN: u8 = 0x01;
pub const GO_UP: u8 = 0x02;

// ── Reply codes ───────────────────────────────────────────────
pub const ACK: u8 = 0x06;
pub const NACK: u8 = 0x15;

// ── Component ids ─────────────────────────────────────────────
pub const CONNECTION: u8 = 0x00;
pub const RELAY1: u8 = 0x01;
pub const RELAY2: u8 = 0x02;
pub const RELAY3: u8 = 0x03;
pub const RELAY4: u8 = 0x04;
pub const FUNC_MODE: u8 = 0x05;
pub const TOP_SWITCH: u8 = 0x06;
pub const BOTTOM_SWITCH: u8 = 0x07;

// ── Result status ─────────────────────────────────────────────
pub const SUCCESS: u8 = 0x00;
pub const FAILURE: u8 = 0x01;

// ── Buffer limits ─────────────────────────────────────────────
/// Inbound datagram buffer size.
pub const MAX_PACKET_LEN: usize = 255;
/// Outbound reply buffer size.
pub const MAX_REPLY_LEN: usize = 20;
/// Echo payload capacity (reply minus the ACK/NACK byte).
pub const MAX_ECHO_LEN: usize = MAX_REPLY_LEN - 1;

/// Motion deadline: the axis must reach a limit within this window.
pub const TIMER_INTERVAL_MS: u32 = 10_000;
