//! Unified error types for the relay controller firmware.
//!
//! One `Error` enum that every subsystem converts into, so the control loop
//! handles failures uniformly. All variants are `Copy`: they travel through
//! the dispatcher, the event sink and the link FSM without allocation.
//!
//! None of these conditions is fatal. Protocol errors become `NACK`,
//! actuation and store errors become a `FAILURE` status, link errors drive
//! the connection state machine into a recoverable state.

use core::fmt;

use crate::actuation::Direction;
use crate::registry::ComponentId;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Inbound packet could not be decoded.
    Protocol(ProtocolError),
    /// A decoded command could not be applied to the outputs.
    Actuation(ActuationError),
    /// The persistent settings record could not be read or written.
    Store(StoreError),
    /// Wi-Fi association or connectivity failed.
    Link(LinkError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protocol(e) => write!(f, "protocol: {e}"),
            Self::Actuation(e) => write!(f, "actuation: {e}"),
            Self::Store(e) => write!(f, "store: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Protocol errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// First byte is not a known class byte.
    UnknownClass(u8),
    /// Packet ended before the command was complete (includes empty packets).
    Truncated,
    /// Component id outside `0x00..=0x07`.
    UnknownComponent(u8),
    /// Action/value byte not valid for the target.
    InvalidValue(u8),
    /// `PROGRAM_SETTINGS` sub-command not recognised.
    UnknownSetting(u8),
    /// Target count exceeds the registry size.
    TooManyTargets(u8),
    /// Payload larger than the inbound datagram buffer.
    Oversized(usize),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownClass(b) => write!(f, "unknown class byte 0x{b:02X}"),
            Self::Truncated => write!(f, "packet truncated"),
            Self::UnknownComponent(id) => write!(f, "unknown component id 0x{id:02X}"),
            Self::InvalidValue(v) => write!(f, "invalid value 0x{v:02X}"),
            Self::UnknownSetting(s) => write!(f, "unknown settings sub-command 0x{s:02X}"),
            Self::TooManyTargets(n) => write!(f, "too many targets ({n})"),
            Self::Oversized(len) => write!(f, "packet too large ({len} bytes)"),
        }
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

// ---------------------------------------------------------------------------
// Actuation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuationError {
    /// Target is an input or otherwise cannot be driven.
    NotActuatable(ComponentId),
    /// The limit switch in the requested direction is already closed.
    LimitClosed(Direction),
    /// No limit switch closed before the motion deadline.
    MotionTimeout,
}

impl fmt::Display for ActuationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotActuatable(id) => write!(f, "{id:?} is not actuatable"),
            Self::LimitClosed(dir) => write!(f, "limit switch closed ({dir:?})"),
            Self::MotionTimeout => write!(f, "motion timed out before reaching a limit"),
        }
    }
}

impl From<ActuationError> for Error {
    fn from(e: ActuationError) -> Self {
        Self::Actuation(e)
    }
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// Requested key does not exist.
    NotFound,
    /// Stored blob failed its integrity or deserialisation check.
    Corrupted,
    /// Storage partition is full.
    Full,
    /// Generic I/O error from the storage backend.
    Io,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Corrupted => write!(f, "record corrupted"),
            Self::Full => write!(f, "storage full"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    AssociationFailed,
    AssociationTimeout,
    LinkLost,
    /// The datagram service could not be opened on the configured port.
    ServiceUnavailable,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no Wi-Fi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::AssociationFailed => write!(f, "association failed"),
            Self::AssociationTimeout => write!(f, "association timed out"),
            Self::LinkLost => write!(f, "link lost"),
            Self::ServiceUnavailable => write!(f, "datagram service unavailable"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
