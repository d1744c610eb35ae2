//! Typed commands and responses.
//!
//! The codec turns bytes into these; everything past the codec works with
//! the typed variants only.

use heapless::Vec;

use crate::error::Error;
use crate::registry::ComponentId;
use crate::settings::CodeMode;

use super::codes::{FAILURE, MAX_ECHO_LEN};

/// Relay-style action (`OPEN` / `CLOSE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switching {
    Open,
    Close,
}

impl Switching {
    pub const fn energised(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Test-stand action (`STOP` / `GO_UP` / `GO_DOWN`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionAction {
    Stop,
    GoUp,
    GoDown,
}

/// Action carried by an `ACTUATE_SIMPLE` packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleAction {
    Relay(Switching),
    Motion(MotionAction),
}

/// `PROGRAM_SETTINGS` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsChange {
    SetDelay(u32),
    SetCode(CodeMode),
}

/// A decoded inbound command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Simple {
        target: ComponentId,
        action: SimpleAction,
    },
    /// Ordered `(target, value)` pairs; applied all-or-nothing.
    Multiple {
        targets: Vec<(ComponentId, Switching), { ComponentId::COUNT }>,
    },
    SettingsChange(SettingsChange),
    /// Read back one component value.
    Request { target: ComponentId },
    /// Read back several component values, in order.
    MultipleRequest {
        targets: Vec<ComponentId, { ComponentId::COUNT }>,
    },
}

impl Command {
    /// Short label for logs and events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Simple { .. } => "simple",
            Self::Multiple { .. } => "multiple",
            Self::SettingsChange(_) => "settings",
            Self::Request { .. } => "request",
            Self::MultipleRequest { .. } => "multi-request",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Ack,
    Nack,
}

/// Outbound reply: `ACK`/`NACK` plus an optional echo payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub kind: ReplyKind,
    pub payload: Vec<u8, MAX_ECHO_LEN>,
}

impl Response {
    /// Bare `ACK`.
    pub fn ack() -> Self {
        Self {
            kind: ReplyKind::Ack,
            payload: Vec::new(),
        }
    }

    /// Bare `NACK`: the packet was not understood or not accepted.
    pub fn nack() -> Self {
        Self {
            kind: ReplyKind::Nack,
            payload: Vec::new(),
        }
    }

    /// `NACK` carrying the `FAILURE` status: understood but could not be applied.
    pub fn failure() -> Self {
        Self::nack_with(&[FAILURE])
    }

    /// `ACK` carrying `payload`, truncated to the echo capacity.
    pub fn ack_with(payload: &[u8]) -> Self {
        Self {
            kind: ReplyKind::Ack,
            payload: truncated(payload),
        }
    }

    fn nack_with(payload: &[u8]) -> Self {
        Self {
            kind: ReplyKind::Nack,
            payload: truncated(payload),
        }
    }

    /// Success reply for an applied command in the given code mode.
    ///
    /// `Optimized` answers with the bare code; `Generic` echoes the request
    /// so the peer can correlate replies without tracking state.
    pub fn applied(mode: CodeMode, request: &[u8]) -> Self {
        match mode {
            CodeMode::Optimized => Self::ack(),
            CodeMode::Generic => Self::ack_with(request),
        }
    }

    /// Reply for a rejected command.
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::Protocol(_) => Self::nack(),
            Error::Actuation(_) | Error::Store(_) | Error::Link(_) => Self::failure(),
        }
    }

    pub fn is_ack(&self) -> bool {
        self.kind == ReplyKind::Ack
    }
}

fn truncated(payload: &[u8]) -> Vec<u8, MAX_ECHO_LEN> {
    let n = payload.len().min(MAX_ECHO_LEN);
    // n never exceeds capacity
    Vec::from_slice(&payload[..n]).unwrap_or_default()
}
