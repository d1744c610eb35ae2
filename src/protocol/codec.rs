//! Packet codec: the only place wire bytes meet typed commands.
//!
//! Wire format (byte 0 selects the class):
//! ```text
//! ACTUATE_SIMPLE    0xA0 │ id │ value
//! ACTUATE_MULTIPLE  0x0A │ n  │ (id, value) × n
//! PROGRAM_SETTINGS  0xC0 │ 0x00 │ delay (1–4 bytes, big-endian)
//!                   0xC0 │ 0x01 │ GENERIC_CODE | OPTIMIZED_CODE
//! SIMPLE_REQUEST    0xB0 │ id
//! MULTIPLE_REQUEST  0x0B │ n  │ id × n
//! ```
//!
//! Replies are `ACK`/`NACK` followed by an optional echo payload, at most
//! [`MAX_REPLY_LEN`] bytes in total. Bytes trailing a complete fixed-size
//! command are ignored.

use heapless::Vec;

use crate::error::ProtocolError;
use crate::registry::ComponentId;
use crate::settings::CodeMode;

use super::codes::{
    ACK, ACTUATE_MULTIPLE, ACTUATE_SIMPLE, CHANGE_CODE, CLOSE, GENERIC_CODE, GO_DOWN, GO_UP,
    MAX_PACKET_LEN, MAX_REPLY_LEN, MULTIPLE_REQUEST, NACK, OPEN, OPTIMIZED_CODE, PROGRAM_SETTINGS,
    SET_RELAYS_DELAY, SIMPLE_REQUEST, STOP,
};
use super::command::{
    Command, MotionAction, ReplyKind, Response, SettingsChange, SimpleAction, Switching,
};

/// Encoded reply, ready for the datagram transport.
pub type ReplyBuf = Vec<u8, MAX_REPLY_LEN>;

/// Decode one inbound datagram.
pub fn decode(packet: &[u8]) -> Result<Command, ProtocolError> {
    if packet.len() > MAX_PACKET_LEN {
        return Err(ProtocolError::Oversized(packet.len()));
    }
    let (&class, body) = packet.split_first().ok_or(ProtocolError::Truncated)?;

    match class {
        ACTUATE_SIMPLE => decode_simple(body),
        ACTUATE_MULTIPLE => decode_multiple(body),
        PROGRAM_SETTINGS => decode_settings(body),
        SIMPLE_REQUEST => {
            let target = component(*body.first().ok_or(ProtocolError::Truncated)?)?;
            Ok(Command::Request { target })
        }
        MULTIPLE_REQUEST => decode_multiple_request(body),
        other => Err(ProtocolError::UnknownClass(other)),
    }
}

/// Encode a reply into its wire form.
pub fn encode(response: &Response) -> ReplyBuf {
    let mut out = ReplyBuf::new();
    let code = match response.kind {
        ReplyKind::Ack => ACK,
        ReplyKind::Nack => NACK,
    };
    // Capacity is 1 + MAX_ECHO_LEN, so neither push can overflow.
    let _ = out.push(code);
    let _ = out.extend_from_slice(&response.payload);
    out
}

// ── Class decoders ────────────────────────────────────────────

fn decode_simple(body: &[u8]) -> Result<Command, ProtocolError> {
    let [id, value, ..] = *body else {
        return Err(ProtocolError::Truncated);
    };
    let target = component(id)?;
    let action = if target == ComponentId::FuncMode {
        SimpleAction::Motion(motion(value)?)
    } else {
        SimpleAction::Relay(switching(value)?)
    };
    Ok(Command::Simple { target, action })
}

fn decode_multiple(body: &[u8]) -> Result<Command, ProtocolError> {
    let (&count, pairs) = body.split_first().ok_or(ProtocolError::Truncated)?;
    let count = checked_count(count)?;
    if pairs.len() < count * 2 {
        return Err(ProtocolError::Truncated);
    }

    let mut targets = Vec::new();
    for pair in pairs.chunks_exact(2).take(count) {
        let entry = (component(pair[0])?, switching(pair[1])?);
        // checked_count bounds count by the capacity
        let _ = targets.push(entry);
    }
    Ok(Command::Multiple { targets })
}

fn decode_multiple_request(body: &[u8]) -> Result<Command, ProtocolError> {
    let (&count, ids) = body.split_first().ok_or(ProtocolError::Truncated)?;
    let count = checked_count(count)?;
    if ids.len() < count {
        return Err(ProtocolError::Truncated);
    }

    let mut targets = Vec::new();
    for &id in &ids[..count] {
        let _ = targets.push(component(id)?);
    }
    Ok(Command::MultipleRequest { targets })
}

fn decode_settings(body: &[u8]) -> Result<Command, ProtocolError> {
    let (&sub, rest) = body.split_first().ok_or(ProtocolError::Truncated)?;
    let change = match sub {
        SET_RELAYS_DELAY => SettingsChange::SetDelay(delay(rest)?),
        CHANGE_CODE => {
            let mode = match *rest.first().ok_or(ProtocolError::Truncated)? {
                GENERIC_CODE => CodeMode::Generic,
                OPTIMIZED_CODE => CodeMode::Optimized,
                other => return Err(ProtocolError::InvalidValue(other)),
            };
            SettingsChange::SetCode(mode)
        }
        other => return Err(ProtocolError::UnknownSetting(other)),
    };
    Ok(Command::SettingsChange(change))
}

// ── Field decoders ────────────────────────────────────────────

fn component(id: u8) -> Result<ComponentId, ProtocolError> {
    ComponentId::from_wire(id).ok_or(ProtocolError::UnknownComponent(id))
}

fn switching(value: u8) -> Result<Switching, ProtocolError> {
    match value {
        OPEN => Ok(Switching::Open),
        CLOSE => Ok(Switching::Close),
        other => Err(ProtocolError::InvalidValue(other)),
    }
}

fn motion(value: u8) -> Result<MotionAction, ProtocolError> {
    match value {
        STOP => Ok(MotionAction::Stop),
        GO_DOWN => Ok(MotionAction::GoDown),
        GO_UP => Ok(MotionAction::GoUp),
        other => Err(ProtocolError::InvalidValue(other)),
    }
}

fn checked_count(count: u8) -> Result<usize, ProtocolError> {
    if count as usize > ComponentId::COUNT {
        return Err(ProtocolError::TooManyTargets(count));
    }
    Ok(count as usize)
}

/// Big-endian unsigned delay, 1 to 4 bytes.
fn delay(bytes: &[u8]) -> Result<u32, ProtocolError> {
    match bytes.len() {
        0 => Err(ProtocolError::Truncated),
        1..=4 => Ok(bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b))),
        _ => Err(ProtocolError::InvalidValue(bytes[0])),
    }
}
