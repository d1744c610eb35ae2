//! Fuzz target: `protocol::decode`
//!
//! Feeds arbitrary datagrams to the packet decoder and asserts that every
//! outcome maps to a reply that fits the reply buffer.
//!
//! cargo fuzz run fuzz_packet_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use relayx4::protocol::codes::MAX_REPLY_LEN;
use relayx4::protocol::{Command, Response, decode, encode};
use relayx4::settings::CodeMode;

fuzz_target!(|data: &[u8]| {
    let reply = match decode(data) {
        Ok(Command::Request { .. }) => Response::ack_with(&[0]),
        Ok(_) => Response::applied(CodeMode::Generic, data),
        Err(e) => Response::from_error(&e.into()),
    };
    let wire = encode(&reply);
    assert!(!wire.is_empty());
    assert!(wire.len() <= MAX_REPLY_LEN);
});
