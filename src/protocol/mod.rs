//! Datagram command protocol: wire constants, typed commands, the codec
//! between them, and the transport trait packets arrive on.

pub mod codec;
pub mod codes;
pub mod command;
pub mod transport;

pub use codec::{decode, encode};
pub use command::{
    Command, MotionAction, ReplyKind, Response, SettingsChange, SimpleAction, Switching,
};
pub use transport::DatagramTransport;
