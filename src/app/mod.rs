//! Application core: domain logic behind port traits, zero I/O.
//!
//! The link state machine, command dispatch, settings and credential
//! persistence live here. All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod credentials;
pub mod dispatcher;
pub mod events;
pub mod ports;
pub mod service;
