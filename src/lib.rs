//! RelayX4 firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module, so the whole crate
//! builds and tests on the host.

#![deny(unused_must_use)]

pub mod actuation;
pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod protocol;
pub mod registry;
pub mod safety;
pub mod settings;

pub use error::{Error, Result};
