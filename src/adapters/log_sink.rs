//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC in production), one line per event with a
//! fixed `TOPIC |` prefix so the console can be grepped.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | link={:?}", state);
            }
            AppEvent::LinkChanged { from, to } => {
                info!("LINK | {:?} -> {:?}", from, to);
            }
            AppEvent::LinkFault(err) => {
                warn!("LINK | fault: {}", err);
            }
            AppEvent::CommandApplied { kind } => {
                info!("CMD | {} applied", kind);
            }
            AppEvent::CommandRejected(err) => {
                warn!("CMD | rejected: {}", err);
            }
            AppEvent::MotionStarted(dir) => {
                info!("MOTION | moving {:?}", dir);
            }
            AppEvent::MotionStopped(reason) => {
                info!("MOTION | stopped ({:?})", reason);
            }
            AppEvent::MotionFault(err) => {
                warn!("MOTION | fault: {}", err);
            }
            AppEvent::SettingsChanged(s) => {
                info!(
                    "SETTINGS | delay={}ms code={}",
                    s.actuation_delay_ms,
                    s.code_mode.label()
                );
            }
        }
    }
}
