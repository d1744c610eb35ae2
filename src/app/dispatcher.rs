//! Command dispatcher: one datagram in, one reply out.
//!
//! ```text
//!  packet ──▶ decode ──▶ ┌──────────────────────┐ ──▶ encode ──▶ reply
//!                        │ ActuationEngine      │
//!                        │ SettingsStore        │
//!                        └──────────────────────┘
//! ```
//!
//! Nothing is applied unless the link is `Running`; in every other state
//! the packet is answered with a bare `NACK` so the peer learns the
//! controller is not ready.

use heapless::Vec;
use log::{debug, warn};

use crate::actuation::{ActuationEngine, MovingState, StopReason};
use crate::config::ControllerConfig;
use crate::error::Error;
use crate::fsm::LinkState;
use crate::protocol::codec;
use crate::protocol::command::{Command, Response, SimpleAction};
use crate::registry::ComponentId;
use crate::settings::{Settings, SettingsStore};

use super::events::AppEvent;
use super::ports::{EventSink, InputSnapshot, OutputPort, StoragePort};

pub struct Dispatcher {
    engine: ActuationEngine,
    settings: SettingsStore,
}

impl Dispatcher {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            engine: ActuationEngine::new(config),
            settings: SettingsStore::new(),
        }
    }

    pub fn engine(&self) -> &ActuationEngine {
        &self.engine
    }

    pub fn settings(&self) -> Settings {
        self.settings.current()
    }

    /// Load persisted settings. Call once at boot.
    pub fn load_settings(&mut self, storage: &impl StoragePort) -> Settings {
        self.settings.load(storage)
    }

    /// Force every output off. Call once at boot.
    pub fn safe_state(&mut self, out: &mut impl OutputPort) {
        self.engine.safe_state(out);
    }

    pub fn set_connection(&mut self, running: bool) {
        self.engine.set_connection(running);
    }

    /// Latch inputs and run the motion supervisor.
    pub fn supervise(
        &mut self,
        now_ms: u64,
        inputs: InputSnapshot,
        out: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) {
        self.engine.refresh_inputs(inputs);
        match self.engine.poll(now_ms, out) {
            Ok(Some(reason)) => sink.emit(&AppEvent::MotionStopped(reason)),
            Ok(None) => {}
            Err(e) => {
                sink.emit(&AppEvent::MotionStopped(StopReason::Timeout));
                sink.emit(&AppEvent::MotionFault(e));
            }
        }
    }

    /// Decode, apply and answer one datagram.
    pub fn dispatch(
        &mut self,
        packet: &[u8],
        link: LinkState,
        now_ms: u64,
        out: &mut impl OutputPort,
        storage: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) -> Response {
        if link != LinkState::Running {
            debug!("Dispatcher: link {:?}, refusing {} bytes", link, packet.len());
            return Response::nack();
        }

        let cmd = match codec::decode(packet) {
            Ok(cmd) => cmd,
            Err(e) => {
                warn!("Dispatcher: {}", e);
                let err = Error::from(e);
                sink.emit(&AppEvent::CommandRejected(err));
                return Response::from_error(&err);
            }
        };

        match self.execute(&cmd, packet, now_ms, out, storage, sink) {
            Ok(response) => {
                sink.emit(&AppEvent::CommandApplied { kind: cmd.kind() });
                response
            }
            Err(err) => {
                warn!("Dispatcher: {} command failed: {}", cmd.kind(), err);
                sink.emit(&AppEvent::CommandRejected(err));
                Response::from_error(&err)
            }
        }
    }

    fn execute(
        &mut self,
        cmd: &Command,
        packet: &[u8],
        now_ms: u64,
        out: &mut impl OutputPort,
        storage: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) -> Result<Response, Error> {
        match cmd {
            Command::Simple { target, action } => {
                let before = self.engine.moving_state();
                self.engine.actuate(*target, *action, now_ms, out)?;
                let reason = match action {
                    SimpleAction::Relay(_) => StopReason::Override,
                    SimpleAction::Motion(_) => StopReason::Command,
                };
                self.report_motion(before, reason, sink);
            }
            Command::Multiple { targets } => {
                let before = self.engine.moving_state();
                self.engine.actuate_multiple(targets, out)?;
                self.report_motion(before, StopReason::Override, sink);
            }
            Command::SettingsChange(change) => {
                let updated = self.settings.apply(storage, *change)?;
                sink.emit(&AppEvent::SettingsChanged(updated));
            }
            Command::Request { target } => {
                return Ok(Response::ack_with(&[self.engine.value(*target)]));
            }
            Command::MultipleRequest { targets } => {
                let values: Vec<u8, { ComponentId::COUNT }> =
                    targets.iter().map(|id| self.engine.value(*id)).collect();
                return Ok(Response::ack_with(&values));
            }
        }
        Ok(Response::applied(self.settings.current().code_mode, packet))
    }

    fn report_motion(&self, before: MovingState, stop: StopReason, sink: &mut impl EventSink) {
        let after = self.engine.moving_state();
        if after == before {
            return;
        }
        match after.direction() {
            Some(dir) => sink.emit(&AppEvent::MotionStarted(dir)),
            None => sink.emit(&AppEvent::MotionStopped(stop)),
        }
    }
}
