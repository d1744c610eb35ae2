//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them.

use crate::actuation::{Direction, StopReason};
use crate::error::{ActuationError, Error, LinkError};
use crate::fsm::LinkState;
use crate::settings::Settings;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started (carries the initial link state).
    Started(LinkState),

    /// The link FSM transitioned between states.
    LinkChanged { from: LinkState, to: LinkState },

    /// The link dropped into a recovery state for this reason.
    LinkFault(LinkError),

    /// A datagram command was decoded and applied.
    CommandApplied { kind: &'static str },

    /// A datagram command was rejected.
    CommandRejected(Error),

    MotionStarted(Direction),

    MotionStopped(StopReason),

    /// Motion ended abnormally (deadline expired).
    MotionFault(ActuationError),

    /// Settings were changed and persisted.
    SettingsChanged(Settings),
}
