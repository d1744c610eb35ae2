//! Actuation engine: applies decoded commands to the relays and the
//! test-stand axis.
//!
//! Relay commands always apply. The axis is addressed through the `FuncMode`
//! id and driven by two of the relays; a direct write to either of them
//! while the axis moves stops the axis first.
//!
//! ## Motion
//!
//! ```text
//! Stopped ──GoUp──▶ GoingUp ──(top limit | deadline | Stop)──▶ Stopped
//! Stopped ──GoDown▶ GoingDown ─(bottom limit | deadline | Stop)▶ Stopped
//! ```
//!
//! Motion never energises the up and down relays together. Limit and deadline
//! stops are forced by [`ActuationEngine::poll`] and cannot be overridden.

use log::{info, warn};

use crate::app::ports::{InputSnapshot, OutputPort};
use crate::config::ControllerConfig;
use crate::error::ActuationError;
use crate::protocol::command::{MotionAction, SimpleAction, Switching};
use crate::registry::{ComponentId, ComponentRegistry, Relay};
use crate::safety::{LimitResolver, LimitState};

/// Axis travel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MovingState {
    #[default]
    Stopped,
    GoingUp,
    GoingDown,
}

impl MovingState {
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::Stopped => None,
            Self::GoingUp => Some(Direction::Up),
            Self::GoingDown => Some(Direction::Down),
        }
    }

    const fn from_direction(dir: Direction) -> Self {
        match dir {
            Direction::Up => Self::GoingUp,
            Direction::Down => Self::GoingDown,
        }
    }
}

/// Why the axis stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Command,
    LimitReached(Direction),
    Timeout,
    /// A direct write to an axis relay took over the outputs.
    Override,
}

pub struct ActuationEngine {
    registry: ComponentRegistry,
    moving: MovingState,
    /// Monotonic ms at which the current motion times out.
    deadline_ms: Option<u64>,
    motion_timeout_ms: u32,
    up_relay: Relay,
    down_relay: Relay,
    limits: LimitResolver,
    inputs: InputSnapshot,
    limit_state: LimitState,
}

impl ActuationEngine {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            registry: ComponentRegistry::new(),
            moving: MovingState::Stopped,
            deadline_ms: None,
            motion_timeout_ms: config.motion_timeout_ms,
            up_relay: config.axis_up_relay,
            down_relay: config.axis_down_relay,
            limits: LimitResolver::new(config.limit_wiring),
            inputs: InputSnapshot::default(),
            limit_state: LimitState::default(),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn value(&self, id: ComponentId) -> u8 {
        self.registry.value(id)
    }

    pub fn moving_state(&self) -> MovingState {
        self.moving
    }

    pub fn limit_state(&self) -> LimitState {
        self.limit_state
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    // ── Inputs ────────────────────────────────────────────────

    /// Latch a fresh input sample into the registry.
    pub fn refresh_inputs(&mut self, raw: InputSnapshot) {
        self.inputs = raw;
        self.limit_state = self.limits.observe(raw);
        self.registry.set(ComponentId::FuncMode, raw.func_mode);
        self.registry.set(ComponentId::TopSwitch, self.limit_state.top_closed);
        self.registry
            .set(ComponentId::BottomSwitch, self.limit_state.bottom_closed);
    }

    /// Mirror the link state into the `Connection` slot.
    pub fn set_connection(&mut self, running: bool) {
        self.registry.set(ComponentId::Connection, running);
    }

    // ── Commands ──────────────────────────────────────────────

    /// Apply one `ACTUATE_SIMPLE` action.
    pub fn actuate(
        &mut self,
        target: ComponentId,
        action: SimpleAction,
        now_ms: u64,
        out: &mut impl OutputPort,
    ) -> Result<(), ActuationError> {
        match action {
            SimpleAction::Relay(sw) => {
                let relay = relay_target(target)?;
                self.release_axis_for(relay, out);
                self.drive(relay, sw.energised(), out);
                Ok(())
            }
            SimpleAction::Motion(_) if target != ComponentId::FuncMode => {
                Err(ActuationError::NotActuatable(target))
            }
            SimpleAction::Motion(MotionAction::Stop) => {
                if self.moving != MovingState::Stopped {
                    self.stop(StopReason::Command, out);
                }
                Ok(())
            }
            SimpleAction::Motion(MotionAction::GoUp) => self.start(Direction::Up, now_ms, out),
            SimpleAction::Motion(MotionAction::GoDown) => self.start(Direction::Down, now_ms, out),
        }
    }

    /// Apply an `ACTUATE_MULTIPLE` command. Every target is checked before
    /// any output changes.
    pub fn actuate_multiple(
        &mut self,
        targets: &[(ComponentId, Switching)],
        out: &mut impl OutputPort,
    ) -> Result<(), ActuationError> {
        for &(target, _) in targets {
            relay_target(target)?;
        }
        for &(target, sw) in targets {
            if let Some(relay) = target.relay() {
                self.release_axis_for(relay, out);
                self.drive(relay, sw.energised(), out);
            }
        }
        Ok(())
    }

    /// Per-iteration supervision: limits and deadline.
    ///
    /// Returns the reason when motion was forced to stop this call. A
    /// deadline expiry stops the axis and is reported as
    /// [`ActuationError::MotionTimeout`].
    pub fn poll(
        &mut self,
        now_ms: u64,
        out: &mut impl OutputPort,
    ) -> Result<Option<StopReason>, ActuationError> {
        let Some(dir) = self.moving.direction() else {
            return Ok(None);
        };

        if self.limit_state.closed(dir) {
            let reason = StopReason::LimitReached(dir);
            self.stop(reason, out);
            return Ok(Some(reason));
        }

        if self.deadline_ms.is_some_and(|deadline| now_ms >= deadline) {
            warn!("Actuation: no {:?} limit within {} ms, stopping", dir, self.motion_timeout_ms);
            self.stop(StopReason::Timeout, out);
            return Err(ActuationError::MotionTimeout);
        }

        Ok(None)
    }

    /// Release every relay and stop the axis. Used at boot.
    pub fn safe_state(&mut self, out: &mut impl OutputPort) {
        out.all_off();
        for relay in Relay::ALL {
            self.registry.set(relay.component(), false);
        }
        if self.moving != MovingState::Stopped {
            self.moving = MovingState::Stopped;
            self.deadline_ms = None;
            self.limits.end_motion(None);
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn is_axis_relay(&self, relay: Relay) -> bool {
        relay == self.up_relay || relay == self.down_relay
    }

    /// Stop the axis before a direct write to one of its relays.
    fn release_axis_for(&mut self, relay: Relay, out: &mut impl OutputPort) {
        if self.moving != MovingState::Stopped && self.is_axis_relay(relay) {
            warn!("Actuation: direct write to {:?} while moving, stopping axis", relay);
            self.stop(StopReason::Override, out);
        }
    }

    fn drive(&mut self, relay: Relay, energised: bool, out: &mut impl OutputPort) {
        out.set_relay(relay, energised);
        self.registry.set(relay.component(), energised);
    }

    fn axis_relay(&self, dir: Direction) -> Relay {
        match dir {
            Direction::Up => self.up_relay,
            Direction::Down => self.down_relay,
        }
    }

    fn start(
        &mut self,
        dir: Direction,
        now_ms: u64,
        out: &mut impl OutputPort,
    ) -> Result<(), ActuationError> {
        if self.moving.direction() == Some(dir) {
            return Ok(());
        }
        if self.moving != MovingState::Stopped {
            // Reversal: come to rest before the interlock check.
            self.stop(StopReason::Command, out);
        }
        self.limits.check_start(dir, self.inputs)?;

        self.drive(self.axis_relay(dir.opposite()), false, out);
        self.drive(self.axis_relay(dir), true, out);
        self.moving = MovingState::from_direction(dir);
        self.deadline_ms = Some(now_ms + u64::from(self.motion_timeout_ms));
        self.limits.begin_motion(dir, self.inputs);
        self.limit_state = self.limits.attribute(self.inputs);
        info!("Actuation: moving {:?}", dir);
        Ok(())
    }

    fn stop(&mut self, reason: StopReason, out: &mut impl OutputPort) {
        self.drive(self.up_relay, false, out);
        self.drive(self.down_relay, false, out);
        self.moving = MovingState::Stopped;
        self.deadline_ms = None;
        let at_limit = match reason {
            StopReason::LimitReached(dir) => Some(dir),
            _ => None,
        };
        self.limits.end_motion(at_limit);
        self.limit_state = self.limits.attribute(self.inputs);
        self.registry
            .set(ComponentId::TopSwitch, self.limit_state.top_closed);
        self.registry
            .set(ComponentId::BottomSwitch, self.limit_state.bottom_closed);
        info!("Actuation: stopped ({:?})", reason);
    }
}

fn relay_target(target: ComponentId) -> Result<Relay, ActuationError> {
    target.relay().ok_or(ActuationError::NotActuatable(target))
}
