//! Limit-switch attribution and motion interlocks.
//!
//! The resolver runs **every loop iteration before the motion poll** and
//! turns raw sensor lines into a [`LimitState`]: which end of the axis is
//! actually reached.
//!
//! ## Shared sensor
//!
//! The reference board wires both limit switches to one GPIO, so a closed
//! line only says "some end is reached". Attribution rules:
//!
//! 1. Moving: the closed line belongs to the end the axis is heading for.
//! 2. Stopped: it belongs to the end where motion last stopped on a limit.
//! 3. Stopped with that end unknown: both ends count as closed.
//! 4. A line already closed when motion starts is ignored until it has
//!    opened once, so leaving one end does not immediately stop at it.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::actuation::Direction;
use crate::app::ports::InputSnapshot;
use crate::error::ActuationError;

/// How the two limit switches are wired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitWiring {
    /// One input per end.
    Separate,
    /// Both switches on one input.
    #[default]
    Shared,
}

/// Which ends of the axis are currently reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LimitState {
    pub top_closed: bool,
    pub bottom_closed: bool,
}

impl LimitState {
    pub const fn closed(&self, dir: Direction) -> bool {
        match dir {
            Direction::Up => self.top_closed,
            Direction::Down => self.bottom_closed,
        }
    }

    const fn only(dir: Direction) -> Self {
        Self {
            top_closed: matches!(dir, Direction::Up),
            bottom_closed: matches!(dir, Direction::Down),
        }
    }
}

/// Turns raw limit lines into per-end state.
#[derive(Debug, Clone)]
pub struct LimitResolver {
    wiring: LimitWiring,
    /// Direction of travel, while moving.
    travel: Option<Direction>,
    /// Whether the shared line has been seen open since motion started.
    armed: bool,
    /// End at which motion last stopped on a limit.
    parked_at: Option<Direction>,
}

impl LimitResolver {
    pub fn new(wiring: LimitWiring) -> Self {
        Self {
            wiring,
            travel: None,
            armed: true,
            parked_at: None,
        }
    }

    /// Attribute the raw lines, updating the armed flag while moving.
    pub fn observe(&mut self, raw: InputSnapshot) -> LimitState {
        if self.travel.is_some() && !self.armed && !Self::shared_line(raw) {
            self.armed = true;
        }
        self.attribute(raw)
    }

    /// Pure attribution using the current motion bookkeeping.
    pub fn attribute(&self, raw: InputSnapshot) -> LimitState {
        match self.wiring {
            LimitWiring::Separate => LimitState {
                top_closed: raw.top_raw,
                bottom_closed: raw.bottom_raw,
            },
            LimitWiring::Shared => {
                if !Self::shared_line(raw) {
                    return LimitState::default();
                }
                match (self.travel, self.parked_at) {
                    (Some(_), _) if !self.armed => LimitState::default(),
                    (Some(dir), _) | (None, Some(dir)) => LimitState::only(dir),
                    (None, None) => LimitState {
                        top_closed: true,
                        bottom_closed: true,
                    },
                }
            }
        }
    }

    /// Interlock: may the axis start moving in `dir`?
    pub fn check_start(&self, dir: Direction, raw: InputSnapshot) -> Result<(), ActuationError> {
        let at_rest = LimitResolver {
            travel: None,
            ..self.clone()
        };
        if at_rest.attribute(raw).closed(dir) {
            warn!("Safety: refusing {:?}, limit already closed", dir);
            return Err(ActuationError::LimitClosed(dir));
        }
        Ok(())
    }

    /// Record the start of motion in `dir`.
    pub fn begin_motion(&mut self, dir: Direction, raw: InputSnapshot) {
        self.travel = Some(dir);
        self.armed = match self.wiring {
            LimitWiring::Separate => true,
            LimitWiring::Shared => !Self::shared_line(raw),
        };
    }

    /// Record the end of motion. `at_limit` names the end that stopped it.
    pub fn end_motion(&mut self, at_limit: Option<Direction>) {
        match at_limit {
            Some(dir) => {
                info!("Safety: axis parked at {:?} limit", dir);
                self.parked_at = Some(dir);
            }
            // Still on the end we started from.
            None if !self.armed => {}
            None => self.parked_at = None,
        }
        self.travel = None;
        self.armed = true;
    }

    fn shared_line(raw: InputSnapshot) -> bool {
        raw.top_raw || raw.bottom_raw
    }
}
