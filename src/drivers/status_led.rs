//! "ACTIVE" status LED driver.
//!
//! One discrete LED on an `embedded-hal` output pin. The blink pattern
//! tells the operator where the link state machine is without a serial
//! console:
//!
//! | Link state                 | Pattern                      |
//! |----------------------------|------------------------------|
//! | `Configuring`              | slow blink (1 Hz)            |
//! | `Configured` / `Connected` | fast blink (4 Hz)            |
//! | `Running`                  | solid on                     |
//! | `Invalid` / `Disconnected` | double blink, then pause     |

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::fsm::LinkState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkPattern {
    Solid,
    SlowBlink,
    FastBlink,
    DoubleBlink,
}

impl BlinkPattern {
    pub fn for_link(state: LinkState) -> Self {
        match state {
            LinkState::Configuring => Self::SlowBlink,
            LinkState::Configured | LinkState::Connected => Self::FastBlink,
            LinkState::Running => Self::Solid,
            LinkState::Invalid | LinkState::Disconnected => Self::DoubleBlink,
        }
    }

    /// LED level `phase_ms` into the pattern.
    pub fn level(self, phase_ms: u64) -> bool {
        match self {
            Self::Solid => true,
            Self::SlowBlink => phase_ms % 1_000 < 500,
            Self::FastBlink => phase_ms % 250 < 125,
            Self::DoubleBlink => {
                let t = phase_ms % 1_000;
                t < 100 || (200..300).contains(&t)
            }
        }
    }
}

pub struct StatusLed<P: OutputPin> {
    pin: P,
    pattern: BlinkPattern,
    pattern_start_ms: u64,
    lit: Option<bool>,
}

impl<P: OutputPin> StatusLed<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            pattern: BlinkPattern::SlowBlink,
            pattern_start_ms: 0,
            lit: None,
        }
    }

    pub fn pattern(&self) -> BlinkPattern {
        self.pattern
    }

    /// Follow `state`; call once per loop iteration.
    pub fn update(&mut self, state: LinkState, now_ms: u64) {
        let pattern = BlinkPattern::for_link(state);
        if pattern != self.pattern {
            self.pattern = pattern;
            self.pattern_start_ms = now_ms;
        }
        let on = pattern.level(now_ms.saturating_sub(self.pattern_start_ms));
        if self.lit != Some(on) {
            self.write(on);
        }
    }

    pub fn off(&mut self) {
        self.write(false);
    }

    fn write(&mut self, on: bool) {
        let result = if on { self.pin.set_high() } else { self.pin.set_low() };
        match result {
            Ok(()) => self.lit = Some(on),
            Err(e) => warn!("StatusLed: write failed: {:?}", e),
        }
    }
}
