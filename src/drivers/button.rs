//! Polled, debounced push-button with short and long press detection.
//!
//! ## Hardware
//!
//! The Wi-Fi config button is an active-low momentary switch with a
//! pull-up. [`ButtonDriver::tick`] is called from the main loop every
//! iteration and runs the debounce + gesture state machine on the sampled
//! level; no interrupt is involved.
//!
//! ## Gesture detection
//!
//! | Gesture     | Condition                         | Event        |
//! |-------------|-----------------------------------|--------------|
//! | Short press | Released after debounce, < long   | `ShortPress` |
//! | Long press  | Held >= `long_press_ms`           | `LongPress`  |
//!
//! A long press fires while the button is still held; the release that
//! follows produces nothing.

use embedded_hal::digital::InputPin;

use super::switch::Switch;

const DEBOUNCE_MS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    ShortPress,
    LongPress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Idle,
    DebounceWait { since_ms: u64 },
    Pressed { since_ms: u64 },
    /// Long press already reported; wait for release.
    Latched,
}

pub struct ButtonDriver<P: InputPin> {
    contact: Switch<P>,
    long_press_ms: u64,
    state: GestureState,
}

impl<P: InputPin> ButtonDriver<P> {
    pub fn new(pin: P, active_low: bool, long_press_ms: u32) -> Self {
        Self {
            contact: Switch::new(pin, active_low),
            long_press_ms: u64::from(long_press_ms),
            state: GestureState::Idle,
        }
    }

    /// Sample the button and advance the gesture machine.
    pub fn tick(&mut self, now_ms: u64) -> Option<ButtonEvent> {
        let down = self.contact.is_closed();

        match self.state {
            GestureState::Idle => {
                if down {
                    self.state = GestureState::DebounceWait { since_ms: now_ms };
                }
                None
            }

            GestureState::DebounceWait { since_ms } => {
                if !down {
                    self.state = GestureState::Idle;
                } else if now_ms.saturating_sub(since_ms) >= DEBOUNCE_MS {
                    self.state = GestureState::Pressed { since_ms };
                }
                None
            }

            GestureState::Pressed { since_ms } => {
                if !down {
                    self.state = GestureState::Idle;
                    return Some(ButtonEvent::ShortPress);
                }
                if now_ms.saturating_sub(since_ms) >= self.long_press_ms {
                    self.state = GestureState::Latched;
                    return Some(ButtonEvent::LongPress);
                }
                None
            }

            GestureState::Latched => {
                if !down {
                    self.state = GestureState::Idle;
                }
                None
            }
        }
    }
}
