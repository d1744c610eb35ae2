//! Contact switch input with polarity correction.
//!
//! The selector and limit switches are wired to inputs with pull-ups, so a
//! closed contact reads LOW. [`Switch::is_closed`] hides that so the rest of
//! the firmware only ever talks about "closed" and "open".

use embedded_hal::digital::InputPin;
use log::warn;

pub struct Switch<P: InputPin> {
    pin: P,
    active_low: bool,
    /// Reported when the pin read fails.
    on_fault: bool,
}

impl<P: InputPin> Switch<P> {
    pub fn new(pin: P, active_low: bool) -> Self {
        Self {
            pin,
            active_low,
            on_fault: false,
        }
    }

    /// Limit switches read as closed when the pin cannot be read, which
    /// stops the axis rather than driving it blind.
    pub fn fail_closed(mut self) -> Self {
        self.on_fault = true;
        self
    }

    pub fn is_closed(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(high) => high != self.active_low,
            Err(e) => {
                let assumed = if self.on_fault { "closed" } else { "open" };
                warn!("Switch: read failed ({:?}), assuming {}", e, assumed);
                self.on_fault
            }
        }
    }
}
