//! Peripheral drivers over `embedded-hal` 1.0 digital pins.

pub mod button;
pub mod relay;
pub mod status_led;
pub mod switch;
pub mod watchdog;

#[cfg(test)]
pub(crate) mod mock_pin;
