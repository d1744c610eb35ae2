//! Host-side `embedded-hal` pin double shared by the driver tests.

use std::cell::Cell;
use std::rc::Rc;

use embedded_hal::digital::{Error, ErrorKind, ErrorType, InputPin, OutputPin};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinFault;

impl Error for PinFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Clones share one electrical level, so a test keeps a tap on the line while the
/// driver owns the pin.
#[derive(Debug, Clone, Default)]
pub struct MockPin {
    level: Rc<Cell<bool>>,
    faulty: Rc<Cell<bool>>,
}

impl MockPin {
    pub fn low() -> Self {
        Self::default()
    }

    pub fn high() -> Self {
        let pin = Self::default();
        pin.set(true);
        pin
    }

    pub fn level(&self) -> bool {
        self.level.get()
    }

    pub fn set(&self, high: bool) {
        self.level.set(high);
    }

    pub fn set_faulty(&self, faulty: bool) {
        self.faulty.set(faulty);
    }
}

impl ErrorType for MockPin {
    type Error = PinFault;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), PinFault> {
        if self.faulty.get() {
            return Err(PinFault);
        }
        self.level.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), PinFault> {
        if self.faulty.get() {
            return Err(PinFault);
        }
        self.level.set(true);
        Ok(())
    }
}

impl InputPin for MockPin {
    fn is_high(&mut self) -> Result<bool, PinFault> {
        if self.faulty.get() {
            return Err(PinFault);
        }
        Ok(self.level.get())
    }

    fn is_low(&mut self) -> Result<bool, PinFault> {
        self.is_high().map(|h| !h)
    }
}
