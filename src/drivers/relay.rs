//! Relay bank driver.
//!
//! Four opto-isolated relay drivers, active HIGH, one `embedded-hal`
//! output pin each. The bank remembers the commanded level of every coil
//! so a failed pin write is visible to diagnostics instead of silently
//! diverging from the registry.

use embedded_hal::digital::OutputPin;
use log::error;

use crate::app::ports::OutputPort;
use crate::registry::Relay;

pub struct RelayBank<P: OutputPin> {
    pins: [P; 4],
    energised: [bool; 4],
    write_faults: u32,
}

impl<P: OutputPin> RelayBank<P> {
    /// Take ownership of the four coil pins (Relay1..Relay4 order) and
    /// release every coil.
    pub fn new(pins: [P; 4]) -> Self {
        let mut bank = Self {
            pins,
            energised: [false; 4],
            write_faults: 0,
        };
        bank.all_off();
        bank
    }

    pub fn is_energised(&self, relay: Relay) -> bool {
        self.energised[relay.index()]
    }

    /// Pin writes that returned an error since startup.
    pub fn write_faults(&self) -> u32 {
        self.write_faults
    }
}

impl<P: OutputPin> OutputPort for RelayBank<P> {
    fn set_relay(&mut self, relay: Relay, energised: bool) {
        let pin = &mut self.pins[relay.index()];
        let result = if energised {
            pin.set_high()
        } else {
            pin.set_low()
        };
        match result {
            Ok(()) => self.energised[relay.index()] = energised,
            Err(e) => {
                self.write_faults = self.write_faults.saturating_add(1);
                error!("Relay: {:?} write failed: {:?}", relay, e);
            }
        }
    }
}
