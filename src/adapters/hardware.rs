//! Hardware adapter: bridges the pin drivers to the domain port traits.
//!
//! Owns the [`RelayBank`] and the selector/limit [`Switch`]es, exposing
//! them through [`OutputPort`] and [`InputPort`]. This is the only module
//! in the system that samples the switch inputs. On boards where both
//! limit switches share one input, the bottom switch is absent and the
//! shared line is reported on both raw channels.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::{InputPort, InputSnapshot, OutputPort};
use crate::drivers::relay::RelayBank;
use crate::drivers::switch::Switch;
use crate::registry::Relay;

pub struct HardwareAdapter<O: OutputPin, I: InputPin> {
    relays: RelayBank<O>,
    func_mode: Switch<I>,
    top: Switch<I>,
    bottom: Option<Switch<I>>,
}

impl<O: OutputPin, I: InputPin> HardwareAdapter<O, I> {
    /// `bottom` is `None` when the limit switches are wired to one input.
    pub fn new(
        relays: RelayBank<O>,
        func_mode: Switch<I>,
        top: Switch<I>,
        bottom: Option<Switch<I>>,
    ) -> Self {
        Self {
            relays,
            func_mode,
            top: top.fail_closed(),
            bottom: bottom.map(Switch::fail_closed),
        }
    }

    pub fn relays(&self) -> &RelayBank<O> {
        &self.relays
    }
}

// ── InputPort implementation ──────────────────────────────────

impl<O: OutputPin, I: InputPin> InputPort for HardwareAdapter<O, I> {
    fn read_inputs(&mut self) -> InputSnapshot {
        let top_raw = self.top.is_closed();
        let bottom_raw = match self.bottom.as_mut() {
            Some(sw) => sw.is_closed(),
            None => top_raw,
        };
        InputSnapshot {
            func_mode: self.func_mode.is_closed(),
            top_raw,
            bottom_raw,
        }
    }
}

// ── OutputPort implementation ─────────────────────────────────

impl<O: OutputPin, I: InputPin> OutputPort for HardwareAdapter<O, I> {
    fn set_relay(&mut self, relay: Relay, energised: bool) {
        self.relays.set_relay(relay, energised);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::mock_pin::MockPin;

    fn coils() -> ([MockPin; 4], RelayBank<MockPin>) {
        let pins = [MockPin::low(), MockPin::low(), MockPin::low(), MockPin::low()];
        let taps = pins.clone();
        (taps, RelayBank::new(pins))
    }

    #[test]
    fn shared_limit_line_reports_on_both_channels() {
        let (_, bank) = coils();
        let mode = MockPin::high();
        let limit = MockPin::low();
        let mut hw = HardwareAdapter::new(
            bank,
            Switch::new(mode, true),
            Switch::new(limit.clone(), true),
            None,
        );
        let snap = hw.read_inputs();
        assert!(!snap.func_mode);
        assert!(snap.top_raw && snap.bottom_raw);

        limit.set(true);
        let snap = hw.read_inputs();
        assert!(!snap.top_raw && !snap.bottom_raw);
    }

    #[test]
    fn separate_limit_lines_are_independent() {
        let (_, bank) = coils();
        let mut hw = HardwareAdapter::new(
            bank,
            Switch::new(MockPin::low(), true),
            Switch::new(MockPin::high(), true),
            Some(Switch::new(MockPin::low(), true)),
        );
        let snap = hw.read_inputs();
        assert!(snap.func_mode);
        assert!(!snap.top_raw);
        assert!(snap.bottom_raw);
    }

    #[test]
    fn unreadable_limit_reads_closed() {
        let (_, bank) = coils();
        let limit = MockPin::high();
        limit.set_faulty(true);
        let mut hw = HardwareAdapter::new(
            bank,
            Switch::new(MockPin::high(), true),
            Switch::new(limit, true),
            None,
        );
        assert!(hw.read_inputs().top_raw);
    }

    #[test]
    fn output_port_drives_relay_pins() {
        let (taps, bank) = coils();
        let mut hw = HardwareAdapter::new(
            bank,
            Switch::new(MockPin::high(), true),
            Switch::new(MockPin::high(), true),
            None,
        );
        hw.set_relay(Relay::R4, true);
        assert!(taps[3].level());
        hw.all_off();
        assert!(!taps[3].level());
        assert!(!hw.relays().is_energised(Relay::R4));
    }
}
