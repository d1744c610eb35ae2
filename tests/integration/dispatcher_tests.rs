//! End-to-end command handling: datagram in, relays and store touched,
//! reply out, all through `AppService::tick`.

use relayx4::app::events::AppEvent;
use relayx4::error::{Error, ProtocolError};
use relayx4::fsm::LinkState;
use relayx4::registry::{ComponentId, Relay};
use relayx4::settings::{CodeMode, SettingsStore};

use crate::bench::Bench;
use crate::mock_hw::FlakyStore;

const ACK: &[u8] = &[0x06];
const NACK: &[u8] = &[0x15];
const FAILURE: &[u8] = &[0x15, 0x01];

/// Reboot onto the same flash.
fn reboot(bench: &mut Bench) -> Bench {
    let store = std::mem::replace(&mut bench.store, FlakyStore::new());
    let mut next = Bench::with(Bench::config(), store);
    next.bring_up();
    next
}

#[test]
fn relay_open_then_close() {
    let mut b = Bench::running();
    assert_eq!(b.send(&[0xA0, 0x01, 0x01]), ACK);
    assert!(b.hw.coil(Relay::R1));
    assert_eq!(b.app.dispatcher().engine().value(ComponentId::Relay1), 1);

    assert_eq!(b.send(&[0xA0, 0x01, 0x00]), ACK);
    assert!(!b.hw.coil(Relay::R1));
    assert!(b.sink.saw(&AppEvent::CommandApplied { kind: "simple" }));
}

#[test]
fn reply_goes_back_to_sender() {
    let mut b = Bench::running();
    b.send(&[0xA0, 0x03, 0x01]);
    assert_eq!(b.net.sent[0].1, crate::mock_hw::peer());
}

#[test]
fn unknown_class_is_nacked_and_reported() {
    let mut b = Bench::running();
    assert_eq!(b.send(&[0x42, 0x01, 0x01]), NACK);
    assert!(b.sink.saw(&AppEvent::CommandRejected(Error::Protocol(
        ProtocolError::UnknownClass(0x42)
    ))));
}

#[test]
fn empty_and_oversized_packets_are_nacked() {
    let mut b = Bench::running();
    assert_eq!(b.send(&[]), NACK);
    assert_eq!(b.send(&[0xA0; 300]), NACK);
    assert!(b.sink.saw(&AppEvent::CommandRejected(Error::Protocol(
        ProtocolError::Oversized(256)
    ))));
}

#[test]
fn packets_are_nacked_until_running() {
    let mut b = Bench::new();
    assert!(b.tick_until(LinkState::Connected, 10));
    b.net.push(&[0xA0, 0x01, 0x01]);
    while b.net.sent.is_empty() {
        assert!(b.now_ms < 1_000, "socket never opened");
        b.tick();
    }
    assert_eq!(b.net.last_reply(), Some(NACK));
    assert!(!b.hw.coil(Relay::R1));
}

#[test]
fn one_packet_per_iteration_in_arrival_order() {
    let mut b = Bench::running();
    b.net.push(&[0xA0, 0x02, 0x01]);
    b.net.push(&[0xA0, 0x02, 0x00]);
    b.tick();
    assert!(b.hw.coil(Relay::R2));
    assert_eq!(b.net.sent.len(), 1);
    b.tick();
    assert!(!b.hw.coil(Relay::R2));
    assert_eq!(b.net.sent.len(), 2);
}

#[test]
fn multiple_actuation_is_all_or_nothing() {
    let mut b = Bench::running();
    assert_eq!(b.send(&[0x0A, 0x02, 0x03, 0x01, 0x04, 0x01]), ACK);
    assert!(b.hw.coil(Relay::R3) && b.hw.coil(Relay::R4));

    // TopSwitch is an input: nothing may change.
    assert_eq!(b.send(&[0x0A, 0x02, 0x03, 0x00, 0x06, 0x00]), FAILURE);
    assert!(b.hw.coil(Relay::R3));
}

#[test]
fn delay_change_survives_reboot() {
    let mut b = Bench::running();
    assert_eq!(b.send(&[0xC0, 0x00, 0x07, 0xD0]), ACK);
    assert_eq!(b.app.dispatcher().settings().actuation_delay_ms, 2_000);

    let rebooted = reboot(&mut b);
    assert_eq!(rebooted.app.dispatcher().settings().actuation_delay_ms, 2_000);
    assert_eq!(SettingsStore::new().load(&rebooted.store).actuation_delay_ms, 2_000);
}

#[test]
fn long_delays_are_accepted() {
    let mut b = Bench::running();
    assert_eq!(b.send(&[0xC0, 0x00, 0x00, 0x01, 0x11, 0x70]), ACK);
    assert_eq!(b.app.dispatcher().settings().actuation_delay_ms, 70_000);
    assert_eq!(b.send(&[0xC0, 0x00, 0x01, 0x00, 0x00, 0x00]), ACK);
    assert_eq!(b.app.dispatcher().settings().actuation_delay_ms, 16_777_216);

    let rebooted = reboot(&mut b);
    assert_eq!(rebooted.app.dispatcher().settings().actuation_delay_ms, 16_777_216);
}

#[test]
fn failed_write_keeps_previous_settings() {
    let mut b = Bench::running();
    assert_eq!(b.send(&[0xC0, 0x00, 0x07, 0xD0]), ACK);

    b.store.fail_writes = true;
    assert_eq!(b.send(&[0xC0, 0x00, 0x0B, 0xB8]), FAILURE);
    assert_eq!(b.app.dispatcher().settings().actuation_delay_ms, 2_000);

    b.store.fail_writes = false;
    let rebooted = reboot(&mut b);
    assert_eq!(rebooted.app.dispatcher().settings().actuation_delay_ms, 2_000);
}

#[test]
fn generic_code_mode_echoes_and_persists() {
    let mut b = Bench::running();
    assert_eq!(b.send(&[0xC0, 0x01, 0x00]), [0x06, 0xC0, 0x01, 0x00]);
    assert_eq!(b.send(&[0xA0, 0x04, 0x01]), [0x06, 0xA0, 0x04, 0x01]);

    let mut rebooted = reboot(&mut b);
    assert_eq!(rebooted.app.dispatcher().settings().code_mode, CodeMode::Generic);
    assert_eq!(rebooted.send(&[0xC0, 0x01, 0x01]), ACK);
}

#[test]
fn requests_report_inputs_and_connection() {
    let mut b = Bench::running();
    b.hw.set_selector(true);
    b.tick();
    assert_eq!(b.send(&[0xB0, 0x05]), [0x06, 0x01]);
    assert_eq!(b.send(&[0xB0, 0x00]), [0x06, 0x01]);
    assert_eq!(b.send(&[0x0B, 0x03, 0x00, 0x01, 0x05]), [0x06, 0x01, 0x00, 0x01]);
}
