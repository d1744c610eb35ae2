//! Test-stand axis behaviour through the full control loop: limit stops,
//! interlocks, deadline, direct relay writes.

use relayx4::actuation::{Direction, MovingState, StopReason};
use relayx4::app::events::AppEvent;
use relayx4::error::ActuationError;
use relayx4::registry::{ComponentId, Relay};

use crate::bench::Bench;

const ACK: &[u8] = &[0x06];
const FAILURE: &[u8] = &[0x15, 0x01];

const GO_UP: &[u8] = &[0xA0, 0x05, 0x02];
const GO_DOWN: &[u8] = &[0xA0, 0x05, 0x01];
const STOP: &[u8] = &[0xA0, 0x05, 0x00];

fn test_stand() -> Bench {
    let mut b = Bench::running();
    b.hw.set_selector(true);
    b.tick();
    b
}

fn moving(b: &Bench) -> MovingState {
    b.app.dispatcher().engine().moving_state()
}

/// Replay the coil writes and check up and down were never on together.
fn never_both_energised(b: &Bench) -> bool {
    let mut coils = [false; 4];
    b.hw.writes.iter().all(|&(relay, on)| {
        coils[relay.index()] = on;
        !(coils[Relay::R1.index()] && coils[Relay::R2.index()])
    })
}

#[test]
fn go_up_stops_at_top_limit_within_one_iteration() {
    let mut b = test_stand();
    assert_eq!(b.send(GO_UP), ACK);
    assert_eq!(moving(&b), MovingState::GoingUp);
    assert!(b.hw.coil(Relay::R1) && !b.hw.coil(Relay::R2));
    assert!(b.sink.saw(&AppEvent::MotionStarted(Direction::Up)));

    b.hw.set_limit(true);
    b.tick();
    assert_eq!(moving(&b), MovingState::Stopped);
    assert!(!b.hw.coil(Relay::R1));
    assert!(b.sink.saw(&AppEvent::MotionStopped(StopReason::LimitReached(Direction::Up))));
    assert_eq!(b.app.dispatcher().engine().value(ComponentId::TopSwitch), 1);
    assert_eq!(b.app.dispatcher().engine().value(ComponentId::BottomSwitch), 0);
}

#[test]
fn parked_at_top_refuses_up_and_allows_down() {
    let mut b = test_stand();
    b.send(GO_UP);
    b.hw.set_limit(true);
    b.tick();

    assert_eq!(b.send(GO_UP), FAILURE);
    assert!(!b.hw.coil(Relay::R1));

    // Leaving the top end: the still-closed line must not stop the axis.
    assert_eq!(b.send(GO_DOWN), ACK);
    b.tick();
    assert_eq!(moving(&b), MovingState::GoingDown);

    b.hw.set_limit(false);
    b.advance(500);
    b.hw.set_limit(true);
    b.tick();
    assert_eq!(moving(&b), MovingState::Stopped);
    assert!(b.sink.saw(&AppEvent::MotionStopped(StopReason::LimitReached(Direction::Down))));
    assert!(never_both_energised(&b));
}

#[test]
fn closed_line_with_unknown_position_blocks_both_directions() {
    let mut b = test_stand();
    b.hw.set_limit(true);
    b.tick();
    assert_eq!(b.send(GO_UP), FAILURE);
    assert_eq!(b.send(GO_DOWN), FAILURE);
    assert!(b.sink.saw(&AppEvent::CommandRejected(
        ActuationError::LimitClosed(Direction::Down).into()
    )));
}

#[test]
fn no_limit_before_deadline_forces_stop() {
    let mut b = test_stand();
    b.send(GO_DOWN);
    b.advance(9_900);
    assert_eq!(moving(&b), MovingState::GoingDown);

    b.advance(200);
    assert_eq!(moving(&b), MovingState::Stopped);
    assert!(!b.hw.coil(Relay::R2));
    assert!(b.sink.saw(&AppEvent::MotionStopped(StopReason::Timeout)));
    assert!(b.sink.saw(&AppEvent::MotionFault(ActuationError::MotionTimeout)));
}

#[test]
fn repeated_go_up_does_not_extend_the_deadline() {
    let mut b = test_stand();
    b.send(GO_UP);
    let deadline = b.app.dispatcher().engine().deadline_ms();
    b.advance(5_000);
    assert_eq!(b.send(GO_UP), ACK);
    assert_eq!(b.app.dispatcher().engine().deadline_ms(), deadline);
}

#[test]
fn stop_command_and_stop_while_stopped() {
    let mut b = test_stand();
    assert_eq!(b.send(STOP), ACK);
    assert_eq!(moving(&b), MovingState::Stopped);

    b.send(GO_DOWN);
    assert_eq!(b.send(STOP), ACK);
    assert_eq!(moving(&b), MovingState::Stopped);
    assert!(!b.hw.coil(Relay::R1) && !b.hw.coil(Relay::R2));
    assert!(b.sink.saw(&AppEvent::MotionStopped(StopReason::Command)));
}

#[test]
fn reversal_never_energises_both_directions() {
    let mut b = test_stand();
    b.send(GO_UP);
    b.send(GO_DOWN);
    assert_eq!(moving(&b), MovingState::GoingDown);
    assert!(b.hw.coil(Relay::R2) && !b.hw.coil(Relay::R1));
    assert!(never_both_energised(&b));
}

#[test]
fn selector_position_never_refuses_a_command() {
    for closed in [false, true] {
        let mut b = Bench::running();
        b.hw.set_selector(closed);
        b.tick();
        assert_eq!(b.send(&[0xA0, 0x01, 0x01]), ACK);
        assert_eq!(b.app.dispatcher().engine().value(ComponentId::Relay1), 1);
        assert_eq!(b.send(&[0xA0, 0x01, 0x00]), ACK);

        assert_eq!(b.send(GO_UP), ACK);
        assert_eq!(moving(&b), MovingState::GoingUp);
        assert_eq!(b.send(STOP), ACK);
    }
}

#[test]
fn direct_axis_relay_write_stops_the_axis() {
    let mut b = test_stand();
    b.send(GO_UP);
    assert_eq!(b.send(&[0xA0, 0x02, 0x01]), ACK);
    assert_eq!(moving(&b), MovingState::Stopped);
    assert!(b.hw.coil(Relay::R2) && !b.hw.coil(Relay::R1));
    assert!(b.sink.saw(&AppEvent::MotionStopped(StopReason::Override)));
    assert!(never_both_energised(&b));
}

#[test]
fn multiple_touching_an_axis_relay_stops_the_axis() {
    let mut b = test_stand();
    b.send(GO_DOWN);
    assert_eq!(b.send(&[0x0A, 0x02, 0x01, 0x01, 0x03, 0x01]), ACK);
    assert_eq!(moving(&b), MovingState::Stopped);
    assert!(b.hw.coil(Relay::R1) && b.hw.coil(Relay::R3) && !b.hw.coil(Relay::R2));
    assert!(never_both_energised(&b));
}

#[test]
fn motion_supervision_continues_while_link_is_down() {
    let mut b = test_stand();
    b.send(GO_UP);
    b.wifi.sim_drop_link();
    b.tick();
    b.hw.set_limit(true);
    b.tick();
    assert_eq!(moving(&b), MovingState::Stopped);
}
