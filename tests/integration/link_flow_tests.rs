//! Link lifecycle through the real state table and the simulated Wi-Fi
//! driver: bring-up, failures, recovery, provisioning.

use relayx4::adapters::wifi::SimOutcome;
use relayx4::app::commands::AppCommand;
use relayx4::app::credentials::WifiCredentials;
use relayx4::app::events::AppEvent;
use relayx4::app::ports::ConnectivityPort;
use relayx4::config::ControllerConfig;
use relayx4::error::{Error, LinkError};
use relayx4::fsm::LinkState;
use relayx4::registry::{ComponentId, Relay};

use crate::bench::Bench;
use crate::mock_hw::FlakyStore;

fn unprovisioned() -> Bench {
    Bench::with(ControllerConfig::default(), FlakyStore::new())
}

#[test]
fn boot_releases_every_relay() {
    let b = Bench::new();
    for relay in Relay::ALL {
        assert!(b.hw.writes.contains(&(relay, false)));
        assert!(!b.hw.coil(relay));
        assert_eq!(b.app.dispatcher().engine().value(relay.component()), 0);
    }
}

#[test]
fn full_bring_up_opens_the_service() {
    let mut b = Bench::new();
    assert_eq!(b.state(), LinkState::Configuring);
    assert!(b.sink.saw(&AppEvent::Started(LinkState::Configuring)));

    b.bring_up();
    assert_eq!(b.net.port, Some(4210));
    assert_eq!(b.app.dispatcher().engine().value(ComponentId::Connection), 1);

    let path: Vec<LinkState> = b
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::LinkChanged { to, .. } => Some(*to),
            _ => None,
        })
        .collect();
    assert_eq!(
        path,
        [LinkState::Configured, LinkState::Connected, LinkState::Running]
    );
}

#[test]
fn without_credentials_the_link_waits_in_configuring() {
    let mut b = unprovisioned();
    b.advance(1_000);
    assert_eq!(b.state(), LinkState::Configuring);
    assert_eq!(b.wifi.sim_associations(), 0);
}

#[test]
fn rejected_association_goes_invalid_then_retries() {
    let mut b = Bench::new();
    b.wifi.sim_set_outcome(SimOutcome::Reject);
    assert!(b.tick_until(LinkState::Invalid, 10));
    assert!(b.sink.saw(&AppEvent::LinkFault(LinkError::AssociationFailed)));
    assert_eq!(b.app.last_link_error(), Some(LinkError::AssociationFailed));

    // The AP comes back; the backoff timer (2 s) brings the link up again.
    b.wifi.sim_set_outcome(SimOutcome::Accept);
    b.advance(1_900);
    assert_eq!(b.state(), LinkState::Invalid);
    b.advance(200);
    b.bring_up();
    assert_eq!(b.wifi.sim_associations(), 2);
}

#[test]
fn association_timeout_goes_invalid() {
    let mut b = Bench::new();
    b.wifi.sim_set_outcome(SimOutcome::NoAddress);
    assert!(b.tick_until(LinkState::Connected, 10));
    b.advance(14_900);
    assert_eq!(b.state(), LinkState::Connected);
    b.advance(200);
    assert_eq!(b.state(), LinkState::Invalid);
    assert_eq!(b.app.last_link_error(), Some(LinkError::AssociationTimeout));
}

#[test]
fn socket_bind_failure_goes_invalid() {
    let mut b = Bench::new();
    b.net.refuse_open = true;
    assert!(b.tick_until(LinkState::Invalid, 20));
    assert_eq!(b.app.last_link_error(), Some(LinkError::ServiceUnavailable));
}

#[test]
fn lost_link_disconnects_and_recovers() {
    let mut b = Bench::running();
    b.send(&[0xA0, 0x03, 0x01]);

    b.wifi.sim_drop_link();
    b.tick();
    assert_eq!(b.state(), LinkState::Disconnected);
    assert_eq!(b.net.port, None);
    assert!(b.sink.saw(&AppEvent::LinkFault(LinkError::LinkLost)));
    assert_eq!(b.app.dispatcher().engine().value(ComponentId::Connection), 0);
    // Relays keep their state across a link drop.
    assert!(b.hw.coil(Relay::R3));

    b.advance(2_100);
    b.bring_up();
    assert_eq!(b.net.opens, 2);
}

#[test]
fn retry_button_skips_the_backoff() {
    let mut b = Bench::running();
    b.wifi.sim_drop_link();
    b.tick();
    assert_eq!(b.state(), LinkState::Disconnected);

    b.command(AppCommand::RetryLink).unwrap();
    b.tick();
    assert_eq!(b.state(), LinkState::Configuring);
    b.bring_up();
    assert!(b.now_ms < 2_000);
}

#[test]
fn backoff_doubles_between_failures() {
    let mut b = Bench::new();
    b.wifi.sim_set_outcome(SimOutcome::Reject);
    assert!(b.tick_until(LinkState::Invalid, 10));
    let first = b.now_ms;
    assert!(b.tick_until(LinkState::Configuring, 300));
    assert!(b.tick_until(LinkState::Invalid, 10));
    let second = b.now_ms;
    assert!(b.tick_until(LinkState::Configuring, 600));
    let third_retry = b.now_ms;

    let gap1 = second - first;
    let gap2 = third_retry - second;
    assert!(gap1 >= 2_000 && gap1 < 2_200, "gap1={gap1}");
    assert!(gap2 >= 4_000 && gap2 < 4_100, "gap2={gap2}");
}

#[test]
fn provisioning_stores_credentials_and_connects() {
    let mut b = unprovisioned();
    b.advance(100);

    let creds = WifiCredentials::new("Workshop", "relaybench2").unwrap();
    b.command(AppCommand::Provision(creds.clone())).unwrap();
    b.bring_up();
    assert_eq!(b.wifi.ssid(), "Workshop");
    assert_eq!(WifiCredentials::load(&b.store), Some(creds));
}

#[test]
fn stored_credentials_win_over_build_defaults() {
    let mut store = FlakyStore::new();
    WifiCredentials::new("Stored", "relaybench3")
        .unwrap()
        .save(&mut store)
        .unwrap();
    let mut b = Bench::with(Bench::config(), store);
    b.bring_up();
    assert_eq!(b.wifi.ssid(), "Stored");
}

#[test]
fn invalid_provisioning_is_refused() {
    let mut b = unprovisioned();
    let bad = WifiCredentials {
        ssid: "Workshop".try_into().unwrap(),
        password: "short".try_into().unwrap(),
    };
    assert_eq!(
        b.command(AppCommand::Provision(bad)),
        Err(Error::Link(LinkError::InvalidPassword))
    );
    assert_eq!(WifiCredentials::load(&b.store), None);
}

#[test]
fn forgetting_credentials_drops_to_configuring() {
    let mut store = FlakyStore::new();
    WifiCredentials::new("Stored", "relaybench3")
        .unwrap()
        .save(&mut store)
        .unwrap();
    let mut b = Bench::with(ControllerConfig::default(), store);
    b.bring_up();

    b.command(AppCommand::ForgetCredentials).unwrap();
    assert_eq!(b.state(), LinkState::Configuring);
    assert!(!b.wifi.has_credentials());
    assert_eq!(WifiCredentials::load(&b.store), None);

    b.advance(1_000);
    assert_eq!(b.state(), LinkState::Configuring);
}
