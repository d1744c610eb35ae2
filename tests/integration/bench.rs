//! A complete controller on the bench: `AppService` wired to the mock
//! adapters and the simulated Wi-Fi driver, with a hand-cranked clock.

use relayx4::adapters::wifi::WifiAdapter;
use relayx4::app::commands::AppCommand;
use relayx4::app::service::AppService;
use relayx4::config::ControllerConfig;
use relayx4::error::Error;
use relayx4::fsm::LinkState;

use crate::mock_hw::{FlakyStore, MockHardware, MockTransport, RecordingSink};

pub const TICK_MS: u64 = 10;

pub struct Bench {
    pub app: AppService,
    pub hw: MockHardware,
    pub store: FlakyStore,
    pub wifi: WifiAdapter,
    pub net: MockTransport,
    pub sink: RecordingSink,
    pub now_ms: u64,
}

#[allow(dead_code)]
impl Bench {
    /// Fallback credentials for the simulated access point.
    pub fn config() -> ControllerConfig {
        let mut config = ControllerConfig::default();
        config.wifi_ssid.push_str("Bench").unwrap();
        config.wifi_password.push_str("relaybench1").unwrap();
        config
    }

    /// Started, not yet ticked.
    pub fn new() -> Self {
        Self::with(Self::config(), FlakyStore::new())
    }

    pub fn with(config: ControllerConfig, mut store: FlakyStore) -> Self {
        let mut app = AppService::new(config);
        let mut hw = MockHardware::new();
        let mut wifi = WifiAdapter::new();
        let mut sink = RecordingSink::new();
        app.start(0, &mut hw, &mut store, &mut wifi, &mut sink);
        Self {
            app,
            hw,
            store,
            wifi,
            net: MockTransport::new(),
            sink,
            now_ms: 0,
        }
    }

    /// Started and brought up to `Running`.
    pub fn running() -> Self {
        let mut bench = Self::new();
        bench.bring_up();
        bench
    }

    pub fn state(&self) -> LinkState {
        self.app.link_state()
    }

    pub fn tick(&mut self) {
        self.now_ms += TICK_MS;
        self.app.tick(
            self.now_ms,
            &mut self.hw,
            &mut self.store,
            &mut self.wifi,
            &mut self.net,
            &mut self.sink,
        );
    }

    /// Tick until `ms` of bench time have passed.
    pub fn advance(&mut self, ms: u64) {
        let until = self.now_ms + ms;
        while self.now_ms < until {
            self.tick();
        }
    }

    /// Tick until the link reaches `state`, at most `max_ticks` times.
    pub fn tick_until(&mut self, state: LinkState, max_ticks: usize) -> bool {
        for _ in 0..max_ticks {
            if self.state() == state {
                return true;
            }
            self.tick();
        }
        self.state() == state
    }

    pub fn bring_up(&mut self) {
        assert!(
            self.tick_until(LinkState::Running, 20),
            "link stuck in {:?}",
            self.state()
        );
    }

    /// Deliver one datagram and return the reply sent in the same tick.
    pub fn send(&mut self, packet: &[u8]) -> Vec<u8> {
        let before = self.net.sent.len();
        self.net.push(packet);
        self.tick();
        assert_eq!(self.net.sent.len(), before + 1, "no reply to {:02X?}", packet);
        self.net.last_reply().unwrap().to_vec()
    }

    pub fn command(&mut self, cmd: AppCommand) -> Result<(), Error> {
        self.app.handle_command(
            cmd,
            &mut self.store,
            &mut self.wifi,
            &mut self.net,
            &mut self.sink,
        )
    }
}
