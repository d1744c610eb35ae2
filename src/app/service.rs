//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the link FSM, its context, and the command
//! [`Dispatcher`]. It exposes a hardware-agnostic API; all I/O flows
//! through port traits injected at call sites, so the whole service runs
//! against mock adapters in tests.
//!
//! ```text
//!       InputPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                     │        AppService         │
//!      OutputPort ◀── │  Link FSM · Dispatcher    │ ◀─▶ DatagramTransport
//!                     └──────────────────────────┘
//!  ConnectivityPort ◀─▶        ▲  StoragePort
//! ```

use log::{info, warn};

use crate::config::ControllerConfig;
use crate::error::{Error, LinkError};
use crate::fsm::context::{LinkContext, LinkRequest};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, LinkState};
use crate::protocol::codec;
use crate::protocol::codes::MAX_PACKET_LEN;
use crate::protocol::transport::{DatagramTransport, NullTransport};

use super::commands::AppCommand;
use super::credentials::WifiCredentials;
use super::dispatcher::Dispatcher;
use super::events::AppEvent;
use super::ports::{ConnectivityPort, EventSink, InputPort, OutputPort, StoragePort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    config: ControllerConfig,
    fsm: Fsm,
    ctx: LinkContext,
    dispatcher: Dispatcher,
    /// One byte of headroom so oversized datagrams are detected, not truncated.
    rx_buf: [u8; MAX_PACKET_LEN + 1],
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(config: ControllerConfig) -> Self {
        let ctx = LinkContext::new(&config);
        let dispatcher = Dispatcher::new(&config);
        let fsm = Fsm::new(build_state_table(), LinkState::Configuring);
        Self {
            config,
            fsm,
            ctx,
            dispatcher,
            rx_buf: [0; MAX_PACKET_LEN + 1],
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Load settings, force outputs safe, and enter `Configuring`.
    pub fn start(
        &mut self,
        now_ms: u64,
        hw: &mut impl OutputPort,
        storage: &mut impl StoragePort,
        wifi: &mut impl ConnectivityPort,
        sink: &mut impl EventSink,
    ) {
        self.dispatcher.safe_state(hw);
        self.dispatcher.load_settings(&*storage);
        self.ctx.now_ms = now_ms;
        self.fsm.start(&mut self.ctx);
        self.apply_link_requests(&*storage, wifi, &mut NullTransport);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("AppService started in {:?}", self.fsm.current_state());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one loop iteration:
    ///
    /// 1. observe the link and tick the link FSM
    /// 2. apply the FSM's requests to the Wi-Fi driver and transport
    /// 3. latch inputs and supervise motion (limits, deadline)
    /// 4. receive, apply and answer at most one datagram
    ///
    /// The `hw` parameter satisfies **both** [`InputPort`] and
    /// [`OutputPort`], avoiding a double mutable borrow while keeping
    /// the port boundary explicit.
    pub fn tick<T: DatagramTransport>(
        &mut self,
        now_ms: u64,
        hw: &mut (impl InputPort + OutputPort),
        storage: &mut impl StoragePort,
        wifi: &mut impl ConnectivityPort,
        transport: &mut T,
        sink: &mut impl EventSink,
    ) {
        // 1. Link
        self.ctx.now_ms = now_ms;
        self.ctx.obs.status = wifi.status();
        self.ctx.obs.credentials_valid = wifi.has_credentials();
        self.ctx.obs.service_open = transport.is_open();

        let prev = self.fsm.current_state();
        if self.fsm.tick(&mut self.ctx).is_some() {
            self.report_transition(prev, sink);
        }

        // 2. Side effects
        self.apply_link_requests(&*storage, wifi, transport);
        self.dispatcher
            .set_connection(self.fsm.current_state() == LinkState::Running);

        // 3. Motion supervision never waits on the network.
        let inputs = hw.read_inputs();
        self.dispatcher.supervise(now_ms, inputs, hw, sink);

        // 4. One datagram
        if transport.is_open() {
            self.serve_one(now_ms, hw, storage, transport, sink);
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an operator or provisioning command.
    pub fn handle_command<T: DatagramTransport>(
        &mut self,
        cmd: AppCommand,
        storage: &mut impl StoragePort,
        wifi: &mut impl ConnectivityPort,
        transport: &mut T,
        sink: &mut impl EventSink,
    ) -> Result<(), Error> {
        match cmd {
            AppCommand::RetryLink => {
                info!("AppService: link retry requested");
                self.ctx.retry_requested = true;
            }
            AppCommand::ForgetCredentials => {
                warn!("AppService: forgetting Wi-Fi credentials");
                WifiCredentials::forget(storage)?;
                wifi.clear_credentials();
                self.restart_link(storage, wifi, transport, sink);
            }
            AppCommand::Provision(creds) => {
                creds.validate()?;
                creds.save(storage)?;
                wifi.set_credentials(&creds.ssid, &creds.password)?;
                self.restart_link(storage, wifi, transport, sink);
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn link_state(&self) -> LinkState {
        self.fsm.current_state()
    }

    pub fn last_link_error(&self) -> Option<LinkError> {
        self.ctx.last_error
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    // ── Internal ──────────────────────────────────────────────

    fn serve_one<T: DatagramTransport>(
        &mut self,
        now_ms: u64,
        hw: &mut impl OutputPort,
        storage: &mut impl StoragePort,
        transport: &mut T,
        sink: &mut impl EventSink,
    ) {
        let (len, peer) = match transport.recv(&mut self.rx_buf) {
            Ok(Some(datagram)) => datagram,
            Ok(None) => return,
            Err(e) => {
                warn!("AppService: receive failed: {:?}", e);
                return;
            }
        };

        let link = self.fsm.current_state();
        let response = self.dispatcher.dispatch(
            &self.rx_buf[..len],
            link,
            now_ms,
            hw,
            storage,
            sink,
        );
        let reply = codec::encode(&response);
        if let Err(e) = transport.send_to(&reply, peer) {
            warn!("AppService: reply to {} failed: {:?}", peer, e);
        }
    }

    fn restart_link<T: DatagramTransport>(
        &mut self,
        storage: &mut impl StoragePort,
        wifi: &mut impl ConnectivityPort,
        transport: &mut T,
        sink: &mut impl EventSink,
    ) {
        let prev = self.fsm.current_state();
        if prev == LinkState::Configuring {
            self.ctx.request(LinkRequest::LoadCredentials);
        } else {
            self.fsm.force_transition(LinkState::Configuring, &mut self.ctx);
            self.report_transition(prev, sink);
        }
        self.apply_link_requests(&*storage, wifi, transport);
    }

    fn report_transition(&self, from: LinkState, sink: &mut impl EventSink) {
        let to = self.fsm.current_state();
        sink.emit(&AppEvent::LinkChanged { from, to });
        if to.is_recovering() {
            if let Some(err) = self.ctx.last_error {
                sink.emit(&AppEvent::LinkFault(err));
            }
        }
    }

    /// Carry out the side effects queued by the link FSM.
    fn apply_link_requests<T: DatagramTransport>(
        &mut self,
        storage: &impl StoragePort,
        wifi: &mut impl ConnectivityPort,
        transport: &mut T,
    ) {
        for req in self.ctx.take_requests() {
            let result = match req {
                LinkRequest::LoadCredentials => self.install_credentials(storage, wifi),
                LinkRequest::Associate => wifi.begin_association(),
                LinkRequest::OpenService => {
                    transport.open(self.config.udp_port).map_err(|e| {
                        warn!("AppService: bind :{} failed: {:?}", self.config.udp_port, e);
                        LinkError::ServiceUnavailable
                    })
                }
                LinkRequest::CloseService => {
                    transport.close();
                    Ok(())
                }
                LinkRequest::Teardown => {
                    wifi.disconnect();
                    Ok(())
                }
            };
            if let Err(e) = result {
                warn!("AppService: {:?} failed: {}", req, e);
                self.ctx.failed = Some((req, e));
            }
        }
    }

    /// Stored credentials first, then the configured fallback.
    fn install_credentials(
        &self,
        storage: &impl StoragePort,
        wifi: &mut impl ConnectivityPort,
    ) -> Result<(), LinkError> {
        if let Some(creds) = WifiCredentials::load(storage) {
            return wifi.set_credentials(&creds.ssid, &creds.password);
        }
        if self.config.wifi_ssid.is_empty() {
            info!("AppService: no Wi-Fi credentials, waiting for provisioning");
            return Ok(());
        }
        wifi.set_credentials(&self.config.wifi_ssid, &self.config.wifi_password)
    }
}
