//! RelayX4 Firmware: Main Entry Point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter   MonotonicClock  │
//! │  (Input+Output)    (EventSink)    (Storage)    (ms since boot) │
//! │  WifiAdapter       UdpTransport                                │
//! │  (Connectivity)    (Datagrams)                                 │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Link FSM · Dispatcher · Actuation · Settings          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  ButtonDriver · StatusLed · Watchdog                           │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result, anyhow};
use log::{info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::{AnyIOPin, AnyOutputPin, IOPin, Input, OutputPin, PinDriver, Pull};
use esp_idf_svc::hal::prelude::Peripherals;
use esp_idf_svc::ipv4::{
    ClientConfiguration as IpClientConfiguration, ClientSettings as IpClientSettings,
    Configuration as IpConfiguration, Mask, Subnet,
};
use esp_idf_svc::netif::{EspNetif, NetifConfiguration};
use esp_idf_svc::wifi::EspWifi;

use relayx4::adapters::hardware::HardwareAdapter;
use relayx4::adapters::log_sink::LogEventSink;
use relayx4::adapters::nvs::NvsAdapter;
use relayx4::adapters::time::MonotonicClock;
use relayx4::adapters::udp::UdpTransport;
use relayx4::adapters::wifi::WifiAdapter;
use relayx4::app::commands::AppCommand;
use relayx4::app::service::AppService;
use relayx4::config::{ControllerConfig, StaticIpv4};
use relayx4::drivers::button::{ButtonDriver, ButtonEvent};
use relayx4::drivers::relay::RelayBank;
use relayx4::drivers::status_led::StatusLed;
use relayx4::drivers::switch::Switch;
use relayx4::drivers::watchdog::Watchdog;
use relayx4::pins;
use relayx4::safety::LimitWiring;

type InPin = PinDriver<'static, AnyIOPin, Input>;

// ── Bring-up helpers ──────────────────────────────────────────

/// Build-time fallback credentials (`RELAYX4_WIFI_SSID` / `_PASSWORD`).
fn apply_build_credentials(config: &mut ControllerConfig) {
    if let Some(ssid) = option_env!("RELAYX4_WIFI_SSID") {
        config.wifi_ssid.clear();
        if config.wifi_ssid.push_str(ssid).is_err() {
            warn!("Config: build-time SSID too long, ignored");
            config.wifi_ssid.clear();
        }
    }
    if let Some(password) = option_env!("RELAYX4_WIFI_PASSWORD") {
        config.wifi_password.clear();
        if config.wifi_password.push_str(password).is_err() {
            warn!("Config: build-time password too long, ignored");
            config.wifi_password.clear();
        }
    }
}

fn input(pin: AnyIOPin) -> Result<InPin> {
    let mut driver = PinDriver::input(pin)?;
    driver.set_pull(Pull::Up)?;
    Ok(driver)
}

fn static_netif(ip: &StaticIpv4) -> Result<EspNetif> {
    let [a, b, c, d] = ip.ip;
    let [ga, gb, gc, gd] = ip.gateway;
    let conf = NetifConfiguration {
        ip_configuration: Some(IpConfiguration::Client(IpClientConfiguration::Fixed(
            IpClientSettings {
                ip: std::net::Ipv4Addr::new(a, b, c, d),
                subnet: Subnet {
                    gateway: std::net::Ipv4Addr::new(ga, gb, gc, gd),
                    mask: Mask(ip.prefix_len()),
                },
                dns: None,
                secondary_dns: None,
            },
        ))),
        ..NetifConfiguration::wifi_default_client()
    };
    Ok(EspNetif::new_with_conf(&conf)?)
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  RelayX4 v{}                         ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let mut config = ControllerConfig::default();
    apply_build_credentials(&mut config);
    config.validate().map_err(|e| anyhow!("invalid configuration: {e}"))?;

    let watchdog = Watchdog::new(config.watchdog_timeout_ms);
    let peripherals = Peripherals::take()?;
    let p = peripherals.pins;

    // ── 3. GPIO ───────────────────────────────────────────────
    // Coils come up released: RelayBank::new drives every pin LOW.
    let coil = |pin: AnyOutputPin| PinDriver::output(pin);
    let relays = RelayBank::new([
        coil(p.gpio15.downgrade_output())?,
        coil(p.gpio14.downgrade_output())?,
        coil(p.gpio12.downgrade_output())?,
        coil(p.gpio13.downgrade_output())?,
    ]);

    let active_low = config.switch_active_low;
    let func_mode = Switch::new(input(p.gpio5.downgrade())?, active_low);
    let top = Switch::new(input(p.gpio4.downgrade())?, active_low);
    if config.limit_wiring == LimitWiring::Separate {
        warn!("Config: separate limit wiring requested but this board has one limit input");
    }
    debug_assert!(pins::limit_switches_share_pin());
    let mut hw = HardwareAdapter::new(relays, func_mode, top, None);

    let mut led = StatusLed::new(PinDriver::output(p.gpio2.downgrade_output())?);
    let mut button = ButtonDriver::new(
        input(p.gpio16.downgrade())?,
        true,
        config.button_long_press_ms,
    );

    // ── 4. Storage, Wi-Fi, UDP ────────────────────────────────
    let mut nvs = NvsAdapter::new().map_err(|e| anyhow!("NVS init failed: {e}"))?;

    let sysloop = EspSystemEventLoop::take()?;
    let mut esp_wifi = EspWifi::new(peripherals.modem, sysloop, None)?;
    if let Some(ip) = config.static_ip.as_ref() {
        esp_wifi
            .swap_netif_sta(static_netif(ip)?)
            .context("failed to apply static IP netif configuration")?;
        info!("Network: static address {:?}/{}", ip.ip, ip.prefix_len());
    }
    let mut wifi = WifiAdapter::new(esp_wifi);
    let mut udp = UdpTransport::new();

    // ── 5. Application service ────────────────────────────────
    let clock = MonotonicClock::new();
    let mut sink = LogEventSink::new();
    let loop_interval_ms = config.loop_interval_ms;
    let mut app = AppService::new(config);
    app.start(clock.now_ms(), &mut hw, &mut nvs, &mut wifi, &mut sink);

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    loop {
        let now_ms = clock.now_ms();

        app.tick(now_ms, &mut hw, &mut nvs, &mut wifi, &mut udp, &mut sink);

        if let Some(gesture) = button.tick(now_ms) {
            let cmd = match gesture {
                ButtonEvent::ShortPress => {
                    info!("Button: short press → retry link");
                    AppCommand::RetryLink
                }
                ButtonEvent::LongPress => {
                    info!("Button: long press → forget credentials");
                    AppCommand::ForgetCredentials
                }
            };
            if let Err(e) = app.handle_command(cmd, &mut nvs, &mut wifi, &mut udp, &mut sink) {
                warn!("Button command failed: {}", e);
            }
        }

        led.update(app.link_state(), now_ms);
        watchdog.feed();
        FreeRtos::delay_ms(loop_interval_ms);
    }
}
