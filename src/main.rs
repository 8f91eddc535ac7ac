//! Sprinkler Controller Firmware: Main Entry Point
//!
//! Hexagonal architecture with timer-driven execution.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  RelayBankAdapter  LogEventSink   NvsAdapter    SystemClock    │
//! │  (RelayPort)       (EventSink)    (Config+NVS)  (ClockPort)    │
//! │                                                                │
//! │  ConsoleAdapter (serial lines → AppCommand)                    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Schedule · Manual · Quick Run · Run Program Now       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_svc::sntp::{EspSntp, SntpConf};
use log::{error, info, warn};

use sprinkler::adapters::console::ConsoleAdapter;
use sprinkler::adapters::log_sink::LogEventSink;
use sprinkler::adapters::nvs::NvsAdapter;
use sprinkler::adapters::relay_bank::RelayBankAdapter;
use sprinkler::adapters::time::{self, SystemClockAdapter};
use sprinkler::app::ports::ConfigPort;
use sprinkler::app::service::AppService;
use sprinkler::config::ControllerConfig;
use sprinkler::drivers::{hw_init, watchdog::Watchdog};
use sprinkler::events::{self, Event, push_event};
use sprinkler::schedule::persist;
use sprinkler::settings::NTP_SERVER;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Sprinkler Controller v{}          ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let mut nvs = NvsAdapter::new().map_err(|e| anyhow::anyhow!("NVS init failed: {e}"))?;
    let config = match nvs.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            ControllerConfig::default()
        }
    };

    // ── 3. Outputs parked inactive before anything else runs ──
    let mut watchdog = Watchdog::default();
    if let Err(e) = hw_init::init_outputs(&config.relay_active_low) {
        // Relay pins unusable: halt and let the watchdog reset us.
        error!("GPIO init failed: {}, halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 4. Clock: time zone + SNTP ────────────────────────────
    time::apply_timezone(config.settings.posix_tz());
    let mut sntp_conf = SntpConf::default();
    sntp_conf.servers[0] = NTP_SERVER;
    let _sntp = match EspSntp::new(&sntp_conf) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!("SNTP start failed ({}), automatic schedule waits for a clock", e);
            None
        }
    };
    let clock = SystemClockAdapter::new();

    // ── 5. Construct adapters + app service ───────────────────
    let mut relays = RelayBankAdapter::new(config.zone_count as usize, config.relay_active_low);
    let mut log_sink = LogEventSink::new();

    let programs = persist::load_from(&nvs);
    if let Err(issue) = programs.verify() {
        warn!("Stored programs: {}", issue);
    }
    let mut app = AppService::new(config.clone(), programs);
    app.start(&mut relays, &mut log_sink);

    // ── 6. Serial console command ingress ─────────────────────
    let console = match ConsoleAdapter::spawn_stdin(events::signal_command) {
        Ok(c) => Some(c),
        Err(e) => {
            warn!("Console reader failed to start ({}), no command input", e);
            None
        }
    };

    info!("System ready. Entering event loop.");

    // ── 7. Event loop ─────────────────────────────────────────
    let interval = std::time::Duration::from_millis(u64::from(config.control_loop_interval_ms));
    let status_every = (u64::from(config.status_interval_secs) * 1000)
        .div_ceil(u64::from(config.control_loop_interval_ms))
        .max(1);
    let mut status_counter: u64 = 0;
    let mut applied_tz = config.settings.posix_tz();

    loop {
        std::thread::sleep(interval);
        push_event(Event::ControlTick);
        if events::take_command_signal() {
            push_event(Event::CommandReceived);
        }

        status_counter += 1;
        if status_counter >= status_every {
            push_event(Event::StatusTick);
            status_counter = 0;
        }

        events::drain_events(|event| match event {
            Event::ControlTick => app.tick(&clock, &mut relays, &mut log_sink),
            Event::StatusTick => app.emit_status(&mut log_sink),
            Event::CommandReceived => {
                let Some(console) = console.as_ref() else {
                    return;
                };
                while let Some(cmd) = console.try_recv() {
                    let cmd = cmd.into_app_command(app.settings());
                    info!("Console: {:?}", cmd);
                    app.handle_command(cmd, &clock, &mut relays, &mut nvs, &mut log_sink);
                }
            }
        });

        // Settings changed at runtime: re-apply the time zone.
        let tz = app.settings().posix_tz();
        if tz != applied_tz {
            time::apply_timezone(tz);
            applied_tz = tz;
        }

        // Config auto-save (5 s debounce after last change).
        app.auto_save_if_needed(&nvs);

        watchdog.feed();
    }
}
