//! End-to-end sweep tests through the real relay bank adapter.
//!
//! The relay bank writes simulated GPIO levels on the host, so these
//! check pin polarity and the status LED as well as sweep order.

use super::mock_hw::{FakeClock, LogSink, MockNvs};

use sprinkler::adapters::relay_bank::RelayBankAdapter;
use sprinkler::app::commands::AppCommand;
use sprinkler::app::events::{AppEvent, Mode, SweepId};
use sprinkler::app::service::AppService;
use sprinkler::config::ControllerConfig;
use sprinkler::drivers::hw_init;
use sprinkler::pins::ZONE_RELAY_GPIOS;
use sprinkler::schedule::{Program, ProgramSet, ProgramSlot};
use sprinkler::zone::MAX_ZONES;

fn config(zone_count: u8, active_low: [bool; MAX_ZONES]) -> ControllerConfig {
    ControllerConfig {
        zone_count,
        relay_active_low: active_low,
        ..ControllerConfig::default()
    }
}

fn energised(bank: &RelayBankAdapter, zones: usize) -> Vec<usize> {
    (0..zones).filter(|&z| bank.is_on(z)).collect()
}

#[test]
fn quick_run_drives_pins_with_per_zone_polarity() {
    let mut active_low = [false; MAX_ZONES];
    active_low[1] = true;
    let cfg = config(3, active_low);
    hw_init::init_outputs(&cfg.relay_active_low).unwrap();

    let mut bank = RelayBankAdapter::new(3, cfg.relay_active_low);
    let mut app = AppService::new(cfg, ProgramSet::default());
    let (mut nvs, mut sink, clock) = (MockNvs::new(), LogSink::new(), FakeClock::new());
    app.start(&mut bank, &mut sink);

    // Zone 1 is active-low: released means HIGH.
    assert!(hw_init::sim_level(ZONE_RELAY_GPIOS[1]));
    assert!(!hw_init::sim_level(ZONE_RELAY_GPIOS[0]));

    app.handle_command(
        AppCommand::StartQuickRun { seconds: Some(2) },
        &clock,
        &mut bank,
        &mut nvs,
        &mut sink,
    );
    assert!(hw_init::sim_level(ZONE_RELAY_GPIOS[0]));
    assert!(bank.led_lit());

    clock.advance_secs(2);
    app.tick(&clock, &mut bank, &mut sink);
    assert_eq!(energised(&bank, 3), vec![1]);
    assert!(!hw_init::sim_level(ZONE_RELAY_GPIOS[0]));
    assert!(!hw_init::sim_level(ZONE_RELAY_GPIOS[1]));

    clock.advance_secs(2);
    app.tick(&clock, &mut bank, &mut sink);
    assert_eq!(energised(&bank, 3), vec![2]);
    assert!(hw_init::sim_level(ZONE_RELAY_GPIOS[1]));

    clock.advance_secs(2);
    app.tick(&clock, &mut bank, &mut sink);
    assert!(energised(&bank, 3).is_empty());
    assert!(!bank.led_lit());
    assert!(sink.contains(&AppEvent::SweepFinished(SweepId::QuickRun)));
}

#[test]
fn slow_ticks_never_skip_a_zone() {
    let mut bank = RelayBankAdapter::new(4, [false; MAX_ZONES]);
    let mut app = AppService::new(config(4, [false; MAX_ZONES]), ProgramSet::default());
    let (mut nvs, mut sink, clock) = (MockNvs::new(), LogSink::new(), FakeClock::new());
    app.start(&mut bank, &mut sink);
    app.handle_command(
        AppCommand::StartQuickRun { seconds: Some(1) },
        &clock,
        &mut bank,
        &mut nvs,
        &mut sink,
    );

    // A tick long overdue still moves on by exactly one zone.
    let mut visited = vec![app.quick_run_status().current_zone];
    while app.quick_run_status().is_active {
        clock.advance_secs(30);
        app.tick(&clock, &mut bank, &mut sink);
        visited.push(app.quick_run_status().current_zone);
    }
    assert_eq!(visited, vec![Some(0), Some(1), Some(2), Some(3), None]);
}

#[test]
fn program_edit_mid_sweep_does_not_reshape_it() {
    let mut programs = ProgramSet::default();
    let mut p = Program::default();
    p.durations[0] = 1;
    p.durations[2] = 1;
    *programs.get_mut(ProgramSlot::A) = p;

    let mut bank = RelayBankAdapter::new(MAX_ZONES, [false; MAX_ZONES]);
    let mut app = AppService::new(ControllerConfig::default(), programs);
    let (mut nvs, mut sink, clock) = (MockNvs::new(), LogSink::new(), FakeClock::new());
    app.start(&mut bank, &mut sink);
    assert!(app.handle_command(
        AppCommand::StartRunProgramNow(ProgramSlot::A),
        &clock,
        &mut bank,
        &mut nvs,
        &mut sink,
    ));

    app.handle_command(AppCommand::ClearPrograms, &clock, &mut bank, &mut nvs, &mut sink);
    assert_eq!(app.mode(), Mode::RunProgramNow);
    assert_eq!(app.run_program_now_status().num_zones, 2);

    clock.advance_secs(60);
    app.tick(&clock, &mut bank, &mut sink);
    assert!(sink.contains(&AppEvent::SweepAdvanced {
        sweep: SweepId::RunProgramNow,
        zone: 2
    }));
    assert_eq!(energised(&bank, MAX_ZONES), vec![2]);
}

#[test]
fn stop_run_program_now_when_idle_is_harmless() {
    let mut bank = RelayBankAdapter::new(2, [false; MAX_ZONES]);
    let mut app = AppService::new(config(2, [false; MAX_ZONES]), ProgramSet::default());
    let (mut nvs, mut sink, clock) = (MockNvs::new(), LogSink::new(), FakeClock::new());
    app.start(&mut bank, &mut sink);
    sink.clear();

    assert!(app.handle_command(
        AppCommand::StopRunProgramNow,
        &clock,
        &mut bank,
        &mut nvs,
        &mut sink
    ));
    assert!(sink.events.is_empty());
    assert_eq!(app.mode(), Mode::Automatic);
}

#[test]
fn sweep_is_timed_from_the_command_not_the_last_tick() {
    let mut bank = RelayBankAdapter::new(3, [false; MAX_ZONES]);
    let mut app = AppService::new(config(3, [false; MAX_ZONES]), ProgramSet::default());
    let (mut nvs, mut sink, clock) = (MockNvs::new(), LogSink::new(), FakeClock::new());
    app.start(&mut bank, &mut sink);
    app.tick(&clock, &mut bank, &mut sink);

    // A minute passes between the last tick and the command.
    clock.advance_secs(60);
    assert!(app.handle_command(
        AppCommand::StartQuickRun { seconds: Some(5) },
        &clock,
        &mut bank,
        &mut nvs,
        &mut sink,
    ));
    app.tick(&clock, &mut bank, &mut sink);
    assert_eq!(energised(&bank, 3), vec![0]);

    clock.advance_secs(4);
    app.tick(&clock, &mut bank, &mut sink);
    assert_eq!(energised(&bank, 3), vec![0]);

    clock.advance_secs(1);
    app.tick(&clock, &mut bank, &mut sink);
    assert_eq!(energised(&bank, 3), vec![1]);
}
