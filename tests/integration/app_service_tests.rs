//! Integration tests for the AppService → relays pipeline.
//!
//! These run on the host (x86_64) and drive the service the way the
//! firmware loop does: ticks from a fake clock, commands from the web
//! layer, relay writes recorded by a mock bank.

use super::mock_hw::{FakeClock, LogSink, MockNvs, MockRelays};

use sprinkler::app::commands::AppCommand;
use sprinkler::app::events::{AppEvent, Mode, SweepId};
use sprinkler::app::ports::{StorageError, StoragePort};
use sprinkler::app::service::AppService;
use sprinkler::config::ControllerConfig;
use sprinkler::schedule::{DayMask, Program, ProgramSet, ProgramSlot, TimeOfDay, Weekday, persist};
use sprinkler::settings::{Settings, TimeZone};
use sprinkler::zone::MAX_ZONES;

struct Rig {
    app: AppService,
    relays: MockRelays,
    nvs: MockNvs,
    sink: LogSink,
    clock: FakeClock,
}

impl Rig {
    fn new(programs: ProgramSet) -> Self {
        let mut app = AppService::new(ControllerConfig::default(), programs);
        let mut relays = MockRelays::new();
        let mut sink = LogSink::new();
        app.start(&mut relays, &mut sink);
        Self {
            app,
            relays,
            nvs: MockNvs::new(),
            sink,
            clock: FakeClock::new(),
        }
    }

    fn idle() -> Self {
        Self::new(ProgramSet::default())
    }

    fn send(&mut self, cmd: AppCommand) -> bool {
        self.app
            .handle_command(cmd, &self.clock, &mut self.relays, &mut self.nvs, &mut self.sink)
    }

    fn tick(&mut self) {
        self.app.tick(&self.clock, &mut self.relays, &mut self.sink);
    }

    fn tick_after_secs(&mut self, secs: u64) {
        self.clock.advance_secs(secs);
        self.tick();
    }
}

fn program(start: &str, durations: &[(usize, u16)]) -> Program {
    let mut p = Program {
        start_time: TimeOfDay::parse(start),
        enabled: true,
        days: DayMask::EVERY_DAY,
        durations: [0; MAX_ZONES],
    };
    for &(zone, minutes) in durations {
        p.durations[zone] = minutes;
    }
    p
}

fn only_a(p: Program) -> ProgramSet {
    let mut set = ProgramSet::default();
    *set.get_mut(ProgramSlot::A) = p;
    set
}

// ── Startup ──────────────────────────────────────────────────

#[test]
fn start_drives_all_relays_off_and_announces() {
    let rig = Rig::idle();
    assert_eq!(rig.relays.calls.first(), Some(&super::mock_hw::RelayCall::AllOff));
    assert!(rig.sink.contains(&AppEvent::Started { zones: MAX_ZONES }));
    assert_eq!(rig.app.mode(), Mode::Automatic);
}

// ── Automatic schedule ───────────────────────────────────────

#[test]
fn schedule_runs_zones_back_to_back() {
    let mut rig = Rig::new(only_a(program("06:00", &[(0, 10), (2, 5)])));
    rig.clock.set_wall(Weekday::Monday, 5, 59);
    rig.tick();
    assert!(rig.sink.contains(&AppEvent::ScheduleRecomputed {
        day: Weekday::Monday,
        windows: 2
    }));
    assert!(rig.relays.on_zones().is_empty());

    rig.clock.set_wall(Weekday::Monday, 6, 0);
    rig.tick();
    assert_eq!(rig.relays.on_zones(), vec![0]);

    rig.clock.set_wall(Weekday::Monday, 6, 10);
    rig.tick();
    assert_eq!(rig.relays.on_zones(), vec![2]);

    rig.clock.set_wall(Weekday::Monday, 6, 15);
    rig.tick();
    assert!(rig.relays.on_zones().is_empty());
    assert_eq!(rig.relays.peak_on, 1);
}

#[test]
fn unsynced_clock_keeps_schedule_idle() {
    let mut rig = Rig::new(only_a(program("00:00", &[(0, 600)])));
    rig.tick();
    assert!(rig.relays.on_zones().is_empty());
    assert!(!rig.app.build_status().clock_synced);
}

#[test]
fn losing_sync_turns_scheduled_zone_off() {
    let mut rig = Rig::new(only_a(program("06:00", &[(1, 30)])));
    rig.clock.set_wall(Weekday::Friday, 6, 5);
    rig.tick();
    assert!(rig.relays.is_on(1));

    rig.clock.unsync();
    rig.tick();
    assert!(!rig.relays.is_on(1));
}

#[test]
fn window_crossing_midnight_is_active_after_midnight() {
    let mut rig = Rig::new(only_a(program("23:50", &[(0, 20)])));
    rig.clock.set_wall(Weekday::Monday, 0, 5);
    rig.tick();
    assert!(rig.relays.is_on(0));

    rig.clock.set_wall(Weekday::Monday, 0, 10);
    rig.tick();
    assert!(!rig.relays.is_on(0));
}

#[test]
fn day_rollover_recomputes_windows() {
    let mut days = DayMask::NONE;
    days.set(Weekday::Monday, true);
    let mut p = program("06:00", &[(3, 15)]);
    p.days = days;
    let mut rig = Rig::new(only_a(p));

    rig.clock.set_wall(Weekday::Monday, 23, 0);
    rig.tick();
    assert!(rig.sink.contains(&AppEvent::ScheduleRecomputed {
        day: Weekday::Monday,
        windows: 1
    }));
    assert!(rig.app.calculated(3).unwrap()[0].window().is_some());

    rig.clock.set_wall(Weekday::Tuesday, 6, 5);
    rig.tick();
    assert!(rig.sink.contains(&AppEvent::ScheduleRecomputed {
        day: Weekday::Tuesday,
        windows: 0
    }));
    assert!(!rig.relays.is_on(3));
    assert!(rig.app.calculated(3).unwrap()[0].window().is_none());
}

#[test]
fn disabled_zone_is_skipped_by_schedule() {
    let mut rig = Rig::new(only_a(program("06:00", &[(2, 10)])));
    assert!(rig.send(AppCommand::SetZoneDisabled {
        zone: 2,
        disabled: true
    }));
    rig.clock.set_wall(Weekday::Sunday, 6, 1);
    rig.tick();
    assert!(!rig.relays.is_on(2));
    assert!(!rig.app.is_active(2, Weekday::Sunday, 6, 1));
}

#[test]
fn saving_programs_takes_effect_without_waiting_for_midnight() {
    let mut rig = Rig::idle();
    rig.clock.set_wall(Weekday::Wednesday, 7, 0);
    rig.tick();
    assert!(!rig.relays.is_on(4));

    assert!(rig.send(AppCommand::SavePrograms(only_a(program("07:00", &[(4, 30)])))));
    assert!(rig.relays.is_on(4));
}

// ── Quick Run ────────────────────────────────────────────────

#[test]
fn quick_run_visits_every_zone_once() {
    let mut rig = Rig::idle();
    assert!(rig.send(AppCommand::StartQuickRun { seconds: Some(5) }));
    assert_eq!(rig.app.mode(), Mode::QuickRun);
    assert!(rig.sink.contains(&AppEvent::SweepStarted {
        sweep: SweepId::QuickRun,
        zones: MAX_ZONES
    }));
    assert_eq!(rig.relays.on_zones(), vec![0]);

    for zone in 1..MAX_ZONES {
        rig.tick_after_secs(5);
        assert_eq!(rig.relays.on_zones(), vec![zone]);
    }
    rig.tick_after_secs(5);

    assert!(rig.relays.on_zones().is_empty());
    assert!(rig.sink.contains(&AppEvent::SweepFinished(SweepId::QuickRun)));
    assert!(rig.sink.contains(&AppEvent::ModeChanged {
        from: Mode::QuickRun,
        to: Mode::Automatic
    }));
    assert_eq!(rig.relays.peak_on, 1);
}

#[test]
fn quick_run_without_seconds_uses_default() {
    let mut rig = Rig::idle();
    assert!(rig.send(AppCommand::StartQuickRun { seconds: None }));
    assert_eq!(rig.app.quick_run_status().duration, 10);
}

#[test]
fn quick_run_of_zero_seconds_is_rejected() {
    let mut rig = Rig::idle();
    assert!(!rig.send(AppCommand::StartQuickRun { seconds: Some(0) }));
    assert_eq!(rig.app.mode(), Mode::Automatic);
    assert!(rig.relays.on_zones().is_empty());
}

#[test]
fn quick_run_skips_zones_disabled_before_start() {
    let mut rig = Rig::idle();
    rig.send(AppCommand::SetZoneDisabled {
        zone: 0,
        disabled: true,
    });
    assert!(rig.send(AppCommand::StartQuickRun { seconds: Some(5) }));
    assert_eq!(rig.app.quick_run_status().num_zones, MAX_ZONES - 1);
    assert_eq!(rig.relays.on_zones(), vec![1]);
}

#[test]
fn disabling_current_zone_mid_sweep_forces_it_off() {
    let mut rig = Rig::idle();
    rig.send(AppCommand::StartQuickRun { seconds: Some(5) });
    assert!(rig.relays.is_on(0));

    rig.send(AppCommand::SetZoneDisabled {
        zone: 0,
        disabled: true,
    });
    assert!(!rig.relays.is_on(0));
    assert_eq!(rig.app.quick_run_status().current_zone, Some(0));

    rig.tick_after_secs(5);
    assert_eq!(rig.relays.on_zones(), vec![1]);
}

#[test]
fn stop_quick_run_turns_everything_off() {
    let mut rig = Rig::idle();
    rig.send(AppCommand::StartQuickRun { seconds: Some(30) });
    rig.tick_after_secs(30);
    assert!(rig.relays.is_on(1));

    assert!(rig.send(AppCommand::StopQuickRun));
    assert!(rig.relays.on_zones().is_empty());
    assert!(rig.sink.contains(&AppEvent::SweepStopped(SweepId::QuickRun)));
    let status = rig.app.quick_run_status();
    assert!(!status.is_active);
    assert_eq!(status.current_zone, None);
}

#[test]
fn quick_run_overrides_schedule_then_hands_back() {
    let mut rig = Rig::new(only_a(program("06:00", &[(7, 60)])));
    rig.clock.set_wall(Weekday::Monday, 6, 30);
    rig.tick();
    assert!(rig.relays.is_on(7));

    rig.send(AppCommand::StartQuickRun { seconds: Some(1) });
    assert_eq!(rig.relays.on_zones(), vec![0]);

    for _ in 0..MAX_ZONES {
        rig.tick_after_secs(1);
    }
    assert_eq!(rig.app.mode(), Mode::Automatic);
    assert_eq!(rig.relays.on_zones(), vec![7]);
}

// ── Run Program Now ──────────────────────────────────────────

#[test]
fn run_program_now_uses_program_durations() {
    let mut programs = ProgramSet::default();
    *programs.get_mut(ProgramSlot::B) = program("", &[(1, 2), (3, 1)]);
    let mut rig = Rig::new(programs);

    assert!(rig.send(AppCommand::StartRunProgramNow(ProgramSlot::B)));
    assert_eq!(rig.app.mode(), Mode::RunProgramNow);
    let status = rig.app.run_program_now_status();
    assert_eq!(status.current_zone, Some(1));
    assert_eq!(status.num_zones, 2);
    assert_eq!(status.duration, 120);
    assert_eq!(rig.relays.on_zones(), vec![1]);

    rig.tick_after_secs(120);
    assert_eq!(rig.relays.on_zones(), vec![3]);
    rig.tick_after_secs(60);
    assert!(rig.relays.on_zones().is_empty());
    assert!(rig.sink.contains(&AppEvent::SweepFinished(SweepId::RunProgramNow)));
}

#[test]
fn run_program_now_with_no_durations_does_not_start() {
    let mut rig = Rig::idle();
    assert!(!rig.send(AppCommand::StartRunProgramNow(ProgramSlot::C)));
    assert_eq!(rig.app.mode(), Mode::Automatic);
}

#[test]
fn run_program_now_leaves_start_time_untouched() {
    let mut rig = Rig::new(only_a(program("05:30", &[(0, 1)])));
    rig.send(AppCommand::StartRunProgramNow(ProgramSlot::A));
    assert_eq!(
        rig.app.programs().get(ProgramSlot::A).start_time,
        TimeOfDay::parse("05:30")
    );
}

#[test]
fn starting_one_sweep_stops_the_other() {
    let mut rig = Rig::new(only_a(program("06:00", &[(5, 1)])));
    rig.send(AppCommand::StartQuickRun { seconds: Some(5) });
    assert!(rig.relays.is_on(0));

    rig.send(AppCommand::StartRunProgramNow(ProgramSlot::A));
    assert!(rig.sink.contains(&AppEvent::SweepStopped(SweepId::QuickRun)));
    assert!(!rig.app.quick_run_status().is_active);
    assert_eq!(rig.relays.on_zones(), vec![5]);

    rig.send(AppCommand::StartQuickRun { seconds: Some(5) });
    assert!(rig.sink.contains(&AppEvent::SweepStopped(SweepId::RunProgramNow)));
    assert_eq!(rig.relays.on_zones(), vec![0]);
    assert_eq!(rig.relays.peak_on, 1);
}

#[test]
fn restarting_a_sweep_reports_the_old_one_stopped() {
    let mut rig = Rig::new(only_a(program("06:00", &[(2, 1)])));
    rig.send(AppCommand::StartQuickRun { seconds: Some(5) });
    rig.tick_after_secs(5);
    assert_eq!(rig.relays.on_zones(), vec![1]);
    rig.sink.clear();

    assert!(rig.send(AppCommand::StartQuickRun { seconds: Some(5) }));
    assert_eq!(
        rig.sink.events[..2],
        [
            AppEvent::SweepStopped(SweepId::QuickRun),
            AppEvent::SweepStarted {
                sweep: SweepId::QuickRun,
                zones: MAX_ZONES
            },
        ]
    );
    assert_eq!(rig.relays.on_zones(), vec![0]);

    rig.send(AppCommand::StartRunProgramNow(ProgramSlot::A));
    rig.sink.clear();
    assert!(rig.send(AppCommand::StartRunProgramNow(ProgramSlot::A)));
    assert!(rig.sink.contains(&AppEvent::SweepStopped(SweepId::RunProgramNow)));
    assert!(!rig.sink.contains(&AppEvent::SweepStopped(SweepId::QuickRun)));
    assert_eq!(rig.relays.on_zones(), vec![2]);
}

// ── Manual mode ──────────────────────────────────────────────

#[test]
fn manual_toggle_only_works_in_manual_mode() {
    let mut rig = Rig::idle();
    assert!(!rig.send(AppCommand::ToggleManualZone(3)));
    assert!(!rig.relays.is_on(3));

    assert!(rig.send(AppCommand::SetManualMode(true)));
    assert_eq!(rig.app.mode(), Mode::Manual);
    assert!(rig.send(AppCommand::ToggleManualZone(3)));
    assert!(rig.relays.is_on(3));
    assert!(rig.send(AppCommand::ToggleManualZone(3)));
    assert!(!rig.relays.is_on(3));
    assert!(!rig.send(AppCommand::ToggleManualZone(MAX_ZONES)));
}

#[test]
fn manual_mode_allows_several_zones_and_clears_on_exit() {
    let mut rig = Rig::idle();
    rig.send(AppCommand::SetManualMode(true));
    rig.send(AppCommand::ToggleManualZone(1));
    rig.send(AppCommand::ToggleManualZone(6));
    assert_eq!(rig.relays.on_zones(), vec![1, 6]);

    rig.send(AppCommand::SetManualMode(false));
    assert!(rig.relays.on_zones().is_empty());
    assert!(!rig.app.zone(1).unwrap().manual_on);
    assert_eq!(rig.app.mode(), Mode::Automatic);
}

#[test]
fn manual_mode_suppresses_schedule() {
    let mut rig = Rig::new(only_a(program("06:00", &[(2, 30)])));
    rig.clock.set_wall(Weekday::Monday, 6, 10);
    rig.tick();
    assert!(rig.relays.is_on(2));

    rig.send(AppCommand::SetManualMode(true));
    assert!(!rig.relays.is_on(2));
}

#[test]
fn entering_manual_mode_stops_running_sweep() {
    let mut rig = Rig::idle();
    rig.send(AppCommand::StartQuickRun { seconds: Some(5) });
    rig.send(AppCommand::SetManualMode(true));
    assert!(rig.sink.contains(&AppEvent::SweepStopped(SweepId::QuickRun)));
    assert!(rig.relays.on_zones().is_empty());
    assert_eq!(rig.app.mode(), Mode::Manual);
}

#[test]
fn sweep_started_in_manual_mode_wins_then_manual_resumes() {
    let mut rig = Rig::idle();
    rig.send(AppCommand::SetManualMode(true));
    rig.send(AppCommand::ToggleManualZone(5));
    assert!(rig.relays.is_on(5));

    rig.send(AppCommand::StartQuickRun { seconds: Some(1) });
    assert_eq!(rig.relays.on_zones(), vec![0]);
    assert_eq!(rig.app.mode(), Mode::QuickRun);

    for _ in 0..MAX_ZONES {
        rig.tick_after_secs(1);
    }
    assert_eq!(rig.app.mode(), Mode::Manual);
    assert_eq!(rig.relays.on_zones(), vec![5]);
}

#[test]
fn disabling_a_zone_clears_its_manual_request() {
    let mut rig = Rig::idle();
    rig.send(AppCommand::SetManualMode(true));
    rig.send(AppCommand::ToggleManualZone(4));
    rig.send(AppCommand::SetZoneDisabled {
        zone: 4,
        disabled: true,
    });
    assert!(!rig.relays.is_on(4));

    rig.send(AppCommand::SetZoneDisabled {
        zone: 4,
        disabled: false,
    });
    assert!(!rig.relays.is_on(4));
    assert!(!rig.send(AppCommand::SetZoneDisabled {
        zone: MAX_ZONES,
        disabled: true
    }));
}

// ── Program storage ──────────────────────────────────────────

#[test]
fn invalid_programs_are_saved_anyway() {
    let mut rig = Rig::idle();
    let mut broken = program("", &[(0, 5)]);
    broken.start_time = None;
    let set = only_a(broken);

    assert!(rig.send(AppCommand::SavePrograms(set.clone())));
    assert!(rig.sink.contains(&AppEvent::ProgramsSaved { valid: false }));
    assert_eq!(persist::load_from(&rig.nvs), set);
}

#[test]
fn failed_write_reports_false_but_keeps_programs() {
    let mut rig = Rig::idle();
    rig.nvs.fail_writes = Some(StorageError::Full);
    let set = only_a(program("06:00", &[(0, 5)]));

    assert!(!rig.send(AppCommand::SavePrograms(set.clone())));
    assert_eq!(rig.app.programs(), &set);
    assert!(!rig.nvs.exists(persist::PROGRAM_NAMESPACE, persist::PROGRAM_KEY));
}

#[test]
fn copy_program_persists_and_rejects_same_slot() {
    let mut rig = Rig::new(only_a(program("06:00", &[(0, 5), (1, 7)])));
    assert!(!rig.send(AppCommand::CopyProgram {
        target: ProgramSlot::A,
        source: ProgramSlot::A
    }));

    assert!(rig.send(AppCommand::CopyProgram {
        target: ProgramSlot::C,
        source: ProgramSlot::A
    }));
    let stored = persist::load_from(&rig.nvs);
    assert_eq!(stored.get(ProgramSlot::C), stored.get(ProgramSlot::A));
    assert_eq!(stored.get(ProgramSlot::C).duration(1), 7);
}

#[test]
fn clear_programs_resets_and_persists() {
    let mut rig = Rig::new(only_a(program("06:00", &[(0, 5)])));
    assert!(rig.send(AppCommand::ClearPrograms));
    assert_eq!(rig.app.programs(), &ProgramSet::default());
    assert_eq!(persist::load_from(&rig.nvs), ProgramSet::default());
}

// ── Settings and config ──────────────────────────────────────

#[test]
fn settings_update_is_auto_saved_after_delay() {
    let mut rig = Rig::idle();
    let settings = Settings {
        timezone: TimeZone::Pacific,
        dst: false,
        ..Settings::default()
    };
    assert!(rig.send(AppCommand::UpdateSettings(settings.clone())));
    assert!(rig.app.is_config_dirty());
    assert_eq!(rig.app.settings(), &settings);
    assert!(rig.sink.contains(&AppEvent::SettingsUpdated));

    for _ in 0..4 {
        rig.tick_after_secs(1);
        assert!(!rig.app.auto_save_if_needed(&rig.nvs));
    }
    rig.tick_after_secs(1);
    assert!(rig.app.auto_save_if_needed(&rig.nvs));
    assert!(!rig.app.is_config_dirty());
    assert_eq!(rig.nvs.config_saves(), 1);
}

#[test]
fn force_save_flushes_dirty_config() {
    let mut rig = Rig::idle();
    rig.send(AppCommand::UpdateSettings(Settings::default()));
    rig.app.force_save_if_dirty(&rig.nvs);
    assert!(!rig.app.is_config_dirty());
    assert_eq!(rig.nvs.saved_zone_count(), Some(MAX_ZONES as u8));

    rig.app.force_save_if_dirty(&rig.nvs);
    assert_eq!(rig.nvs.config_saves(), 1);
}

// ── Status ───────────────────────────────────────────────────

#[test]
fn status_snapshot_reflects_outputs_and_disabled_zones() {
    let mut rig = Rig::idle();
    rig.send(AppCommand::SetZoneDisabled {
        zone: 7,
        disabled: true,
    });
    rig.send(AppCommand::SetManualMode(true));
    rig.send(AppCommand::ToggleManualZone(2));

    rig.sink.clear();
    rig.app.emit_status(&mut rig.sink);
    let Some(AppEvent::Status(status)) = rig.sink.events.first() else {
        panic!("expected a status event, got {:?}", rig.sink.events);
    };
    assert_eq!(status.mode, Mode::Manual);
    assert_eq!(status.outputs, 0b0000_0100);
    assert_eq!(status.disabled, 0b1000_0000);
    assert!(!status.quick_run.is_active);
}

#[test]
fn tick_counter_advances() {
    let mut rig = Rig::idle();
    rig.tick();
    rig.tick();
    assert_eq!(rig.app.tick_count(), 2);
}
