//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the zone table, the three programs, manual-mode
//! state and both sweeps.  It decides which single mode owns each zone
//! and is the only code that writes to the [`RelayPort`].
//!
//! ```text
//!  ClockPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                │          AppService           │
//!  RelayPort ◀── │ schedule · manual · 2 sweeps  │ ◀── AppCommand
//!                └──────────────────────────────┘
//!                         │ StoragePort (programs JSON)
//! ```
//!
//! Output resolution, per zone, on every call that can change it:
//!
//! ```text
//!   disabled ─────────────▶ off
//!   a sweep is running ───▶ on iff zone == sweep.current_zone()
//!   manual mode ──────────▶ manual_on
//!   otherwise ────────────▶ schedule says active now (off if clock unsynced)
//! ```
//!
//! Starting either sweep stops the other first, so at most one relay is
//! ever energised by a sweep.  Offs are written before ons.

use log::{debug, info, warn};

use crate::config::ControllerConfig;
use crate::schedule::calculator::{self, CalculatedSchedule};
use crate::schedule::evaluator;
use crate::schedule::persist;
use crate::schedule::program::{PROGRAM_COUNT, ProgramSet, ProgramSlot};
use crate::schedule::weekday::Weekday;
use crate::sequencer::{self, Sweep, SweepKind, SweepStatus, SweepStep};
use crate::settings::Settings;
use crate::zone::{MAX_ZONES, Zone, ZoneTable};

use super::commands::AppCommand;
use super::events::{AppEvent, Mode, StatusData, SweepId};
use super::ports::{ClockPort, ConfigPort, EventSink, RelayPort, StoragePort, WallClock};

/// How long a settings change waits before it is flushed to storage.
const AUTO_SAVE_DELAY_MS: u64 = 5_000;

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: ControllerConfig,
    zones: ZoneTable,
    programs: ProgramSet,
    manual_mode: bool,
    quick_run: Sweep,
    run_now: Sweep,
    /// Uptime at the last tick; commands between ticks use it.
    now_ms: u64,
    /// Wall clock at the last tick (`None` until synchronised).
    wall: Option<WallClock>,
    /// Day the calculated windows belong to.
    schedule_day: Option<Weekday>,
    tick_count: u64,
    config_dirty: bool,
    dirty_since_tick: u64,
}

impl AppService {
    /// Construct the service from configuration and loaded programs.
    ///
    /// Does **not** touch any relay; call [`start`](Self::start) next.
    pub fn new(config: ControllerConfig, programs: ProgramSet) -> Self {
        let zones = ZoneTable::new(config.zone_count as usize);
        Self {
            config,
            zones,
            programs,
            manual_mode: false,
            quick_run: Sweep::new("Quick Run"),
            run_now: Sweep::new("Run Program Now"),
            now_ms: 0,
            wall: None,
            schedule_day: None,
            tick_count: 0,
            config_dirty: false,
            dirty_since_tick: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive every relay off and announce the service.
    pub fn start(&mut self, relays: &mut impl RelayPort, sink: &mut impl EventSink) {
        relays.all_off();
        for zone in self.zones.iter_mut() {
            zone.set_logical_state(false);
        }
        sink.emit(&AppEvent::Started {
            zones: self.zones.len(),
        });
        info!("AppService started with {} zones", self.zones.len());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: clock → day rollover → sweeps → outputs.
    pub fn tick(
        &mut self,
        clock: &impl ClockPort,
        relays: &mut impl RelayPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        let prev_mode = self.mode();

        self.now_ms = clock.uptime_ms();
        let wall = clock.local_time();
        if wall.is_some() != self.wall.is_some() {
            info!(
                "Clock {}",
                if wall.is_some() { "synchronised" } else { "lost sync" }
            );
        }
        self.wall = wall;

        if let Some(now) = wall {
            if self.schedule_day != Some(now.weekday) {
                self.recompute_schedule(now.weekday, sink);
            }
        }

        let now_ms = self.now_ms;
        let steps = [
            (SweepId::QuickRun, self.quick_run.tick(now_ms)),
            (SweepId::RunProgramNow, self.run_now.tick(now_ms)),
        ];
        for (sweep, step) in steps {
            match step {
                SweepStep::Unchanged => {}
                SweepStep::Advanced { zone } => sink.emit(&AppEvent::SweepAdvanced { sweep, zone }),
                SweepStep::Finished => sink.emit(&AppEvent::SweepFinished(sweep)),
            }
        }

        self.apply_outputs(relays, sink);
        self.emit_mode_change(prev_mode, sink);
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command.
    ///
    /// Returns `true` when the command was accepted (and, for sweeps,
    /// actually started).  Outputs are re-resolved before returning.
    /// Sweeps started here are timed from `clock`, not the last tick.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        clock: &impl ClockPort,
        relays: &mut impl RelayPort,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) -> bool {
        self.now_ms = clock.uptime_ms();
        let prev_mode = self.mode();
        let accepted = match cmd {
            AppCommand::SetZoneDisabled { zone, disabled } => self.set_zone_disabled(zone, disabled),
            AppCommand::SavePrograms(programs) => self.save_programs(programs, store, sink),
            AppCommand::StartQuickRun { seconds } => {
                let seconds = seconds.unwrap_or(self.config.default_quick_run_secs);
                self.start_quick_run(seconds, sink)
            }
            AppCommand::StartRunProgramNow(slot) => self.start_run_program_now(slot, sink),
            AppCommand::StopQuickRun => {
                Self::stop_sweep(&mut self.quick_run, SweepId::QuickRun, sink);
                true
            }
            AppCommand::StopRunProgramNow => {
                Self::stop_sweep(&mut self.run_now, SweepId::RunProgramNow, sink);
                true
            }
            AppCommand::CopyProgram { target, source } => {
                self.copy_program(target, source, store, sink)
            }
            AppCommand::SetManualMode(on) => {
                self.set_manual_mode(on, sink);
                true
            }
            AppCommand::ToggleManualZone(zone) => self.toggle_manual_zone(zone),
            AppCommand::ClearPrograms => {
                info!("Programs: clearing all");
                self.save_programs(ProgramSet::default(), store, sink)
            }
            AppCommand::UpdateSettings(settings) => {
                self.update_settings(settings, sink);
                true
            }
        };
        self.apply_outputs(relays, sink);
        self.emit_mode_change(prev_mode, sink);
        accepted
    }

    fn set_zone_disabled(&mut self, zone: usize, disabled: bool) -> bool {
        let Some(z) = self.zones.get_mut(zone) else {
            warn!("Zone {} out of range", zone);
            return false;
        };
        z.disabled = disabled;
        if disabled {
            z.manual_on = false;
        }
        info!("Zone {} {}", zone, if disabled { "disabled" } else { "enabled" });
        true
    }

    fn save_programs(
        &mut self,
        programs: ProgramSet,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) -> bool {
        let valid = match programs.verify() {
            Ok(()) => true,
            Err(issue) => {
                warn!("Programs: saving despite invalid entry ({})", issue);
                false
            }
        };
        self.programs = programs;
        self.refresh_schedule(sink);
        sink.emit(&AppEvent::ProgramsSaved { valid });
        self.persist_programs(store)
    }

    fn copy_program(
        &mut self,
        target: ProgramSlot,
        source: ProgramSlot,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) -> bool {
        if !self.programs.copy(target, source) {
            warn!("Programs: cannot copy {} onto itself", source);
            return false;
        }
        info!("Programs: copied {} to {}", source, target);
        self.refresh_schedule(sink);
        sink.emit(&AppEvent::ProgramsSaved {
            valid: self.programs.verify().is_ok(),
        });
        self.persist_programs(store)
    }

    fn start_quick_run(&mut self, seconds: u32, sink: &mut impl EventSink) -> bool {
        if seconds == 0 {
            warn!("Quick Run: duration must be at least 1 second");
            return false;
        }
        Self::stop_sweep(&mut self.run_now, SweepId::RunProgramNow, sink);
        Self::stop_sweep(&mut self.quick_run, SweepId::QuickRun, sink);
        let plan = sequencer::quick_run_plan(&self.zones, seconds);
        let zones = plan.len();
        let kind = SweepKind::QuickRun {
            seconds_per_zone: seconds,
        };
        if !self.quick_run.start(kind, plan, self.now_ms) {
            return false;
        }
        sink.emit(&AppEvent::SweepStarted {
            sweep: SweepId::QuickRun,
            zones,
        });
        true
    }

    fn start_run_program_now(&mut self, slot: ProgramSlot, sink: &mut impl EventSink) -> bool {
        Self::stop_sweep(&mut self.quick_run, SweepId::QuickRun, sink);
        Self::stop_sweep(&mut self.run_now, SweepId::RunProgramNow, sink);
        let plan = sequencer::program_plan(&self.zones, self.programs.get(slot));
        let zones = plan.len();
        let kind = SweepKind::RunProgramNow { program: slot };
        if !self.run_now.start(kind, plan, self.now_ms) {
            return false;
        }
        info!("Run Program Now: {}", slot);
        sink.emit(&AppEvent::SweepStarted {
            sweep: SweepId::RunProgramNow,
            zones,
        });
        true
    }

    fn stop_sweep(sweep: &mut Sweep, id: SweepId, sink: &mut impl EventSink) {
        if sweep.is_active() {
            sweep.stop();
            sink.emit(&AppEvent::SweepStopped(id));
        }
    }

    fn set_manual_mode(&mut self, on: bool, sink: &mut impl EventSink) {
        if on {
            Self::stop_sweep(&mut self.quick_run, SweepId::QuickRun, sink);
            Self::stop_sweep(&mut self.run_now, SweepId::RunProgramNow, sink);
        }
        for zone in self.zones.iter_mut() {
            zone.manual_on = false;
        }
        if self.manual_mode != on {
            info!("Manual mode {}", if on { "on" } else { "off" });
        }
        self.manual_mode = on;
    }

    fn toggle_manual_zone(&mut self, zone: usize) -> bool {
        if !self.manual_mode {
            warn!("Zone {}: manual toggle ignored outside manual mode", zone);
            return false;
        }
        let Some(z) = self.zones.get_mut(zone) else {
            warn!("Zone {} out of range", zone);
            return false;
        };
        z.manual_on = !z.manual_on;
        debug!("Zone {} manual request {}", zone, z.manual_on);
        true
    }

    fn update_settings(&mut self, settings: Settings, sink: &mut impl EventSink) {
        info!(
            "Settings updated: {} (DST {})",
            settings.timezone,
            if settings.dst { "on" } else { "off" }
        );
        self.config.settings = settings;
        self.mark_config_dirty();
        sink.emit(&AppEvent::SettingsUpdated);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Whether `zone`'s automatic schedule says it should be on at the
    /// given local time.
    pub fn is_active(&self, zone: usize, day: Weekday, hour: u8, minute: u8) -> bool {
        evaluator::is_active(&self.zones, zone, day, hour, minute)
    }

    pub fn quick_run_status(&self) -> SweepStatus {
        self.quick_run.status()
    }

    pub fn run_program_now_status(&self) -> SweepStatus {
        self.run_now.status()
    }

    /// Last commanded output of `zone`.
    pub fn zone_state(&self, zone: usize) -> Option<bool> {
        self.zones.get(zone).map(Zone::is_on)
    }

    pub fn zone(&self, zone: usize) -> Option<&Zone> {
        self.zones.get(zone)
    }

    pub fn zones(&self) -> &ZoneTable {
        &self.zones
    }

    pub fn programs(&self) -> &ProgramSet {
        &self.programs
    }

    /// Today's windows for `zone`, one per program.
    pub fn calculated(&self, zone: usize) -> Option<&[CalculatedSchedule; PROGRAM_COUNT]> {
        self.zones.get(zone).map(|z| &z.calculated)
    }

    /// Mode currently owning the outputs.
    pub fn mode(&self) -> Mode {
        if self.quick_run.is_active() {
            Mode::QuickRun
        } else if self.run_now.is_active() {
            Mode::RunProgramNow
        } else if self.manual_mode {
            Mode::Manual
        } else {
            Mode::Automatic
        }
    }

    pub fn is_manual_mode(&self) -> bool {
        self.manual_mode
    }

    pub fn settings(&self) -> &Settings {
        &self.config.settings
    }

    /// Clone of the live configuration.
    pub fn current_config(&self) -> ControllerConfig {
        self.config.clone()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Build a status snapshot from the current state.
    pub fn build_status(&self) -> StatusData {
        let mut outputs = 0u8;
        let mut disabled = 0u8;
        for zone in self.zones.iter() {
            let bit = 1u8 << zone.index();
            if zone.is_on() {
                outputs |= bit;
            }
            if zone.disabled {
                disabled |= bit;
            }
        }
        StatusData {
            mode: self.mode(),
            outputs,
            disabled,
            quick_run: self.quick_run.status(),
            run_program_now: self.run_now.status(),
            clock_synced: self.wall.is_some(),
        }
    }

    pub fn emit_status(&self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Status(self.build_status()));
    }

    // ── Output resolution ─────────────────────────────────────

    /// Output `zone` should have under the winning mode.
    fn desired_output(&self, zone: &Zone) -> bool {
        if zone.disabled {
            return false;
        }
        if self.quick_run.is_active() || self.run_now.is_active() {
            let sweep_zone = self
                .quick_run
                .current_zone()
                .or_else(|| self.run_now.current_zone());
            return sweep_zone.is_some_and(|z| z as usize == zone.index());
        }
        if self.manual_mode {
            return zone.manual_on;
        }
        self.wall.is_some_and(|now| {
            evaluator::is_active(&self.zones, zone.index(), now.weekday, now.hour, now.minute)
        })
    }

    /// Resolve every zone and write the changes to the relay port.
    ///
    /// Only this method calls [`RelayPort::set_zone_output`].
    pub fn apply_outputs(&mut self, relays: &mut impl RelayPort, sink: &mut impl EventSink) {
        let mut desired = [false; MAX_ZONES];
        for zone in self.zones.iter() {
            desired[zone.index()] = self.desired_output(zone);
        }

        // Offs first so two valves are never open together mid-switch.
        for pass_on in [false, true] {
            for zone in self.zones.iter_mut() {
                let want = desired[zone.index()];
                if want != pass_on || zone.is_on() == want {
                    continue;
                }
                relays.set_zone_output(zone.index(), want);
                zone.set_logical_state(want);
                sink.emit(&AppEvent::ZoneChanged {
                    zone: zone.index(),
                    on: want,
                });
            }
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn recompute_schedule(&mut self, day: Weekday, sink: &mut impl EventSink) {
        let windows = calculator::recompute(&mut self.zones, &self.programs, day);
        self.schedule_day = Some(day);
        info!("Schedule: {} windows for {}", windows, day);
        sink.emit(&AppEvent::ScheduleRecomputed { day, windows });
    }

    /// Recompute for the current day after a program change.  Deferred
    /// to the first synchronised tick when the day is not yet known.
    fn refresh_schedule(&mut self, sink: &mut impl EventSink) {
        match self.schedule_day {
            Some(day) => self.recompute_schedule(day, sink),
            None => debug!("Schedule: day unknown, recompute deferred"),
        }
    }

    fn persist_programs(&self, store: &mut impl StoragePort) -> bool {
        match persist::save_to(store, &self.programs) {
            Ok(()) => true,
            Err(e) => {
                warn!("Programs: persist failed: {}", e);
                false
            }
        }
    }

    fn emit_mode_change(&self, from: Mode, sink: &mut impl EventSink) {
        let to = self.mode();
        if from != to {
            info!("Mode: {:?} -> {:?}", from, to);
            sink.emit(&AppEvent::ModeChanged { from, to });
        }
    }

    // ── Config dirty-flag management ──────────────────────────

    /// Mark the config as modified.
    pub fn mark_config_dirty(&mut self) {
        if !self.config_dirty {
            self.config_dirty = true;
            self.dirty_since_tick = self.tick_count;
        }
    }

    /// Persist the config once it has been dirty for 5 seconds.
    /// Returns `true` if the config was saved.
    pub fn auto_save_if_needed(&mut self, storage: &impl ConfigPort) -> bool {
        if !self.config_dirty {
            return false;
        }
        let ticks_since_dirty = self.tick_count.saturating_sub(self.dirty_since_tick);
        let ms_since_dirty =
            ticks_since_dirty.saturating_mul(u64::from(self.config.control_loop_interval_ms));
        if ms_since_dirty < AUTO_SAVE_DELAY_MS {
            return false;
        }
        match storage.save(&self.config) {
            Ok(()) => {
                self.config_dirty = false;
                info!("Config auto-saved to NVS");
                true
            }
            Err(e) => {
                warn!("Config auto-save failed: {}", e);
                false
            }
        }
    }

    /// Force-save if dirty (call before restart).
    pub fn force_save_if_dirty(&mut self, storage: &impl ConfigPort) {
        if !self.config_dirty {
            return;
        }
        match storage.save(&self.config) {
            Ok(()) => {
                self.config_dirty = false;
                info!("Config force-saved before shutdown");
            }
            Err(e) => {
                warn!("Config force-save failed: {}", e);
            }
        }
    }

    /// Whether the config has unsaved changes.
    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }
}
