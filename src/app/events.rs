//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (log to serial, feed a status page).

use crate::schedule::weekday::Weekday;
use crate::sequencer::SweepStatus;

/// Which run mode owns the outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Automatic,
    Manual,
    QuickRun,
    RunProgramNow,
}

/// Identifies one of the two sweep instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepId {
    QuickRun,
    RunProgramNow,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started; all zones are off.
    Started { zones: usize },

    /// A relay output changed.
    ZoneChanged { zone: usize, on: bool },

    SweepStarted { sweep: SweepId, zones: usize },

    SweepAdvanced { sweep: SweepId, zone: u8 },

    /// The sweep ran its last zone to completion.
    SweepFinished(SweepId),

    /// The sweep was cancelled before completing.
    SweepStopped(SweepId),

    ModeChanged { from: Mode, to: Mode },

    /// Programs were saved.  `valid` is `false` when an enabled program
    /// failed verification (it is saved anyway).
    ProgramsSaved { valid: bool },

    /// Today's windows were rebuilt.
    ScheduleRecomputed { day: Weekday, windows: usize },

    SettingsUpdated,

    /// Periodic status snapshot.
    Status(StatusData),
}

/// A point-in-time status snapshot suitable for logging or a web page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusData {
    pub mode: Mode,
    /// Bit `n` set = zone `n` energised.
    pub outputs: u8,
    /// Bit `n` set = zone `n` disabled.
    pub disabled: u8,
    pub quick_run: SweepStatus,
    pub run_program_now: SweepStatus,
    pub clock_synced: bool,
}
