//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (web UI,
//! serial console) that the [`AppService`](super::service::AppService)
//! interprets and acts upon.  Zone and program indices are validated by
//! the service; an out-of-range value is simply rejected.

use crate::schedule::program::{ProgramSet, ProgramSlot};
use crate::settings::Settings;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Enable or disable a zone.  Enabling re-evaluates its schedule.
    SetZoneDisabled { zone: usize, disabled: bool },

    /// Replace all three programs, persist them and recompute today.
    SavePrograms(ProgramSet),

    /// Sweep every enabled zone for `seconds` each.  `None` uses the
    /// configured default.
    StartQuickRun { seconds: Option<u32> },

    /// Sweep one program's zones immediately.
    StartRunProgramNow(ProgramSlot),

    StopQuickRun,

    StopRunProgramNow,

    /// Overwrite `target` with `source` and persist.
    CopyProgram { target: ProgramSlot, source: ProgramSlot },

    /// Enter (`true`) or leave (`false`) manual mode.
    SetManualMode(bool),

    /// Flip one zone's manual request.  Only accepted in manual mode.
    ToggleManualZone(usize),

    /// Reset every program to disabled/empty and persist.
    ClearPrograms,

    /// Hot-reload device settings (time zone, DST, Wi-Fi).
    UpdateSettings(Settings),
}
