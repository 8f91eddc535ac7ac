//! Schedule calculator: programs → today's per-zone windows.
//!
//! ```text
//!  Program A  06:00  [z0=10, z1=0, z2=5]
//!                │
//!                ▼  cursor walks zones in index order
//!  zone 0  slot A  06:00 ─ 06:10
//!  zone 1  slot A  (skipped, duration 0, cursor unchanged)
//!  zone 2  slot A  06:10 ─ 06:15
//! ```
//!
//! Every program has its own cursor starting at its own start time.
//! Programs never offset one another; overlapping windows across
//! programs are a configuration problem the engine does not correct.
//!
//! The calculation is always done in full: every slot on every zone is
//! cleared first, then repopulated.  A zone whose duration dropped to 0,
//! or a program that was disabled, therefore never leaves a stale window.

use log::debug;

use super::program::{PROGRAM_COUNT, ProgramSet, ProgramSlot};
use super::time::TimeOfDay;
use super::weekday::Weekday;
use crate::zone::ZoneTable;

/// One zone's window for one program, for today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalculatedSchedule {
    pub start: Option<TimeOfDay>,
    pub end: Option<TimeOfDay>,
    /// Program that produced this window.
    pub program: ProgramSlot,
}

impl CalculatedSchedule {
    /// An empty slot ("no schedule").
    pub const EMPTY: Self = Self {
        start: None,
        end: None,
        program: ProgramSlot::A,
    };

    /// One empty slot per program, each tagged with its own slot.
    pub fn cleared_slots() -> [Self; PROGRAM_COUNT] {
        ProgramSlot::ALL.map(|program| Self {
            program,
            ..Self::EMPTY
        })
    }

    /// `Some((start, end))` only when both ends are set.
    pub fn window(&self) -> Option<(TimeOfDay, TimeOfDay)> {
        Some((self.start?, self.end?))
    }
}

/// Rebuild every zone's windows for `day`.
///
/// Returns the number of windows assigned.
pub fn recompute(zones: &mut ZoneTable, programs: &ProgramSet, day: Weekday) -> usize {
    for zone in zones.iter_mut() {
        zone.calculated = CalculatedSchedule::cleared_slots();
    }

    let mut assigned = 0;
    for (slot, program) in programs.iter() {
        if !program.runs_on(day) {
            continue;
        }
        let Some(mut cursor) = program.start_time else {
            continue;
        };

        for zone in zones.iter_mut() {
            let minutes = program.duration(zone.index());
            if minutes == 0 {
                continue;
            }
            let end = cursor.add_minutes(minutes);
            zone.calculated[slot.index()] = CalculatedSchedule {
                start: Some(cursor),
                end: Some(end),
                program: slot,
            };
            debug!(
                "Schedule: zone {} {} {}-{}",
                zone.index(),
                slot,
                cursor,
                end
            );
            cursor = end;
            assigned += 1;
        }
    }
    assigned
}
