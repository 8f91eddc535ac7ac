//! Weekly watering programs.
//!
//! Three fixed program slots (A, B, C).  Each program is a template: a
//! start time, a day-of-week mask, and a per-zone run duration in
//! minutes.  Programs are replaced wholesale on save; nothing mutates a
//! single field mid-calculation.

use core::fmt;

use super::time::TimeOfDay;
use super::weekday::{DAYS_PER_WEEK, Weekday};
use crate::zone::MAX_ZONES;

/// Number of program slots.
pub const PROGRAM_COUNT: usize = 3;

// ───────────────────────────────────────────────────────────────
// Program slot
// ───────────────────────────────────────────────────────────────

/// Identifies one of the three program slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ProgramSlot {
    #[default]
    A = 0,
    B = 1,
    C = 2,
}

impl ProgramSlot {
    pub const ALL: [ProgramSlot; PROGRAM_COUNT] = [Self::A, Self::B, Self::C];

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn letter(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
        }
    }
}

impl fmt::Display for ProgramSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Program {}", self.letter())
    }
}

// ───────────────────────────────────────────────────────────────
// Day mask
// ───────────────────────────────────────────────────────────────

/// 7-bit day-of-week mask, bit 0 = Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct DayMask(u8);

impl DayMask {
    pub const NONE: Self = Self(0);
    pub const EVERY_DAY: Self = Self(0b0111_1111);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::EVERY_DAY.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn from_bools(days: &[bool]) -> Self {
        let mut mask = Self::NONE;
        for (day, &set) in Weekday::ALL.iter().zip(days) {
            mask.set(*day, set);
        }
        mask
    }

    pub fn to_bools(self) -> [bool; DAYS_PER_WEEK] {
        Weekday::ALL.map(|d| self.contains(d))
    }

    pub const fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day as u8) != 0
    }

    pub fn set(&mut self, day: Weekday, on: bool) {
        if on {
            self.0 |= 1 << day as u8;
        } else {
            self.0 &= !(1 << day as u8);
        }
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

// ───────────────────────────────────────────────────────────────
// Program
// ───────────────────────────────────────────────────────────────

/// One weekly watering template.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    /// First zone's start time; `None` means "not set".
    pub start_time: Option<TimeOfDay>,
    pub enabled: bool,
    pub days: DayMask,
    /// Run time per zone in minutes (0 = zone unused).
    pub durations: [u16; MAX_ZONES],
}

impl Program {
    /// Duration for `zone` in minutes; 0 for an out-of-range index.
    pub fn duration(&self, zone: usize) -> u16 {
        self.durations.get(zone).copied().unwrap_or(0)
    }

    /// Whether this program contributes windows on `day`.
    pub fn runs_on(&self, day: Weekday) -> bool {
        self.enabled && self.days.contains(day) && self.start_time.is_some()
    }

    /// Sum of all zone durations in minutes.
    pub fn total_minutes(&self) -> u32 {
        self.durations.iter().map(|&d| d as u32).sum()
    }

    pub fn has_any_duration(&self) -> bool {
        self.durations.iter().any(|&d| d > 0)
    }
}

// ───────────────────────────────────────────────────────────────
// Program set
// ───────────────────────────────────────────────────────────────

/// Reasons [`ProgramSet::verify`] rejects an enabled program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramIssue {
    MissingStartTime(ProgramSlot),
    NoDaysSelected(ProgramSlot),
    NoZoneDurations(ProgramSlot),
}

impl fmt::Display for ProgramIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingStartTime(s) => write!(f, "{s}: start time missing or not HH:MM"),
            Self::NoDaysSelected(s) => write!(f, "{s}: no days selected"),
            Self::NoZoneDurations(s) => write!(f, "{s}: every zone duration is 0"),
        }
    }
}

/// The three program slots, saved and loaded as one document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgramSet {
    programs: [Program; PROGRAM_COUNT],
}

impl ProgramSet {
    pub fn new(programs: [Program; PROGRAM_COUNT]) -> Self {
        Self { programs }
    }

    pub fn get(&self, slot: ProgramSlot) -> &Program {
        &self.programs[slot.index()]
    }

    pub fn get_mut(&mut self, slot: ProgramSlot) -> &mut Program {
        &mut self.programs[slot.index()]
    }

    /// Programs paired with their slot, in A, B, C order.
    pub fn iter(&self) -> impl Iterator<Item = (ProgramSlot, &Program)> {
        ProgramSlot::ALL.into_iter().zip(self.programs.iter())
    }

    /// Overwrite `target` with a copy of `source`.
    /// Returns `false` (and changes nothing) when they are the same slot.
    pub fn copy(&mut self, target: ProgramSlot, source: ProgramSlot) -> bool {
        if target == source {
            return false;
        }
        self.programs[target.index()] = self.programs[source.index()].clone();
        true
    }

    /// Check every enabled program is runnable.  Disabled programs are
    /// not inspected.
    pub fn verify(&self) -> Result<(), ProgramIssue> {
        for (slot, p) in self.iter().filter(|(_, p)| p.enabled) {
            if p.start_time.is_none() {
                return Err(ProgramIssue::MissingStartTime(slot));
            }
            if p.days.is_empty() {
                return Err(ProgramIssue::NoDaysSelected(slot));
            }
            if !p.has_any_duration() {
                return Err(ProgramIssue::NoZoneDurations(slot));
            }
        }
        Ok(())
    }
}
