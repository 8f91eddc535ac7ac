//! Minute-resolution time of day.
//!
//! The wire/storage representation is a zero-padded 24-hour `HH:MM`
//! string.  Anything else (wrong length, missing `:`, non-digits, hour
//! ≥ 24, minute ≥ 60) parses to `None`, which the rest of the schedule
//! code treats as "no time set".

use core::fmt;

/// Minutes in one day.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A wall-clock time of day with minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub const MIDNIGHT: Self = Self { hour: 0, minute: 0 };

    /// Construct from components; `None` if either is out of range.
    pub const fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    /// Construct from minutes since midnight, wrapping past 24:00.
    pub const fn from_total_minutes(total: u32) -> Self {
        let wrapped = total % MINUTES_PER_DAY as u32;
        Self {
            hour: (wrapped / 60) as u8,
            minute: (wrapped % 60) as u8,
        }
    }

    /// Parse a strict `HH:MM` string.
    pub fn parse(s: &str) -> Option<Self> {
        let b = s.as_bytes();
        if b.len() != 5 || b[2] != b':' {
            return None;
        }
        let two = |hi: u8, lo: u8| -> Option<u8> {
            if hi.is_ascii_digit() && lo.is_ascii_digit() {
                Some((hi - b'0') * 10 + (lo - b'0'))
            } else {
                None
            }
        };
        Self::new(two(b[0], b[1])?, two(b[3], b[4])?)
    }

    pub const fn hour(self) -> u8 {
        self.hour
    }

    pub const fn minute(self) -> u8 {
        self.minute
    }

    /// Minutes since midnight (0..1440).
    pub const fn total_minutes(self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }

    /// Add `minutes`, carrying into hours and wrapping silently at midnight.
    /// No day boundary is tracked.
    pub const fn add_minutes(self, minutes: u16) -> Self {
        Self::from_total_minutes(self.total_minutes() as u32 + minutes as u32)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}
