//! Day-of-week with Monday as index 0.

use core::fmt;

/// Number of days in a program's day mask.
pub const DAYS_PER_WEEK: usize = 7;

/// Day of the week, Monday = 0 … Sunday = 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Weekday {
    Monday = 0,
    Tuesday = 1,
    Wednesday = 2,
    Thursday = 3,
    Friday = 4,
    Saturday = 5,
    Sunday = 6,
}

impl Weekday {
    pub const ALL: [Weekday; DAYS_PER_WEEK] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Convert a C `tm_wday` value (0 = Sunday) to Monday-based.
    pub fn from_tm_wday(wday: i32) -> Option<Self> {
        match wday {
            0 => Some(Self::Sunday),
            1..=6 => Self::from_index(wday as usize - 1),
            _ => None,
        }
    }

    /// Day of the week for a Unix timestamp (UTC).
    pub fn from_epoch_secs(secs: u64) -> Self {
        // 1970-01-01 was a Thursday.
        let days = secs / 86_400;
        Self::ALL[((days + 3) % 7) as usize]
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }

    /// Case-insensitive lookup by full English name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % DAYS_PER_WEEK]
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
