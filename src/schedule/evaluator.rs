//! Active-window evaluator.
//!
//! Answers "should this zone be on right now according to the automatic
//! schedule?".  Windows whose end is earlier than their start cross
//! midnight and are active on both sides of it; a window whose start
//! equals its end is empty.

use super::time::TimeOfDay;
use super::weekday::Weekday;
use crate::zone::ZoneTable;

/// Whether `current` falls inside the half-open window `[start, end)`.
pub fn window_contains(start: TimeOfDay, end: TimeOfDay, current: TimeOfDay) -> bool {
    let (s, e, c) = (start.total_minutes(), end.total_minutes(), current.total_minutes());
    if s < e {
        s <= c && c < e
    } else if s > e {
        c >= s || c < e
    } else {
        false
    }
}

/// Whether `zone`'s automatic schedule says it should be on.
///
/// Returns `false` for an out-of-range or disabled zone, or an
/// out-of-range `hour`/`minute`.  `_day` is accepted for callers that
/// track it; the calculated windows already belong to today.
pub fn is_active(zones: &ZoneTable, zone: usize, _day: Weekday, hour: u8, minute: u8) -> bool {
    let Some(z) = zones.get(zone) else {
        return false;
    };
    if z.disabled {
        return false;
    }
    let Some(now) = TimeOfDay::new(hour, minute) else {
        return false;
    };
    z.calculated
        .iter()
        .filter_map(|slot| slot.window())
        .any(|(start, end)| window_contains(start, end, now))
}
