//! Zone table: one entry per relay-driven irrigation valve.
//!
//! The table is a fixed-capacity container sized by [`MAX_ZONES`].  Every
//! accessor takes a plain `usize` index and returns `None` (or does
//! nothing) when the index is out of range, so callers at the command
//! boundary never have to pre-validate.
//!
//! Output state (`logical_state`) is written only by
//! [`AppService`](crate::app::service::AppService) when it resolves the
//! winning mode for a tick.

use heapless::Vec;
use log::warn;

use crate::schedule::calculator::CalculatedSchedule;
use crate::schedule::program::PROGRAM_COUNT;

/// Maximum number of zones the relay bank can drive.
pub const MAX_ZONES: usize = 8;

/// A single irrigation zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    index: u8,
    /// User toggle: a disabled zone is never energised.
    pub disabled: bool,
    /// Manual-mode request (only honoured while manual mode is active).
    pub manual_on: bool,
    /// Last output commanded to the relay port.
    logical_state: bool,
    /// Today's windows, one slot per program.
    pub calculated: [CalculatedSchedule; PROGRAM_COUNT],
}

impl Zone {
    fn new(index: u8) -> Self {
        Self {
            index,
            disabled: false,
            manual_on: false,
            logical_state: false,
            calculated: CalculatedSchedule::cleared_slots(),
        }
    }

    /// 0-based zone index.
    pub fn index(&self) -> usize {
        self.index as usize
    }

    /// Last commanded output.
    pub fn is_on(&self) -> bool {
        self.logical_state
    }

    pub(crate) fn set_logical_state(&mut self, on: bool) {
        self.logical_state = on;
    }
}

/// Bounds-checked table of zones.
#[derive(Debug, Clone)]
pub struct ZoneTable {
    zones: Vec<Zone, MAX_ZONES>,
}

impl ZoneTable {
    /// Build a table with `count` zones, clamped to [`MAX_ZONES`].
    pub fn new(count: usize) -> Self {
        if count > MAX_ZONES {
            warn!("ZoneTable: {} zones requested, clamping to {}", count, MAX_ZONES);
        }
        let mut zones = Vec::new();
        for i in 0..count.min(MAX_ZONES) {
            // Capacity is MAX_ZONES and the loop is bounded by it.
            let _ = zones.push(Zone::new(i as u8));
        }
        Self { zones }
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Zone> {
        self.zones.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Zone> {
        self.zones.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Zone> {
        self.zones.iter_mut()
    }

    /// Indices of zones that are not disabled, in ascending order.
    pub fn enabled_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.zones.iter().filter(|z| !z.disabled).map(Zone::index)
    }

    /// Number of zones whose last commanded output is on.
    pub fn energised_count(&self) -> usize {
        self.zones.iter().filter(|z| z.is_on()).count()
    }
}
