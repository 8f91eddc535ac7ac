//! Sweep sequencer: runs a list of zones one after another.
//!
//! Two independent instances exist at runtime, one for *Quick Run* (every
//! enabled zone for a fixed number of seconds) and one for *Run Program
//! Now* (one program's durations, immediately).  Both are plain state
//! machines polled from the control tick; nothing here blocks or touches
//! a relay.  Which zone to energise is exposed through
//! [`Sweep::current_zone`] and written by the
//! [`AppService`](crate::app::service::AppService).
//!
//! ```text
//!            start(pending ≠ ∅)
//!   ┌──────┐ ───────────────────▶ ┌─────────┐ ──┐ tick: elapsed ≥ duration
//!   │ Idle │                      │ Running │   │ → cursor + 1
//!   └──────┘ ◀─────────────────── └─────────┘ ◀─┘
//!        stop() / last zone done / cursor out of range
//! ```
//!
//! The pending list is a snapshot taken at start: disabling a zone or
//! editing a program mid-sweep does not reshape it.

use heapless::Vec;
use log::{info, warn};
use serde::Serialize;

use crate::schedule::program::{Program, ProgramSlot};
use crate::zone::{MAX_ZONES, ZoneTable};

/// What kind of sweep is running, plus its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepKind {
    QuickRun { seconds_per_zone: u32 },
    RunProgramNow { program: ProgramSlot },
}

/// One entry of a sweep's pending list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingZone {
    pub zone: u8,
    pub duration_ms: u32,
}

/// Snapshot of the zones a sweep will visit, in order.
pub type PendingList = Vec<PendingZone, MAX_ZONES>;

/// Outcome of one [`Sweep::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepStep {
    /// Idle, or the current zone still has time left.
    Unchanged,
    /// Moved on to `zone`.
    Advanced { zone: u8 },
    /// The last zone finished (or the cursor was invalid); now Idle.
    Finished,
}

/// Poll-friendly status for UI polling.
///
/// Serialises with the keys the web UI expects:
/// `{"isActive":true,"currentZone":2,"zoneIndex":1,"numZones":3,"duration":5}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepStatus {
    pub is_active: bool,
    /// `null` when idle.
    pub current_zone: Option<u8>,
    /// Position within the pending list.
    pub zone_index: usize,
    /// Length of the pending list.
    pub num_zones: usize,
    /// Seconds the current zone runs for.
    pub duration: u32,
}

/// A single sweep state machine.
#[derive(Debug, Clone)]
pub struct Sweep {
    label: &'static str,
    kind: Option<SweepKind>,
    pending: PendingList,
    cursor: usize,
    zone_started_ms: u64,
}

impl Sweep {
    /// Create an idle sweep.  `label` only appears in log lines.
    pub const fn new(label: &'static str) -> Self {
        Self {
            label,
            kind: None,
            pending: Vec::new(),
            cursor: 0,
            zone_started_ms: 0,
        }
    }

    /// Begin sweeping `pending` at `now_ms`.
    ///
    /// A running sweep is stopped first.  An empty list leaves the sweep
    /// idle and returns `false`.
    pub fn start(&mut self, kind: SweepKind, pending: PendingList, now_ms: u64) -> bool {
        if self.is_active() {
            self.stop();
        }
        let Some(first) = pending.first().copied() else {
            warn!("{}: nothing to run", self.label);
            return false;
        };
        info!(
            "{}: started over {} zone(s), first zone {}",
            self.label,
            pending.len(),
            first.zone
        );
        self.kind = Some(kind);
        self.pending = pending;
        self.cursor = 0;
        self.zone_started_ms = now_ms;
        true
    }

    /// Advance at most one zone.  No-op while idle.
    pub fn tick(&mut self, now_ms: u64) -> SweepStep {
        if !self.is_active() {
            return SweepStep::Unchanged;
        }
        let Some(current) = self.pending.get(self.cursor).copied() else {
            warn!("{}: cursor {} out of range, stopping", self.label, self.cursor);
            self.reset();
            return SweepStep::Finished;
        };

        let elapsed = now_ms.saturating_sub(self.zone_started_ms);
        if elapsed < u64::from(current.duration_ms) {
            return SweepStep::Unchanged;
        }

        self.cursor += 1;
        match self.pending.get(self.cursor) {
            Some(next) => {
                self.zone_started_ms = now_ms;
                info!(
                    "{}: zone {} done, zone {} ({}/{})",
                    self.label,
                    current.zone,
                    next.zone,
                    self.cursor + 1,
                    self.pending.len()
                );
                SweepStep::Advanced { zone: next.zone }
            }
            None => {
                info!("{}: complete", self.label);
                self.reset();
                SweepStep::Finished
            }
        }
    }

    /// Return to idle.  Always legal.  Returns the zone that was current.
    pub fn stop(&mut self) -> Option<u8> {
        let was = self.current_zone();
        if self.is_active() {
            info!("{}: stopped", self.label);
        }
        self.reset();
        was
    }

    pub fn is_active(&self) -> bool {
        self.kind.is_some()
    }

    pub fn kind(&self) -> Option<SweepKind> {
        self.kind
    }

    /// Zone that should currently be energised, if any.
    pub fn current_zone(&self) -> Option<u8> {
        self.kind?;
        self.pending.get(self.cursor).map(|p| p.zone)
    }

    pub fn status(&self) -> SweepStatus {
        let current = self.kind.and(self.pending.get(self.cursor));
        SweepStatus {
            is_active: self.is_active(),
            current_zone: current.map(|p| p.zone),
            zone_index: self.cursor,
            num_zones: self.pending.len(),
            duration: match self.kind {
                Some(SweepKind::QuickRun { seconds_per_zone }) => seconds_per_zone,
                _ => current.map_or(0, |p| p.duration_ms / 1000),
            },
        }
    }

    fn reset(&mut self) {
        self.kind = None;
        self.pending.clear();
        self.cursor = 0;
        self.zone_started_ms = 0;
    }
}

// ───────────────────────────────────────────────────────────────
// Pending-list builders
// ───────────────────────────────────────────────────────────────

/// Every enabled zone, `seconds` each.
pub fn quick_run_plan(zones: &ZoneTable, seconds: u32) -> PendingList {
    let duration_ms = seconds.saturating_mul(1000);
    zones
        .enabled_indices()
        .map(|zone| PendingZone {
            zone: zone as u8,
            duration_ms,
        })
        .collect()
}

/// Every enabled zone with a nonzero duration in `program`.
pub fn program_plan(zones: &ZoneTable, program: &Program) -> PendingList {
    zones
        .enabled_indices()
        .filter_map(|zone| {
            let minutes = program.duration(zone);
            (minutes > 0).then(|| PendingZone {
                zone: zone as u8,
                duration_ms: u32::from(minutes) * 60_000,
            })
        })
        .collect()
}
