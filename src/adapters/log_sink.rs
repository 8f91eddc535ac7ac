//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART in production).  A web status
//! adapter would implement the same trait.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Status(s) => {
                info!(
                    "STATUS | mode={:?} | on=0b{:08b} disabled=0b{:08b} | \
                     quick={}/{} run_now={}/{} | clock={}",
                    s.mode,
                    s.outputs,
                    s.disabled,
                    s.quick_run.zone_index,
                    s.quick_run.num_zones,
                    s.run_program_now.zone_index,
                    s.run_program_now.num_zones,
                    if s.clock_synced { "synced" } else { "unsynced" },
                );
            }
            AppEvent::ZoneChanged { zone, on } => {
                info!("ZONE | {} {}", zone, if *on { "ON" } else { "OFF" });
            }
            AppEvent::SweepStarted { sweep, zones } => {
                info!("SWEEP | {:?} started over {} zones", sweep, zones);
            }
            AppEvent::SweepAdvanced { sweep, zone } => {
                info!("SWEEP | {:?} -> zone {}", sweep, zone);
            }
            AppEvent::SweepFinished(sweep) => {
                info!("SWEEP | {:?} finished", sweep);
            }
            AppEvent::SweepStopped(sweep) => {
                info!("SWEEP | {:?} stopped", sweep);
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE | {:?} -> {:?}", from, to);
            }
            AppEvent::ProgramsSaved { valid } => {
                info!("PROG | saved{}", if *valid { "" } else { " (with invalid entries)" });
            }
            AppEvent::ScheduleRecomputed { day, windows } => {
                info!("SCHED | {} windows for {}", windows, day);
            }
            AppEvent::SettingsUpdated => {
                info!("CONFIG | settings updated");
            }
            AppEvent::Started { zones } => {
                info!("START | zones={}", zones);
            }
        }
    }
}
