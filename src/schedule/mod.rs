//! Weekly program scheduling.
//!
//! ```text
//! ┌────────────┐  save   ┌──────────────┐  recompute(day)  ┌──────────────┐
//! │ ProgramSet │───────▶ │  calculator  │ ───────────────▶ │  ZoneTable   │
//! │  (A, B, C) │         │ (one cursor  │                  │ 3 windows per│
//! └─────┬──────┘         │ per program) │                  │    zone      │
//!       │ persist        └──────────────┘                  └──────┬───────┘
//!       ▼                                                         │ each tick
//!  JSON document                                                  ▼
//!  (StoragePort)                                      evaluator::is_active()
//! ```
//!
//! Everything here is pure logic.  Time comes in as explicit
//! [`Weekday`](weekday::Weekday) / hour / minute arguments and storage
//! through the [`StoragePort`](crate::app::ports::StoragePort) trait.

pub mod calculator;
pub mod evaluator;
pub mod persist;
pub mod program;
pub mod time;
pub mod weekday;

pub use calculator::{CalculatedSchedule, recompute};
pub use evaluator::is_active;
pub use program::{DayMask, PROGRAM_COUNT, Program, ProgramSet, ProgramSlot};
pub use time::TimeOfDay;
pub use weekday::Weekday;
