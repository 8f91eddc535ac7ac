//! Application core: pure domain logic, zero I/O.
//!
//! Mode arbitration between the automatic schedule, manual control and
//! the two sweep modes lives here.  All interaction with hardware goes
//! through the **port traits** in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
