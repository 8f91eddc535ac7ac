//! Controller configuration parameters
//!
//! Timing, zone count, relay polarity and the user [`Settings`].
//! Values can be overridden via NVS (non-volatile storage).

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::zone::MAX_ZONES;

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    // --- Zones ---
    /// Number of wired zones (1..=MAX_ZONES)
    pub zone_count: u8,
    /// Per-zone relay polarity: `true` = energise by driving the pin low
    pub relay_active_low: [bool; MAX_ZONES],

    // --- Run modes ---
    /// Quick Run seconds per zone when the caller gives none
    pub default_quick_run_secs: u32,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Status report interval (seconds)
    pub status_interval_secs: u32,

    // --- User settings ---
    pub settings: Settings,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            zone_count: MAX_ZONES as u8,
            relay_active_low: [false; MAX_ZONES],

            default_quick_run_secs: 10,

            control_loop_interval_ms: 1000, // 1 Hz
            status_interval_secs: 60,       // 1/min

            settings: Settings::default(),
        }
    }
}
