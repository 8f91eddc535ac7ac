//! GPIO pin assignments for the sprinkler controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

use crate::zone::MAX_ZONES;

// ---------------------------------------------------------------------------
// Zone relays (8-channel relay module)
// ---------------------------------------------------------------------------

/// Relay GPIO for each zone, zone 0 first.
pub const ZONE_RELAY_GPIOS: [i32; MAX_ZONES] = [13, 12, 14, 27, 26, 25, 33, 32];

// ---------------------------------------------------------------------------
// Status LED
// ---------------------------------------------------------------------------

/// Single status LED, lit while any zone is watering.
pub const STATUS_LED_GPIO: i32 = 23;
/// The LED sinks current: drive LOW to light it.
pub const STATUS_LED_ACTIVE_LOW: bool = true;
