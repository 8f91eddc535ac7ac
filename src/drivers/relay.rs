//! Zone relay driver.
//!
//! One GPIO per zone, each with its own polarity.  Many cheap relay
//! modules energise the coil when the input is pulled LOW, so the
//! driver translates logical on/off into the right pin level.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes GPIO levels via hw_init.
//! On host/test: hw_init tracks levels in memory.

use log::debug;

use crate::drivers::hw_init;
use crate::pins;
use crate::zone::MAX_ZONES;

pub struct RelayDriver {
    active_low: [bool; MAX_ZONES],
    state: [bool; MAX_ZONES],
    count: usize,
}

impl RelayDriver {
    /// Drive `count` relays (clamped to the board's channel count).
    pub fn new(count: usize, active_low: [bool; MAX_ZONES]) -> Self {
        Self {
            active_low,
            state: [false; MAX_ZONES],
            count: count.min(MAX_ZONES),
        }
    }

    /// Energise or release one relay.  Out-of-range zones are ignored.
    pub fn set(&mut self, zone: usize, on: bool) {
        if zone >= self.count {
            return;
        }
        let level = on != self.active_low[zone];
        hw_init::gpio_write(pins::ZONE_RELAY_GPIOS[zone], level);
        self.state[zone] = on;
        debug!(
            "Relay: zone {} {} (GPIO {} {})",
            zone,
            if on { "on" } else { "off" },
            pins::ZONE_RELAY_GPIOS[zone],
            if level { "HIGH" } else { "LOW" }
        );
    }

    /// Release every relay.
    pub fn all_off(&mut self) {
        for zone in 0..self.count {
            self.set(zone, false);
        }
    }

    pub fn is_on(&self, zone: usize) -> bool {
        self.state.get(zone).copied().unwrap_or(false)
    }

    pub fn any_on(&self) -> bool {
        self.state[..self.count].iter().any(|&s| s)
    }

    pub fn count(&self) -> usize {
        self.count
    }
}
