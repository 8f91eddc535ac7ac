//! Relay bank adapter.
//!
//! Implements [`RelayPort`] on top of the [`RelayDriver`] and mirrors
//! "any zone watering" onto the status LED.

use log::info;

use crate::app::ports::RelayPort;
use crate::drivers::relay::RelayDriver;
use crate::drivers::status_led::StatusLed;
use crate::zone::MAX_ZONES;

pub struct RelayBankAdapter {
    relays: RelayDriver,
    led: StatusLed,
}

impl RelayBankAdapter {
    pub fn new(zone_count: usize, active_low: [bool; MAX_ZONES]) -> Self {
        let relays = RelayDriver::new(zone_count, active_low);
        info!("RelayBank: {} zones", relays.count());
        Self {
            relays,
            led: StatusLed::new(),
        }
    }

    pub fn is_on(&self, zone: usize) -> bool {
        self.relays.is_on(zone)
    }

    pub fn led_lit(&self) -> bool {
        self.led.is_lit()
    }

    fn sync_led(&mut self) {
        let any = self.relays.any_on();
        if any != self.led.is_lit() {
            self.led.set(any);
        }
    }
}

impl RelayPort for RelayBankAdapter {
    fn set_zone_output(&mut self, zone: usize, on: bool) {
        self.relays.set(zone, on);
        self.sync_led();
    }

    fn all_off(&mut self) {
        self.relays.all_off();
        self.led.off();
    }
}
