//! Single-colour status LED driver.
//!
//! Lit while any zone is watering.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives one GPIO via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

pub struct StatusLed {
    lit: bool,
}

impl Default for StatusLed {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusLed {
    pub fn new() -> Self {
        Self { lit: false }
    }

    pub fn set(&mut self, lit: bool) {
        hw_init::gpio_write(pins::STATUS_LED_GPIO, lit != pins::STATUS_LED_ACTIVE_LOW);
        self.lit = lit;
    }

    pub fn off(&mut self) {
        self.set(false);
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}
