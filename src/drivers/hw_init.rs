//! One-shot GPIO initialization and raw pin writes.
//!
//! Configures every relay and the status LED as push-pull outputs using
//! raw ESP-IDF sys calls, parking each pin at its *inactive* level so no
//! valve opens during boot.  Called once from `main()` before the event
//! loop starts.
//!
//! On host builds the pin levels are tracked in memory so drivers can be
//! tested without hardware.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed { pin: i32, rc: i32 },
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed { pin, rc } => {
                write!(f, "GPIO {} config failed (rc={})", pin, rc)
            }
        }
    }
}

/// Level that leaves an output inactive given its polarity.
pub const fn idle_level(active_low: bool) -> bool {
    active_low
}

// ── GPIO Outputs ──────────────────────────────────────────────

/// Configure relay and LED outputs, all inactive.
#[cfg(target_os = "espidf")]
pub fn init_outputs(relay_active_low: &[bool]) -> Result<(), HwInitError> {
    let relays = pins::ZONE_RELAY_GPIOS.iter().zip(relay_active_low.iter().copied());
    let led = core::iter::once((&pins::STATUS_LED_GPIO, pins::STATUS_LED_ACTIVE_LOW));

    for (&pin, active_low) in relays.chain(led) {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: called once from main() before the event loop; the pin
        // numbers come from the board table.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed { pin, rc: ret });
        }
        gpio_write(pin, idle_level(active_low));
    }

    info!(
        "hw_init: {} relay outputs + status LED configured",
        relay_active_low.len().min(pins::ZONE_RELAY_GPIOS.len())
    );
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_outputs(relay_active_low: &[bool]) -> Result<(), HwInitError> {
    for (&pin, &active_low) in pins::ZONE_RELAY_GPIOS.iter().zip(relay_active_low) {
        gpio_write(pin, idle_level(active_low));
    }
    gpio_write(pins::STATUS_LED_GPIO, idle_level(pins::STATUS_LED_ACTIVE_LOW));
    log::info!("hw_init(sim): outputs parked inactive");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin.
    // Main-loop only.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

// Per-thread so parallel host tests never observe each other's pins.
#[cfg(not(target_os = "espidf"))]
std::thread_local! {
    static SIM_LEVELS: core::cell::Cell<u64> = const { core::cell::Cell::new(0) };
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) {
    let bit = 1u64 << pin;
    SIM_LEVELS.with(|levels| {
        let v = levels.get();
        levels.set(if high { v | bit } else { v & !bit });
    });
}

/// Last level written to `pin` on this thread (host simulation only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_level(pin: i32) -> bool {
    SIM_LEVELS.with(|levels| levels.get() & (1u64 << pin) != 0)
}
