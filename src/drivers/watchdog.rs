//! Task watchdog (TWDT) guard for the control loop.
//!
//! If the loop stops feeding, the TWDT panics and the chip reboots;
//! `hw_init` then parks every relay released.  A hung loop must never
//! leave a valve open.
//!
//! Feed once per loop iteration, after outputs have been resolved.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::{
    ESP_OK, esp_task_wdt_add, esp_task_wdt_config_t, esp_task_wdt_reconfigure, esp_task_wdt_reset,
};
use log::{info, warn};

/// Default stall timeout.
pub const DEFAULT_TIMEOUT_MS: u32 = 10_000;

pub struct Watchdog {
    timeout_ms: u32,
    /// Main task is registered with the TWDT (always `false` on host).
    armed: bool,
    feeds: u32,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_MS)
    }
}

impl Watchdog {
    /// Configure the TWDT and subscribe the calling task.
    ///
    /// Failure to subscribe is logged, not fatal: the loop still runs,
    /// just unguarded.
    pub fn new(timeout_ms: u32) -> Self {
        let armed = Self::arm(timeout_ms);
        if armed {
            info!("Watchdog: armed, {} ms, panic on stall", timeout_ms);
        } else {
            warn!("Watchdog: not armed, loop runs unguarded");
        }
        Self {
            timeout_ms,
            armed,
            feeds: 0,
        }
    }

    #[cfg(target_os = "espidf")]
    fn arm(timeout_ms: u32) -> bool {
        let cfg = esp_task_wdt_config_t {
            timeout_ms,
            idle_core_mask: 0,
            trigger_panic: true,
        };
        // SAFETY: boot-time TWDT setup from the main task.
        let ret = unsafe { esp_task_wdt_reconfigure(&cfg) };
        if ret != ESP_OK as i32 {
            // Already initialised by the bootloader config; keep going.
            warn!("Watchdog: reconfigure returned {}", ret);
        }
        // SAFETY: a null handle subscribes the calling task.
        let ret = unsafe { esp_task_wdt_add(core::ptr::null_mut()) };
        ret == ESP_OK as i32
    }

    #[cfg(not(target_os = "espidf"))]
    fn arm(_timeout_ms: u32) -> bool {
        false
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Number of feeds since boot (wraps).
    pub fn feed_count(&self) -> u32 {
        self.feeds
    }

    /// Reset the stall timer.
    pub fn feed(&mut self) {
        self.feeds = self.feeds.wrapping_add(1);
        #[cfg(target_os = "espidf")]
        if self.armed {
            // SAFETY: resets the TWDT for the subscribed calling task.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }
}
