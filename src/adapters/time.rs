//! ESP32 clock adapter.
//!
//! Implements [`ClockPort`] for the control loop.
//!
//! - **`target_os = "espidf"`**: monotonic uptime from
//!   `esp_timer_get_time()`; local time from `gettimeofday` +
//!   `localtime_r`, honouring the POSIX `TZ` set by
//!   [`apply_timezone`].  Wall time before 2020 is treated as "not yet
//!   synchronised by SNTP".
//! - **`not(target_os = "espidf")`**: `std::time::Instant` for uptime and
//!   UTC from `SystemTime` for host-side simulation.

use log::info;

use crate::app::ports::{ClockPort, WallClock};
use crate::schedule::weekday::Weekday;

/// Epoch seconds for 2020-01-01T00:00:00Z.  Anything earlier means the
/// RTC has not been set.
pub const EPOCH_2020: u64 = 1_577_836_800;

/// Split epoch seconds (already shifted to local time) into a
/// [`WallClock`].  Returns `None` for unsynchronised timestamps.
pub fn wall_clock_from_epoch(secs: u64) -> Option<WallClock> {
    if secs < EPOCH_2020 {
        return None;
    }
    let secs_of_day = secs % 86_400;
    Some(WallClock {
        weekday: Weekday::from_epoch_secs(secs),
        hour: (secs_of_day / 3600) as u8,
        minute: (secs_of_day % 3600 / 60) as u8,
    })
}

/// Clock adapter for the ESP32 platform.
pub struct SystemClockAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClockAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

impl ClockPort for SystemClockAdapter {
    #[cfg(target_os = "espidf")]
    fn uptime_ms(&self) -> u64 {
        // SAFETY: esp_timer_get_time reads the monotonic high-resolution timer.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    #[cfg(not(target_os = "espidf"))]
    fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    #[cfg(target_os = "espidf")]
    fn local_time(&self) -> Option<WallClock> {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        // SAFETY: gettimeofday writes into the caller-owned timeval.
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return None;
        }
        if (tv.tv_sec as i64) < EPOCH_2020 as i64 {
            return None;
        }
        let secs = tv.tv_sec as esp_idf_svc::sys::time_t;
        // SAFETY: tm is plain-old-data; localtime_r fills it in.
        let mut tm: esp_idf_svc::sys::tm = unsafe { core::mem::zeroed() };
        if unsafe { esp_idf_svc::sys::localtime_r(&secs, &mut tm) }.is_null() {
            return None;
        }
        if !(0..=23).contains(&tm.tm_hour) || !(0..=59).contains(&tm.tm_min) {
            return None;
        }
        Some(WallClock {
            weekday: Weekday::from_tm_wday(tm.tm_wday)?,
            hour: tm.tm_hour as u8,
            minute: tm.tm_min as u8,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn local_time(&self) -> Option<WallClock> {
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .ok()?
            .as_secs();
        wall_clock_from_epoch(secs)
    }
}

/// Install a POSIX `TZ` string for `localtime_r`.
#[cfg(target_os = "espidf")]
pub fn apply_timezone(posix_tz: &str) {
    // SAFETY: called from the main task while no other thread reads the
    // environment.
    unsafe {
        std::env::set_var("TZ", posix_tz);
        esp_idf_svc::sys::tzset();
    }
    info!("Clock: TZ set to {}", posix_tz);
}

/// Host simulation always reports UTC; the string is only logged.
#[cfg(not(target_os = "espidf"))]
pub fn apply_timezone(posix_tz: &str) {
    info!("Clock(sim): TZ {} ignored, using UTC", posix_tz);
}
