//! User-facing device settings: time zone, DST and Wi-Fi credentials.
//!
//! These are injected into the service through
//! [`ControllerConfig`](crate::config::ControllerConfig) and persisted
//! by the [`ConfigPort`](crate::app::ports::ConfigPort); nothing in the
//! scheduling core reads global state.

use core::fmt;

use heapless::String;
use serde::{Deserialize, Serialize};

/// SNTP server used once Wi-Fi is up.
pub const NTP_SERVER: &str = "pool.ntp.org";

pub const MAX_SSID_LEN: usize = 32;
pub const MAX_PASSWORD_LEN: usize = 64;

/// Supported US time zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeZone {
    #[default]
    Eastern,
    Central,
    Mountain,
    Pacific,
    Alaska,
    Hawaii,
}

impl TimeZone {
    pub const ALL: [TimeZone; 6] = [
        Self::Eastern,
        Self::Central,
        Self::Mountain,
        Self::Pacific,
        Self::Alaska,
        Self::Hawaii,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Eastern => "Eastern",
            Self::Central => "Central",
            Self::Mountain => "Mountain",
            Self::Pacific => "Pacific",
            Self::Alaska => "Alaska",
            Self::Hawaii => "Hawaii",
        }
    }

    /// Case-insensitive lookup; unknown names map to `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tz| tz.name().eq_ignore_ascii_case(name.trim()))
    }

    /// POSIX `TZ` string for this zone.  Hawaii never observes DST.
    pub const fn posix_tz(self, dst: bool) -> &'static str {
        match (self, dst) {
            (Self::Eastern, true) => "EST5EDT,M3.2.0/2,M11.1.0/2",
            (Self::Eastern, false) => "EST5",
            (Self::Central, true) => "CST6CDT,M3.2.0/2,M11.1.0/2",
            (Self::Central, false) => "CST6",
            (Self::Mountain, true) => "MST7MDT,M3.2.0/2,M11.1.0/2",
            (Self::Mountain, false) => "MST7",
            (Self::Pacific, true) => "PST8PDT,M3.2.0/2,M11.1.0/2",
            (Self::Pacific, false) => "PST8",
            (Self::Alaska, true) => "AKST9AKDT,M3.2.0/2,M11.1.0/2",
            (Self::Alaska, false) => "AKST9",
            (Self::Hawaii, _) => "HST10",
        }
    }
}

impl fmt::Display for TimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Device settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub timezone: TimeZone,
    /// Observe daylight saving time.
    pub dst: bool,
    pub wifi_ssid: String<MAX_SSID_LEN>,
    pub wifi_password: String<MAX_PASSWORD_LEN>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timezone: TimeZone::Eastern,
            dst: true,
            wifi_ssid: String::new(),
            wifi_password: String::new(),
        }
    }
}

impl Settings {
    /// POSIX `TZ` string for the configured zone and DST flag.
    pub fn posix_tz(&self) -> &'static str {
        self.timezone.posix_tz(self.dst)
    }

    /// Whether station-mode credentials have been provisioned.
    pub fn has_wifi_credentials(&self) -> bool {
        !self.wifi_ssid.is_empty()
    }
}
