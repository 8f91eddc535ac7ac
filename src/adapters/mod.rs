//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements   | Connects to                   |
//! |--------------|--------------|-------------------------------|
//! | `relay_bank` | RelayPort    | Relay GPIOs + status LED      |
//! | `time`       | ClockPort    | esp_timer, SNTP-set RTC, TZ   |
//! | `log_sink`   | EventSink    | Serial log output             |
//! | `console`    | (ingress)    | Serial line commands → app    |
//! | `nvs`        | ConfigPort   | NVS / in-memory store         |
//! |              | StoragePort  |                               |

pub mod console;
pub mod log_sink;
pub mod nvs;
pub mod relay_bank;
pub mod time;
pub(super) mod utils;
