//! Unified error type for the sprinkler firmware.
//!
//! Every fallible adapter or persistence call funnels into [`Error`] so
//! the main loop can log failures uniformly.  None of these are fatal:
//! the scheduling core always falls back to a safe default state.
//! All variants are `Copy`.

use core::fmt;

use crate::app::ports::{ConfigError, StorageError};

/// Every fallible firmware operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The key-value store rejected a read or write.
    Storage(StorageError),
    /// Controller configuration could not be loaded or was invalid.
    Config(ConfigError),
    /// A persisted document could not be encoded or decoded.
    Document(&'static str),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Document(msg) => write!(f, "document: {msg}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<crate::drivers::hw_init::HwInitError> for Error {
    fn from(_: crate::drivers::hw_init::HwInitError) -> Self {
        Self::Init("GPIO configuration failed")
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
