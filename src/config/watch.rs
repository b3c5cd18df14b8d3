use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_ITERATION_TIME_MS;
use crate::constants::DEFAULT_LOCK_TIME_MS;
use crate::constants::DEFAULT_MAX_ATTEMPTS;
use crate::Error;
use crate::Result;

/// Serializable watch settings, expressed in milliseconds
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WatchConfig {
    /// Interval between two poll cycles
    #[serde(default = "default_iteration_time_ms")]
    pub iteration_time_ms: u64,

    /// How long a key stays locked once it is locked
    #[serde(default = "default_lock_time_ms")]
    pub lock_time_ms: u64,

    /// Attempt ceiling per key. Advisory: the engine never enforces it.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            iteration_time_ms: default_iteration_time_ms(),
            lock_time_ms: default_lock_time_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl WatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.iteration_time_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "watch.iteration_time_ms must be greater than 0".into(),
            )));
        }
        if self.lock_time_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "watch.lock_time_ms must be greater than 0".into(),
            )));
        }
        if self.max_attempts == 0 {
            return Err(Error::Config(ConfigError::Message(
                "watch.max_attempts must be greater than 0".into(),
            )));
        }
        Ok(())
    }

    pub fn options(&self) -> WatchOptions {
        WatchOptions {
            iteration_time: Duration::from_millis(self.iteration_time_ms),
            lock_time: Duration::from_millis(self.lock_time_ms),
            max_attempts: self.max_attempts,
        }
    }
}

/// Immutable watch options handed to a [`crate::WatchEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub iteration_time: Duration,
    pub lock_time: Duration,
    pub max_attempts: u32,
}

impl Default for WatchOptions {
    fn default() -> Self {
        WatchConfig::default().options()
    }
}

fn default_iteration_time_ms() -> u64 {
    DEFAULT_ITERATION_TIME_MS
}
fn default_lock_time_ms() -> u64 {
    DEFAULT_LOCK_TIME_MS
}
fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}
