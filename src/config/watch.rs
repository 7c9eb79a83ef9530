use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Cadence and ceilings of the property and path watchers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WatchConfig {
    /// Fallback poll cadence used when a property already carries a custom
    /// accessor and cannot be subscribed to
    #[serde(default = "default_property_poll_interval")]
    pub property_poll_interval_ms: u64,

    /// Ceiling of that fallback poll, measured from when it started
    #[serde(default = "default_property_timeout")]
    pub property_timeout_ms: u64,

    /// Poll cadence of each unresolved path segment
    #[serde(default = "default_path_poll_interval")]
    pub path_poll_interval_ms: u64,

    /// Overall ceiling of one path watch, measured from when it was armed
    #[serde(default = "default_path_timeout")]
    pub path_timeout_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            property_poll_interval_ms: default_property_poll_interval(),
            property_timeout_ms: default_property_timeout(),
            path_poll_interval_ms: default_path_poll_interval(),
            path_timeout_ms: default_path_timeout(),
        }
    }
}

impl WatchConfig {
    pub fn property_poll_interval(&self) -> Duration {
        Duration::from_millis(self.property_poll_interval_ms)
    }

    pub fn property_timeout(&self) -> Duration {
        Duration::from_millis(self.property_timeout_ms)
    }

    pub fn path_poll_interval(&self) -> Duration {
        Duration::from_millis(self.path_poll_interval_ms)
    }

    pub fn path_timeout(&self) -> Duration {
        Duration::from_millis(self.path_timeout_ms)
    }

    pub(super) fn validate(&self) -> Result<()> {
        if self.property_poll_interval_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "property_poll_interval_ms cannot be 0".into(),
            )));
        }

        if self.property_poll_interval_ms >= self.property_timeout_ms {
            return Err(Error::Config(ConfigError::Message(format!(
                "property_poll_interval_ms {}ms should be less than property_timeout_ms {}ms",
                self.property_poll_interval_ms, self.property_timeout_ms
            ))));
        }

        if self.path_poll_interval_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "path_poll_interval_ms cannot be 0".into(),
            )));
        }

        if self.path_poll_interval_ms >= self.path_timeout_ms {
            return Err(Error::Config(ConfigError::Message(format!(
                "path_poll_interval_ms {}ms should be less than path_timeout_ms {}ms",
                self.path_poll_interval_ms, self.path_timeout_ms
            ))));
        }

        Ok(())
    }
}

fn default_property_poll_interval() -> u64 {
    10
}
fn default_property_timeout() -> u64 {
    10_000
}
fn default_path_poll_interval() -> u64 {
    10
}
fn default_path_timeout() -> u64 {
    10_000
}
