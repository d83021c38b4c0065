//! Runtime configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use ez_bus::BusConfig;

use crate::RuntimeError;

/// Default delay between two bus drains.
pub const DEFAULT_TICK: Duration = Duration::from_millis(10);

/// Configuration for the firmware runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Message bus settings.
    pub bus: BusConfig,

    /// Interval between two drains of the bus.
    pub tick: Duration,

    /// Lua script run once at boot, if any.
    pub boot_script: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bus: BusConfig::default(),
            tick: DEFAULT_TICK,
            boot_script: None,
        }
    }
}

impl RuntimeConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `EZ_TICK_MS`: Drain interval in milliseconds (default: 10)
    /// - `EZ_BOOT_SCRIPT`: Path of the boot script (default: none)
    /// - `EZ_BUS_*`: see [`BusConfig::from_env`]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            bus: BusConfig::from_lookup(&lookup),
            tick: lookup("EZ_TICK_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_TICK),
            boot_script: lookup("EZ_BOOT_SCRIPT")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Reject configurations the runtime cannot run with.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.tick.is_zero() {
            return Err(RuntimeError::InvalidTick);
        }
        self.bus.validate()?;
        Ok(())
    }
}
