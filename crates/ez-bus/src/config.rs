//! Bus configuration from environment variables.

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::BusError;
use crate::DEFAULT_QUEUE_CAPACITY;

/// When an unsubscribed entry gives its callback handle back to the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsubscribeRelease {
    /// Entry is only marked inactive; its handle is released by
    /// `clear_all` or when the bus is dropped.
    #[default]
    AtTeardown,

    /// Entry is removed and its handle released on `unsubscribe`.
    /// A callback that is being delivered to stays alive until it returns.
    Immediate,
}

/// Configuration for the message bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusConfig {
    /// Messages held between two drains; posts beyond this are dropped.
    pub queue_capacity: usize,

    /// Release policy for unsubscribed callbacks.
    pub unsubscribe_release: UnsubscribeRelease,

    /// Skip building eager/deferred payloads nobody is subscribed to at
    /// drain time.
    pub skip_idle_builders: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            unsubscribe_release: UnsubscribeRelease::AtTeardown,
            skip_idle_builders: false,
        }
    }
}

impl BusConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `EZ_BUS_QUEUE_CAPACITY`: Queue capacity (default: 64)
    /// - `EZ_BUS_RELEASE_ON_UNSUBSCRIBE`: Release callbacks on unsubscribe (default: false)
    /// - `EZ_BUS_SKIP_IDLE_BUILDERS`: Skip payload builds with no subscribers (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let flag = |key: &str| {
            lookup(key)
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false)
        };

        Self {
            queue_capacity: lookup("EZ_BUS_QUEUE_CAPACITY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.queue_capacity),

            unsubscribe_release: if flag("EZ_BUS_RELEASE_ON_UNSUBSCRIBE") {
                UnsubscribeRelease::Immediate
            } else {
                UnsubscribeRelease::AtTeardown
            },

            skip_idle_builders: flag("EZ_BUS_SKIP_IDLE_BUILDERS"),
        }
    }

    pub fn validate(&self) -> Result<(), BusError> {
        if self.queue_capacity == 0 {
            return Err(BusError::InvalidCapacity {
                capacity: self.queue_capacity,
            });
        }
        Ok(())
    }
}
