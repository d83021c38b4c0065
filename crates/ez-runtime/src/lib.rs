//! # Firmware Runtime
//!
//! Composition root: creates the one message bus, the Lua runtime bound to
//! it, and the tick loop that drains the bus.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (from env)
//! 2. Create the bus and the script runtime, registering `ez.bus`
//! 3. Run the boot script, if configured
//! 4. Tick until the shutdown signal
//! 5. Clear the bus, releasing every script handle

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;

use std::future::Future;
use std::sync::Arc;

use ez_bus::{BusError, DrainReport};
use ez_script::{ScriptBus, ScriptError, ScriptRuntime};
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use ez_telemetry::log_event;

pub use config::RuntimeConfig;

const COMPONENT: &str = "runtime";

/// Errors raised while starting the runtime
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Tick interval must be greater than zero")]
    InvalidTick,

    #[error("Bus configuration error: {0}")]
    Bus(#[from] BusError),

    #[error("Script error: {0}")]
    Script(#[from] ScriptError),
}

/// The firmware's event loop.
///
/// Lives on one thread: the Lua state inside is not `Send`. Producers on
/// other threads get a bus handle from [`bus`](Self::bus).
pub struct FirmwareRuntime {
    config: RuntimeConfig,
    bus: Arc<ScriptBus>,
    script: ScriptRuntime,
}

impl FirmwareRuntime {
    /// Create the bus and script runtime.
    pub fn new(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        config.validate()?;
        let bus = Arc::new(ScriptBus::with_config(config.bus.clone())?);
        let script = ScriptRuntime::new(Arc::clone(&bus))?;

        log_event!(
            info,
            COMPONENT,
            "Firmware runtime created",
            tick_ms = config.tick.as_millis() as u64,
            queue_capacity = config.bus.queue_capacity,
            release = ?config.bus.unsubscribe_release
        );
        Ok(Self {
            config,
            bus,
            script,
        })
    }

    /// Run the configured boot script. No-op without one.
    pub fn boot(&self) -> Result<(), RuntimeError> {
        if let Some(path) = &self.config.boot_script {
            log_event!(info, COMPONENT, "Running boot script", path = %path.display());
            self.script.load_file(path)?;
        }
        Ok(())
    }

    /// A bus handle for a producer.
    #[must_use]
    pub fn bus(&self) -> Arc<ScriptBus> {
        Arc::clone(&self.bus)
    }

    #[must_use]
    pub fn script(&self) -> &ScriptRuntime {
        &self.script
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// One drain of the bus.
    pub fn tick(&self) -> DrainReport {
        self.script.update()
    }

    /// Tick on the configured interval until `shutdown` resolves.
    ///
    /// Returns the number of ticks run.
    pub async fn run_until<F>(&self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.config.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut ticks = 0u64;
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = interval.tick() => {
                    self.tick();
                    ticks += 1;
                }
            }
        }

        log_event!(debug, COMPONENT, "Tick loop stopped", ticks);
        ticks
    }

    /// Release every subscription and pending message.
    pub fn shutdown(&self) {
        let metrics = self.bus.metrics().snapshot();
        log_event!(
            info,
            COMPONENT,
            "Shutting down firmware runtime",
            posted = metrics.posted,
            dropped = metrics.dropped,
            delivered = metrics.delivered,
            callback_failures = metrics.callback_failures,
            active_subscriptions = self.bus.active_subscription_count()
        );
        self.script.shutdown();
    }
}
