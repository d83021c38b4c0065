//! # ez Firmware Runtime
//!
//! Boots the Lua runtime and drains the message bus once per tick until
//! Ctrl+C.
//!
//! ```text
//! radio / mesh / UI threads ──post──→ MessageBus ──tick──→ Lua subscribers
//! ```

use anyhow::{Context, Result};
use ez_bus::UiEvent;
use ez_runtime::{FirmwareRuntime, RuntimeConfig};
use ez_telemetry::{init_telemetry, log_event, TelemetryConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_telemetry(&TelemetryConfig::from_env()).context("Failed to initialize logging")?;

    let config = RuntimeConfig::from_env();
    let runtime = FirmwareRuntime::new(config).context("Failed to create firmware runtime")?;
    runtime.boot().context("Boot script failed")?;

    runtime.bus().post_ui(&UiEvent::ScreenPushed {
        title: "Home".to_string(),
    });

    log_event!(info, "runtime", "Firmware is running. Press Ctrl+C to stop.");
    let ticks = runtime
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log_event!(warn, "runtime", "Failed to listen for Ctrl+C, stopping", error = %e);
            }
        })
        .await;

    log_event!(info, "runtime", "Shutdown signal received", ticks);
    runtime.shutdown();
    Ok(())
}
