//! # ez Telemetry
//!
//! Logging setup for the firmware runtime, built on `tracing`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ez_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     tracing::info!("booting");
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `EZ_SERVICE_NAME` | `ez-firmware` | Service name in logs |
//! | `EZ_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `EZ_CONSOLE_OUTPUT` | `true` | Write logs to the console |
//! | `EZ_JSON_LOGS` | `false` | JSON lines instead of pretty output |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter '{directive}': {reason}")]
    Filter { directive: String, reason: String },

    #[error("Failed to install log subscriber: {0}")]
    Init(String),
}

/// Initialize logging for the process.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_logging(config)
}
