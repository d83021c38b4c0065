//! # Script Runtime
//!
//! Owns the Lua state and drives one bus drain per firmware tick.

use std::path::Path;
use std::sync::Arc;

use ez_bus::DrainReport;
use mlua::Lua;
use tracing::{debug, info};

use crate::bindings::register_bus_module;
use crate::error::ScriptError;
use crate::host::LuaHost;
use crate::ScriptBus;

/// Lua state plus the bus it is subscribed to.
///
/// Not `Send`: lives on the thread that calls [`update`](Self::update).
pub struct ScriptRuntime {
    host: LuaHost,
    bus: Arc<ScriptBus>,
}

impl ScriptRuntime {
    /// Create a fresh Lua state with `ez.bus` bound to `bus`.
    pub fn new(bus: Arc<ScriptBus>) -> Result<Self, ScriptError> {
        let host = LuaHost::new();
        register_bus_module(&host, &bus)?;
        info!(
            queue_capacity = bus.config().queue_capacity,
            "Script runtime initialized"
        );
        Ok(Self { host, bus })
    }

    /// Run a chunk of Lua source.
    pub fn exec(&self, source: &str, name: &str) -> Result<(), ScriptError> {
        self.host.load(source).set_name(name).exec()?;
        Ok(())
    }

    /// Read and run a script file.
    pub fn load_file(&self, path: &Path) -> Result<(), ScriptError> {
        let source = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = source.len(), "Loading script");
        self.exec(&source, &format!("@{}", path.display()))
    }

    /// Deliver everything queued since the last call, then free the
    /// registry slots released during delivery.
    pub fn update(&self) -> DrainReport {
        let report = self.bus.process(&self.host);
        self.host.reclaim();
        report
    }

    /// Drop every subscription and pending message, and free their slots.
    pub fn shutdown(&self) {
        self.bus.clear_all();
        self.host.reclaim();
        info!("Script runtime shut down");
    }

    #[must_use]
    pub fn lua(&self) -> &Lua {
        self.host.lua()
    }

    #[must_use]
    pub fn host(&self) -> &LuaHost {
        &self.host
    }

    #[must_use]
    pub fn bus(&self) -> &Arc<ScriptBus> {
        &self.bus
    }
}
