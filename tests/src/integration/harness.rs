//! Runtime fixture shared by the integration tests.

use std::sync::Arc;

use ez_bus::{BusConfig, DrainReport};
use ez_script::{ScriptBus, ScriptRuntime};
use mlua::FromLua;

/// A script runtime plus helpers to poke at its Lua state.
pub struct Harness {
    runtime: ScriptRuntime,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    /// Runtime over a default bus.
    ///
    /// # Panics
    ///
    /// If the Lua state cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// # Panics
    ///
    /// If `config` is invalid or the Lua state cannot be created.
    #[must_use]
    pub fn with_config(config: BusConfig) -> Self {
        let bus = Arc::new(ScriptBus::with_config(config).expect("valid bus config"));
        let runtime = ScriptRuntime::new(bus).expect("script runtime");
        Self { runtime }
    }

    /// Run a chunk, panicking with the Lua error if it fails.
    pub fn run(&self, chunk: &str) {
        if let Err(e) = self.runtime.exec(chunk, "harness") {
            panic!("Lua chunk failed: {e}");
        }
    }

    /// Evaluate a Lua expression.
    ///
    /// # Panics
    ///
    /// If the expression fails or does not convert to `T`.
    pub fn eval<T: FromLua>(&self, expr: &str) -> T {
        self.runtime
            .lua()
            .load(format!("return {expr}"))
            .eval()
            .expect("Lua expression")
    }

    /// One tick: drain and reclaim.
    pub fn tick(&self) -> DrainReport {
        self.runtime.update()
    }

    /// Full collection cycle, twice so finalized objects are freed too.
    pub fn collect_garbage(&self) {
        self.run("collectgarbage(); collectgarbage()");
    }

    #[must_use]
    pub fn bus(&self) -> &Arc<ScriptBus> {
        self.runtime.bus()
    }

    #[must_use]
    pub fn runtime(&self) -> &ScriptRuntime {
        &self.runtime
    }
}
