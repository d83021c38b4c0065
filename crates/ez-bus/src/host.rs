//! # Script Host
//!
//! The seam between the bus and the script engine.

use std::fmt;

use crate::payload::PayloadRef;

/// A script engine the bus can deliver into.
///
/// The bus only ever touches the engine from inside
/// [`MessageBus::process`](crate::MessageBus::process), which runs on the
/// engine's own thread. Everything the bus stores for later is a
/// [`Handle`](ScriptHost::Handle), so the bus itself stays `Send + Sync`
/// even when the engine is not.
pub trait ScriptHost: 'static {
    /// An owned slot in the engine's value table (a callback function, a table).
    ///
    /// Dropping a handle must release its slot. The bus never clones a
    /// handle, so each one is released exactly once.
    type Handle: Send + Sync + 'static;

    /// Engine error, logged by the delivery pump.
    type Error: fmt::Display;

    /// Convert a bus-owned record into an engine value.
    fn import(&self, record: &serde_json::Value) -> Result<Self::Handle, Self::Error>;

    /// Call `callback(topic, payload)`.
    fn invoke(
        &self,
        callback: &Self::Handle,
        topic: &str,
        payload: PayloadRef<'_, Self::Handle>,
    ) -> Result<(), Self::Error>;
}
