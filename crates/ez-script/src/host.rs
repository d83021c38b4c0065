//! # Lua Host
//!
//! [`ScriptHost`] implementation over an `mlua` state. Handles are registry
//! keys: a callback or table stays reachable from the Lua registry until
//! its key is dropped and [`LuaHost::reclaim`] runs.

use std::ops::Deref;

use ez_bus::{PayloadRef, ScriptHost};
use mlua::{Function, Lua, LuaSerdeExt, RegistryKey, SerializeOptions, Value};

/// A Lua state the bus can deliver into.
pub struct LuaHost {
    lua: Lua,
}

impl Default for LuaHost {
    fn default() -> Self {
        Self::new()
    }
}

impl LuaHost {
    #[must_use]
    pub fn new() -> Self {
        Self::with_lua(Lua::new())
    }

    #[must_use]
    pub fn with_lua(lua: Lua) -> Self {
        Self { lua }
    }

    #[must_use]
    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    /// Free registry slots whose keys have been dropped.
    pub fn reclaim(&self) {
        self.lua.expire_registry_values();
    }
}

impl Deref for LuaHost {
    type Target = Lua;

    fn deref(&self) -> &Lua {
        &self.lua
    }
}

/// Records become plain tables: `null` and unit map to `nil`.
fn record_options() -> SerializeOptions {
    SerializeOptions::new()
        .serialize_none_to_null(false)
        .serialize_unit_to_null(false)
}

impl ScriptHost for LuaHost {
    type Handle = RegistryKey;
    type Error = mlua::Error;

    fn import(&self, record: &serde_json::Value) -> mlua::Result<RegistryKey> {
        let value = self.lua.to_value_with(record, record_options())?;
        self.lua.create_registry_value(value)
    }

    fn invoke(
        &self,
        callback: &RegistryKey,
        topic: &str,
        payload: PayloadRef<'_, RegistryKey>,
    ) -> mlua::Result<()> {
        let function: Function = self.lua.registry_value(callback)?;
        let data = match payload {
            PayloadRef::Text(text) => Value::String(self.lua.create_string(text)?),
            PayloadRef::Value(key) => self.lua.registry_value::<Value>(key)?,
        };
        function.call::<()>((topic, data))
    }
}
