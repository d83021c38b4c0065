//! # `ez.bus` Script Module
//!
//! ```lua
//! local id = ez.bus.subscribe("screen/pushed", function(topic, title)
//!     print(topic, title)
//! end)
//! ez.bus.post("settings/changed", "brightness=80")
//! ez.bus.post("app/state", { page = 2 })   -- table passed by reference
//! ez.bus.unsubscribe(id)
//! ```

use std::sync::Arc;

use ez_bus::{install_echo, SubscriptionId};
use mlua::{Function, Lua, Table, Value, Variadic};
use tracing::debug;

use crate::ScriptBus;

/// Install `ez.bus` into `lua`, creating the global `ez` table if needed.
///
/// Also subscribes the built-in `bus/ping` echo handler on `bus`.
pub fn register_bus_module(lua: &Lua, bus: &Arc<ScriptBus>) -> mlua::Result<()> {
    let globals = lua.globals();
    let ez = match globals.get::<Option<Table>>("ez")? {
        Some(ez) => ez,
        None => {
            let ez = lua.create_table()?;
            globals.set("ez", ez.clone())?;
            ez
        }
    };

    let module = lua.create_table()?;

    let b = Arc::clone(bus);
    module.set(
        "subscribe",
        lua.create_function(move |lua, (topic, callback): (String, Function)| {
            let key = lua.create_registry_value(callback)?;
            Ok(b.subscribe_script(&topic, key).get())
        })?,
    )?;

    let b = Arc::clone(bus);
    module.set(
        "unsubscribe",
        lua.create_function(move |_, id: i64| {
            let Ok(raw) = u64::try_from(id) else {
                return Ok(false);
            };
            Ok(b.unsubscribe(SubscriptionId::new(raw)))
        })?,
    )?;

    let b = Arc::clone(bus);
    module.set(
        "post",
        lua.create_function(move |lua, (topic, rest): (String, Variadic<Value>)| {
            // An explicit nil posts "", a missing argument is an error.
            let Some(data) = rest.first().cloned() else {
                return Err(mlua::Error::RuntimeError(
                    "bad argument #2 to 'post' (value expected)".to_string(),
                ));
            };
            match data {
                Value::Table(table) => {
                    let key = lua.create_registry_value(table)?;
                    b.post_foreign(&topic, key);
                }
                Value::Nil => b.post(&topic, ""),
                other => {
                    let type_name = other.type_name();
                    match lua.coerce_string(other)? {
                        Some(text) => b.post(&topic, &*text.as_bytes()),
                        None => {
                            return Err(mlua::Error::RuntimeError(format!(
                                "bad argument #2 to 'post' (string expected, got {type_name})"
                            )))
                        }
                    }
                }
            }
            Ok(())
        })?,
    )?;

    let b = Arc::clone(bus);
    module.set(
        "has_subscribers",
        lua.create_function(move |_, topic: String| Ok(b.has_subscribers(&topic)))?,
    )?;

    let b = Arc::clone(bus);
    module.set(
        "pending_count",
        lua.create_function(move |_, ()| Ok(b.pending_count()))?,
    )?;

    ez.set("bus", module)?;
    install_echo(bus);

    debug!("Registered ez.bus module");
    Ok(())
}
