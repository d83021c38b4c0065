//! # ez-script - Lua Adapter for the Message Bus
//!
//! Connects [`ez_bus::MessageBus`] to an embedded Lua 5.4 state.
//!
//! ```text
//! ScriptRuntime
//!  ├── LuaHost (mlua::Lua)
//!  │    └── ez.bus  (subscribe, unsubscribe, post, has_subscribers, pending_count)
//!  └── Arc<ScriptBus>  ← shared with native producers
//! ```
//!
//! Script callbacks and table payloads are held by the bus as
//! [`mlua::RegistryKey`]s. Dropping a key queues its slot for release;
//! [`ScriptRuntime::update`] reclaims queued slots after every drain.
//!
//! ## Usage
//!
//! ```ignore
//! let bus = Arc::new(ScriptBus::new());
//! let runtime = ScriptRuntime::new(Arc::clone(&bus))?;
//! runtime.load_file(Path::new("boot.lua"))?;
//!
//! loop {
//!     runtime.update();
//! }
//! ```

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod bindings;
pub mod error;
pub mod host;
pub mod mesh;
pub mod runtime;

pub use bindings::register_bus_module;
pub use error::ScriptError;
pub use host::LuaHost;
pub use mesh::{post_group_packet, post_mesh_packet, post_node_discovered};
pub use runtime::ScriptRuntime;

/// The bus as seen by the firmware: delivering into Lua.
pub type ScriptBus = ez_bus::MessageBus<LuaHost>;
