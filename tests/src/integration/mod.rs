//! End-to-end bus behaviour through a real Lua state.

pub mod harness;

mod concurrency;
mod delivery;
