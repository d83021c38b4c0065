//! # ez-bus - Message Bus Between Native Code and Scripts
//!
//! Topic-based publish/subscribe that lets concurrent native producers
//! (radio interrupts, mesh tasks, UI code) hand events to the single-threaded
//! script engine.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐  post*()   ┌──────────────┐  process(&host)  ┌──────────────┐
//! │  Producers   │ ─────────→ │ MessageQueue │ ───────────────→ │ Subscribers  │
//! │ (any thread) │            │  (bounded)   │  (engine thread) │ native, then │
//! └──────────────┘            └──────────────┘                  │   script     │
//!                                                               └──────────────┘
//! ```
//!
//! ## Rules
//!
//! - One lock guards the registry and the queue; it is never held while a
//!   callback runs, so callbacks may subscribe, unsubscribe and post.
//! - Recipients are resolved at drain time, not at post time.
//! - The queue is bounded; a post against a full queue is dropped.
//! - Every host handle (script callback or foreign payload) is released
//!   exactly once, by dropping it.
//!
//! The bus is engine-agnostic: see [`ScriptHost`].

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod builtin;
pub mod bus;
pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod metrics;
pub mod payload;
pub mod queue;
pub mod registry;
pub mod topic;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export main types
pub use builtin::install_echo;
pub use bus::{DrainReport, MessageBus};
pub use config::{BusConfig, UnsubscribeRelease};
pub use error::BusError;
pub use events::{topics, GroupPacket, MeshPacket, NodeDiscovered, UiEvent};
pub use host::ScriptHost;
pub use metrics::{BusMetrics, MetricsSnapshot};
pub use payload::{Message, Payload, PayloadKind, PayloadRef};
pub use registry::SubscriptionId;
pub use topic::topic_matches;

/// Maximum messages held between two drains.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;
