//! Built-in subscribers.

use std::sync::Arc;

use tracing::debug;

use crate::bus::MessageBus;
use crate::events::topics;
use crate::host::ScriptHost;
use crate::registry::SubscriptionId;

/// Subscribe the loopback handler: every `bus/ping` is re-posted as
/// `bus/echo` with the same text bytes.
///
/// Only text payloads are read; anything else echoes as `""`. The handler
/// holds a weak reference, so it does not keep the bus alive.
pub fn install_echo<H: ScriptHost>(bus: &Arc<MessageBus<H>>) -> SubscriptionId {
    let weak = Arc::downgrade(bus);
    let id = bus.subscribe_native(topics::BUS_PING, move |_, _, payload| {
        if let Some(bus) = weak.upgrade() {
            bus.post(topics::BUS_ECHO, payload.as_bytes().unwrap_or_default());
        }
    });
    debug!(id = %id, "Echo subscriber installed");
    id
}
