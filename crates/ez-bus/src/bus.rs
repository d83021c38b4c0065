//! # Message Bus
//!
//! Producers post from any thread; the engine thread drains once per tick
//! with [`MessageBus::process`].
//!
//! Every operation takes the single state lock for a bounded, callback-free
//! critical section. Anything removed from shared state (drained messages,
//! rejected messages, evicted subscriptions) is dropped after the lock is
//! released, so a handle destructor never runs under it.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::BusConfig;
use crate::error::BusError;
use crate::events::UiEvent;
use crate::host::ScriptHost;
use crate::metrics::BusMetrics;
use crate::payload::{Message, Payload, PayloadRef};
use crate::queue::MessageQueue;
use crate::registry::{Registry, SubscriptionId};

/// Outcome of one [`MessageBus::process`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Messages taken off the queue.
    pub messages: usize,
    /// Callbacks that ran to completion.
    pub deliveries: usize,
    /// Script callbacks that returned an error.
    pub failures: usize,
    /// Messages whose payload could not be built; nobody saw them.
    pub build_failures: usize,
    /// Messages dropped unbuilt because nobody was subscribed.
    pub skipped_builds: usize,
}

struct BusState<H: ScriptHost> {
    registry: Registry<H>,
    queue: MessageQueue<H>,
}

/// Topic-based publish/subscribe between native producers and a script host.
///
/// One instance per process, created by the composition root and shared as
/// `Arc<MessageBus<H>>`.
pub struct MessageBus<H: ScriptHost> {
    state: Mutex<BusState<H>>,
    config: BusConfig,
    metrics: BusMetrics,
}

impl<H: ScriptHost> Default for MessageBus<H> {
    fn default() -> Self {
        Self::build(BusConfig::default())
    }
}

impl<H: ScriptHost> MessageBus<H> {
    /// Create a bus with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bus with validated configuration.
    pub fn with_config(config: BusConfig) -> Result<Self, BusError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: BusConfig) -> Self {
        Self {
            state: Mutex::new(BusState {
                registry: Registry::new(),
                queue: MessageQueue::new(config.queue_capacity),
            }),
            config,
            metrics: BusMetrics::new(),
        }
    }

    // =========================================================================
    // SUBSCRIPTIONS
    // =========================================================================

    /// Register a script callback. The bus owns `callback` from here on.
    pub fn subscribe_script(&self, topic: &str, callback: H::Handle) -> SubscriptionId {
        let id = self.state.lock().registry.insert_script(topic, callback);
        debug!(id = %id, topic, "Script subscribe");
        id
    }

    /// Register a native callback.
    pub fn subscribe_native<F>(&self, topic: &str, callback: F) -> SubscriptionId
    where
        F: Fn(&H, &str, PayloadRef<'_, H::Handle>) + Send + Sync + 'static,
    {
        let id = self
            .state
            .lock()
            .registry
            .insert_native(topic, Arc::new(callback));
        debug!(id = %id, topic, "Native subscribe");
        id
    }

    /// Stop delivering to `id`.
    ///
    /// Returns `false` only if no entry with this id exists. Repeating the
    /// call on an inactive entry returns `true` again, unless the entry was
    /// already removed under [`UnsubscribeRelease::Immediate`](crate::UnsubscribeRelease::Immediate).
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let (evicted, active) = {
            let mut state = self.state.lock();
            let evicted = state
                .registry
                .deactivate(id, self.config.unsubscribe_release);
            (evicted, state.registry.active_count())
        };

        match evicted {
            Some(evicted) => {
                debug!(id = %id, released = evicted.len(), active, "Unsubscribed");
                drop(evicted);
                true
            }
            None => false,
        }
    }

    /// Whether at least one active subscriber matches `topic`.
    ///
    /// Lets producers skip expensive payload construction before calling
    /// [`post_deferred`](Self::post_deferred).
    #[must_use]
    pub fn has_subscribers(&self, topic: &str) -> bool {
        self.state.lock().registry.has_active(topic)
    }

    // =========================================================================
    // POSTING
    // =========================================================================

    /// Post a text message.
    ///
    /// `text` is copied as raw bytes; it does not have to be UTF-8.
    pub fn post(&self, topic: &str, text: impl AsRef<[u8]>) {
        self.enqueue(Message::new(topic, Payload::Text(text.as_ref().to_vec())));
    }

    /// Post a structured record, converted into a host value at drain time.
    pub fn post_record(&self, topic: &str, record: serde_json::Value) {
        self.enqueue(Message::new(topic, Payload::Eager(record)));
    }

    /// Serialize `value` now and post it as a record.
    ///
    /// Fails only if `value` cannot be represented as a record; a full queue
    /// still drops silently.
    pub fn post_serialized<T: Serialize + ?Sized>(
        &self,
        topic: &str,
        value: &T,
    ) -> Result<(), BusError> {
        let record = serde_json::to_value(value)?;
        self.post_record(topic, record);
        Ok(())
    }

    /// Post a message whose host value is built by `build` during delivery.
    pub fn post_deferred<F>(&self, topic: &str, build: F)
    where
        F: FnOnce(&H) -> Result<H::Handle, H::Error> + Send + 'static,
    {
        self.enqueue(Message::new(topic, Payload::deferred(build)));
    }

    /// Post a host value. Ownership moves into the bus, which releases it
    /// after delivery, or at once if the queue is full.
    pub fn post_foreign(&self, topic: &str, value: H::Handle) {
        self.enqueue(Message::new(topic, Payload::Foreign(value)));
    }

    /// Post one of the UI notifications.
    pub fn post_ui(&self, event: &UiEvent) {
        self.post(event.topic(), event.payload());
    }

    fn enqueue(&self, message: Message<H>) {
        let rejected = self.state.lock().queue.push(message);

        match rejected {
            Ok(()) => self.metrics.record_posted(),
            Err(message) => {
                self.metrics.record_dropped();
                warn!(
                    topic = %message.topic,
                    kind = %message.payload.kind(),
                    capacity = self.config.queue_capacity,
                    "Queue full, dropping message"
                );
                drop(message);
            }
        }
    }

    /// Messages waiting for the next drain.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.state.lock().queue.len()
    }

    // =========================================================================
    // DELIVERY
    // =========================================================================

    /// Drain the queue and deliver every message.
    ///
    /// Must be called from the host's own thread. Messages posted by
    /// callbacks during this call are left for the next one.
    pub fn process(&self, host: &H) -> DrainReport {
        let batch = self.state.lock().queue.drain();
        if batch.is_empty() {
            return DrainReport::default();
        }

        let mut report = DrainReport {
            messages: batch.len(),
            ..DrainReport::default()
        };
        for message in batch {
            self.deliver(host, message, &mut report);
        }

        self.metrics.record_drain(&report);
        debug!(
            messages = report.messages,
            deliveries = report.deliveries,
            failures = report.failures,
            "Drain complete"
        );
        report
    }

    fn deliver(&self, host: &H, message: Message<H>, report: &mut DrainReport) {
        let Message { topic, payload } = message;
        let recipients = self.state.lock().registry.recipients(&topic);

        let kind = payload.kind();
        if recipients.is_empty() && self.config.skip_idle_builders && kind.is_built_at_drain() {
            debug!(topic = %topic, kind = %kind, "No subscribers, skipping build");
            report.skipped_builds += 1;
            return;
        }

        let delivered = match payload.materialize(host) {
            Ok(delivered) => delivered,
            Err(e) => {
                warn!(topic = %topic, kind = %kind, error = %e, "Payload build failed");
                report.build_failures += 1;
                return;
            }
        };
        let view = delivered.view();

        for (_, callback) in &recipients.native {
            callback(host, &topic, view);
            report.deliveries += 1;
        }

        for (id, callback) in &recipients.script {
            match host.invoke(callback, &topic, view) {
                Ok(()) => report.deliveries += 1,
                Err(e) => {
                    warn!(
                        subscription = %id,
                        topic = %topic,
                        error = %e,
                        "Subscriber callback failed"
                    );
                    report.failures += 1;
                }
            }
        }

        // Last use of the payload: any host value is released here.
        drop(delivered);
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Release every subscription and every pending message.
    ///
    /// The id counter is not reset.
    pub fn clear_all(&self) {
        let (evicted, pending) = {
            let mut state = self.state.lock();
            (state.registry.evict_all(), state.queue.drain())
        };

        info!(
            subscriptions = evicted.len(),
            script_handles = evicted.script_handles(),
            pending = pending.len(),
            "Cleared all subscriptions"
        );
        drop(pending);
        drop(evicted);
    }

    #[must_use]
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    #[must_use]
    pub fn metrics(&self) -> &BusMetrics {
        &self.metrics
    }

    /// Subscription entries held, including inactive ones.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.state.lock().registry.len()
    }

    /// Subscriptions that still receive messages.
    #[must_use]
    pub fn active_subscription_count(&self) -> usize {
        self.state.lock().registry.active_count()
    }
}
