//! # Subscription Registry
//!
//! Two independent maps, native and script, from subscription id to
//! `{topic, callback, active}`, plus one id counter shared by both.
//! Maps are ordered by id, so callbacks of each kind run in subscription
//! order.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::UnsubscribeRelease;
use crate::host::ScriptHost;
use crate::payload::PayloadRef;
use crate::topic::topic_matches;

/// Native subscriber: receives the host, the topic and the payload view.
pub type NativeFn<H> =
    Arc<dyn Fn(&H, &str, PayloadRef<'_, <H as ScriptHost>::Handle>) + Send + Sync>;

/// Identifier returned by `subscribe`. Never reused for the lifetime of a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Entry<C> {
    topic: String,
    callback: C,
    active: bool,
}

impl<C> Entry<C> {
    fn accepts(&self, topic: &str) -> bool {
        self.active && topic_matches(&self.topic, topic)
    }
}

/// Callbacks matching one message, copied out of the registry.
pub struct Recipients<H: ScriptHost> {
    pub native: Vec<(SubscriptionId, NativeFn<H>)>,
    pub script: Vec<(SubscriptionId, Arc<H::Handle>)>,
}

impl<H: ScriptHost> Recipients<H> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.native.is_empty() && self.script.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.native.len() + self.script.len()
    }
}

/// Entries removed from the registry, to be dropped outside the bus lock.
pub struct Evicted<H: ScriptHost> {
    native: Vec<NativeFn<H>>,
    script: Vec<Arc<H::Handle>>,
}

impl<H: ScriptHost> Evicted<H> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.native.len() + self.script.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Script callback handles among the evicted entries.
    #[must_use]
    pub fn script_handles(&self) -> usize {
        self.script.len()
    }
}

/// Native and script subscriptions.
pub struct Registry<H: ScriptHost> {
    native: BTreeMap<SubscriptionId, Entry<NativeFn<H>>>,
    script: BTreeMap<SubscriptionId, Entry<Arc<H::Handle>>>,
    next_id: u64,
}

impl<H: ScriptHost> Default for Registry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ScriptHost> Registry<H> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            native: BTreeMap::new(),
            script: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert_native(&mut self, topic: &str, callback: NativeFn<H>) -> SubscriptionId {
        let id = self.allocate_id();
        self.native.insert(
            id,
            Entry {
                topic: topic.to_owned(),
                callback,
                active: true,
            },
        );
        id
    }

    pub fn insert_script(&mut self, topic: &str, callback: H::Handle) -> SubscriptionId {
        let id = self.allocate_id();
        self.script.insert(
            id,
            Entry {
                topic: topic.to_owned(),
                callback: Arc::new(callback),
                active: true,
            },
        );
        id
    }

    /// Deactivate `id` in whichever map holds it.
    ///
    /// Returns `None` if the id is unknown. Under
    /// [`UnsubscribeRelease::Immediate`] the entry is removed and handed
    /// back, otherwise it stays in place, inactive.
    pub fn deactivate(
        &mut self,
        id: SubscriptionId,
        release: UnsubscribeRelease,
    ) -> Option<Evicted<H>> {
        let mut evicted = Evicted {
            native: Vec::new(),
            script: Vec::new(),
        };

        if self.script.contains_key(&id) {
            match release {
                UnsubscribeRelease::AtTeardown => {
                    if let Some(entry) = self.script.get_mut(&id) {
                        entry.active = false;
                    }
                }
                UnsubscribeRelease::Immediate => {
                    evicted.script.extend(self.script.remove(&id).map(|e| e.callback));
                }
            }
            return Some(evicted);
        }

        if self.native.contains_key(&id) {
            match release {
                UnsubscribeRelease::AtTeardown => {
                    if let Some(entry) = self.native.get_mut(&id) {
                        entry.active = false;
                    }
                }
                UnsubscribeRelease::Immediate => {
                    evicted.native.extend(self.native.remove(&id).map(|e| e.callback));
                }
            }
            return Some(evicted);
        }

        None
    }

    /// Whether any active entry, native or script, accepts `topic`.
    #[must_use]
    pub fn has_active(&self, topic: &str) -> bool {
        self.native.values().any(|e| e.accepts(topic))
            || self.script.values().any(|e| e.accepts(topic))
    }

    /// Copy out the active callbacks accepting `topic`.
    #[must_use]
    pub fn recipients(&self, topic: &str) -> Recipients<H> {
        Recipients {
            native: self
                .native
                .iter()
                .filter(|(_, e)| e.accepts(topic))
                .map(|(id, e)| (*id, Arc::clone(&e.callback)))
                .collect(),
            script: self
                .script
                .iter()
                .filter(|(_, e)| e.accepts(topic))
                .map(|(id, e)| (*id, Arc::clone(&e.callback)))
                .collect(),
        }
    }

    /// Remove every entry. The id counter keeps running.
    pub fn evict_all(&mut self) -> Evicted<H> {
        Evicted {
            native: std::mem::take(&mut self.native)
                .into_values()
                .map(|e| e.callback)
                .collect(),
            script: std::mem::take(&mut self.script)
                .into_values()
                .map(|e| e.callback)
                .collect(),
        }
    }

    /// Entries held, active or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.native.len() + self.script.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.native.values().filter(|e| e.active).count()
            + self.script.values().filter(|e| e.active).count()
    }
}
