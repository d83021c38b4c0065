//! # Payloads
//!
//! The closed set of shapes a message's data may take, and the ownership
//! rules attached to each.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::host::ScriptHost;

/// Builds a host value at drain time.
pub type Builder<H> = Box<
    dyn FnOnce(&H) -> Result<<H as ScriptHost>::Handle, <H as ScriptHost>::Error> + Send,
>;

/// Message data.
pub enum Payload<H: ScriptHost> {
    /// Text bytes, copied at post time. Not required to be UTF-8.
    Text(Vec<u8>),

    /// Structured record built by the producer and owned by the bus.
    /// Converted with [`ScriptHost::import`] at drain time.
    Eager(serde_json::Value),

    /// Closure invoked once, inside the delivery pump, never before.
    Deferred(Builder<H>),

    /// Host value whose ownership moved into the message.
    /// Released after the message's delivery pass, or at once if dropped.
    Foreign(H::Handle),
}

/// Discriminant of a [`Payload`], for logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    Text,
    Eager,
    Deferred,
    Foreign,
}

impl PayloadKind {
    /// Kinds whose host value is constructed by the pump.
    #[must_use]
    pub fn is_built_at_drain(self) -> bool {
        matches!(self, Self::Eager | Self::Deferred)
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Eager => "eager",
            Self::Deferred => "deferred",
            Self::Foreign => "foreign",
        };
        f.write_str(name)
    }
}

impl<H: ScriptHost> Payload<H> {
    /// Box a builder closure.
    pub fn deferred<F>(build: F) -> Self
    where
        F: FnOnce(&H) -> Result<H::Handle, H::Error> + Send + 'static,
    {
        Self::Deferred(Box::new(build))
    }

    #[must_use]
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Text(_) => PayloadKind::Text,
            Self::Eager(_) => PayloadKind::Eager,
            Self::Deferred(_) => PayloadKind::Deferred,
            Self::Foreign(_) => PayloadKind::Foreign,
        }
    }

    /// Turn the payload into the value callbacks read.
    ///
    /// Runs a deferred builder or imports an eager record. The returned
    /// value owns any host handle until it is dropped.
    pub(crate) fn materialize(self, host: &H) -> Result<Delivered<H>, H::Error> {
        match self {
            Self::Text(text) => Ok(Delivered::Text(text)),
            Self::Eager(record) => host.import(&record).map(Delivered::Value),
            Self::Deferred(build) => build(host).map(Delivered::Value),
            Self::Foreign(handle) => Ok(Delivered::Value(handle)),
        }
    }
}

impl<H: ScriptHost> fmt::Debug for Payload<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f
                .debug_tuple("Text")
                .field(&String::from_utf8_lossy(text))
                .finish(),
            Self::Eager(record) => f.debug_tuple("Eager").field(record).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
            Self::Foreign(_) => f.write_str("Foreign(..)"),
        }
    }
}

/// A queued message.
pub struct Message<H: ScriptHost> {
    pub topic: String,
    pub payload: Payload<H>,
}

impl<H: ScriptHost> Message<H> {
    pub fn new(topic: impl Into<String>, payload: Payload<H>) -> Self {
        Self {
            topic: topic.into(),
            payload,
        }
    }
}

impl<H: ScriptHost> fmt::Debug for Message<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("topic", &self.topic)
            .field("payload", &self.payload)
            .finish()
    }
}

/// A payload after materialization. Lives for one delivery pass.
pub(crate) enum Delivered<H: ScriptHost> {
    Text(Vec<u8>),
    Value(H::Handle),
}

impl<H: ScriptHost> Delivered<H> {
    pub(crate) fn view(&self) -> PayloadRef<'_, H::Handle> {
        match self {
            Self::Text(text) => PayloadRef::Text(text),
            Self::Value(handle) => PayloadRef::Value(handle),
        }
    }
}

/// What a callback sees of the message being delivered.
pub enum PayloadRef<'a, V> {
    Text(&'a [u8]),
    Value(&'a V),
}

impl<'a, V> PayloadRef<'a, V> {
    /// The raw text bytes, if this is a text payload.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match *self {
            Self::Text(text) => Some(text),
            Self::Value(_) => None,
        }
    }

    /// The text, if this is a text payload holding valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&'a str> {
        self.as_bytes()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    /// The host value, if this is not a text payload.
    #[must_use]
    pub fn as_value(&self) -> Option<&'a V> {
        match *self {
            Self::Text(_) => None,
            Self::Value(value) => Some(value),
        }
    }
}

impl<V> Clone for PayloadRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for PayloadRef<'_, V> {}

impl<V> fmt::Debug for PayloadRef<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f
                .debug_tuple("Text")
                .field(&String::from_utf8_lossy(text))
                .finish(),
            Self::Value(_) => f.write_str("Value(..)"),
        }
    }
}
