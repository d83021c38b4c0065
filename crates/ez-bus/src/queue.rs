//! # Message Queue
//!
//! Bounded FIFO shared by all producers. Overflow policy is drop-newest:
//! a push against a full queue hands the message back to the caller.

use std::collections::VecDeque;

use crate::host::ScriptHost;
use crate::payload::Message;

/// Bounded FIFO of pending messages.
pub struct MessageQueue<H: ScriptHost> {
    messages: VecDeque<Message<H>>,
    capacity: usize,
}

impl<H: ScriptHost> MessageQueue<H> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append to the tail.
    ///
    /// Returns the message untouched if the queue is full, so the caller can
    /// drop it after releasing the lock.
    pub fn push(&mut self, message: Message<H>) -> Result<(), Message<H>> {
        if self.messages.len() >= self.capacity {
            return Err(message);
        }
        self.messages.push_back(message);
        Ok(())
    }

    /// Move every pending message out, leaving the queue empty.
    pub fn drain(&mut self) -> VecDeque<Message<H>> {
        std::mem::replace(&mut self.messages, VecDeque::with_capacity(self.capacity))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
