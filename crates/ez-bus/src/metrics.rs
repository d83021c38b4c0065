//! Counters for bus traffic
//!
//! Thread-safe counters bumped by producers and the delivery pump.
//! Read them with [`BusMetrics::snapshot`].
//!
//! ## Usage
//!
//! ```ignore
//! let snapshot = bus.metrics().snapshot();
//! if snapshot.dropped > 0 {
//!     tracing::warn!(dropped = snapshot.dropped, "bus queue overflowed");
//! }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Metrics collector for the message bus
#[derive(Debug, Default)]
pub struct BusMetrics {
    /// Messages accepted into the queue
    pub posted: AtomicU64,
    /// Messages discarded because the queue was full
    pub dropped: AtomicU64,
    /// Successful callback invocations
    pub delivered: AtomicU64,
    /// Script callbacks that returned an error
    pub callback_failures: AtomicU64,
    /// Eager imports or deferred builders that failed
    pub build_failures: AtomicU64,
    /// Builders skipped because nobody was subscribed
    pub builds_skipped: AtomicU64,
    /// Non-empty drain passes
    pub drains: AtomicU64,
}

impl BusMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_posted(&self) {
        self.posted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_drain(&self, report: &crate::bus::DrainReport) {
        self.drains.fetch_add(1, Ordering::Relaxed);
        self.delivered
            .fetch_add(report.deliveries as u64, Ordering::Relaxed);
        self.callback_failures
            .fetch_add(report.failures as u64, Ordering::Relaxed);
        self.build_failures
            .fetch_add(report.build_failures as u64, Ordering::Relaxed);
        self.builds_skipped
            .fetch_add(report.skipped_builds as u64, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            posted: self.posted.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            callback_failures: self.callback_failures.load(Ordering::Relaxed),
            build_failures: self.build_failures.load(Ordering::Relaxed),
            builds_skipped: self.builds_skipped.load(Ordering::Relaxed),
            drains: self.drains.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`BusMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub posted: u64,
    pub dropped: u64,
    pub delivered: u64,
    pub callback_failures: u64,
    pub build_failures: u64,
    pub builds_skipped: u64,
    pub drains: u64,
}
