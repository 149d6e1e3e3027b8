//! Counters for bus traffic
//!
//! Every bus owns one [`BusMetrics`]. Counters are monotonic until
//! [`Bus::reset_metrics`](crate::Bus::reset_metrics) and are safe to read
//! from any thread.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::bus::FanOut;

/// Thread-safe traffic counters for one bus.
#[derive(Debug, Default)]
pub struct BusMetrics {
    /// Messages that went through fan-out
    pub published: AtomicU64,
    /// References placed in terminal inboxes
    pub deliveries: AtomicU64,
    /// References released immediately because an inbox was full
    pub dropped_full: AtomicU64,
    /// Messages that matched no terminal
    pub discarded_unrouted: AtomicU64,
    /// Posts refused because the inbound queue was full
    pub inbound_rejected: AtomicU64,
}

impl BusMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one message's fan-out.
    pub fn record_fan_out(&self, outcome: &FanOut) {
        self.published.fetch_add(1, Ordering::Relaxed);
        self.deliveries
            .fetch_add(outcome.delivered as u64, Ordering::Relaxed);
        self.dropped_full
            .fetch_add(outcome.dropped as u64, Ordering::Relaxed);
        if outcome.is_unrouted() {
            self.discarded_unrouted.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_inbound_rejected(&self) {
        self.inbound_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            published: self.published.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            dropped_full: self.dropped_full.load(Ordering::Relaxed),
            discarded_unrouted: self.discarded_unrouted.load(Ordering::Relaxed),
            inbound_rejected: self.inbound_rejected.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.published.store(0, Ordering::Relaxed);
        self.deliveries.store(0, Ordering::Relaxed);
        self.dropped_full.store(0, Ordering::Relaxed);
        self.discarded_unrouted.store(0, Ordering::Relaxed);
        self.inbound_rejected.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub published: u64,
    pub deliveries: u64,
    pub dropped_full: u64,
    pub discarded_unrouted: u64,
    pub inbound_rejected: u64,
}

impl MetricsSnapshot {
    /// Share of attempted deliveries that were dropped at a full inbox.
    pub fn drop_rate(&self) -> f64 {
        let attempted = self.dropped_full + self.deliveries;
        if attempted > 0 {
            self.dropped_full as f64 / attempted as f64
        } else {
            0.0
        }
    }
}
