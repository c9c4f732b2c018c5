//! Queue Metrics Module
//!
//! Operation counters for queue implementations. Recording uses relaxed atomics
//! outside the queue lock, so a snapshot taken while operations are in flight
//! is approximate.

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Snapshot of a queue's operation counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueueMetrics {
    /// Elements accepted by enqueue operations
    pub enqueued: u64,
    /// Elements handed out by removal operations
    pub dequeued: u64,
    /// Enqueue attempts refused because the queue was closed
    pub rejected: u64,
    /// Times a consumer parked on the condition variable
    pub waits: u64,
    /// Timed waits that expired without an element
    pub timeouts: u64,
    /// Insertions served by a recycled node
    pub pool_hits: u64,
    /// Insertions that had to allocate a fresh node
    pub pool_misses: u64,
}

impl QueueMetrics {
    /// Share of insertions served from the node pool, as a percentage
    pub fn pool_hit_rate(&self) -> f64 {
        let total = self.pool_hits + self.pool_misses;
        if total == 0 {
            0.0
        } else {
            (self.pool_hits as f64 / total as f64) * 100.0
        }
    }

    /// Share of enqueue attempts refused by a closed queue, as a percentage
    pub fn rejection_rate(&self) -> f64 {
        let total = self.enqueued + self.rejected;
        if total == 0 {
            0.0
        } else {
            (self.rejected as f64 / total as f64) * 100.0
        }
    }

    /// Elements accepted but not yet handed out
    pub fn in_flight(&self) -> u64 {
        self.enqueued.saturating_sub(self.dequeued)
    }
}

/// Internal atomic metrics collection
#[derive(Debug)]
pub struct AtomicMetrics {
    enabled: AtomicBool,
    enqueued: AtomicU64,
    dequeued: AtomicU64,
    rejected: AtomicU64,
    waits: AtomicU64,
    timeouts: AtomicU64,
    pool_hits: AtomicU64,
    pool_misses: AtomicU64,
}

impl AtomicMetrics {
    /// Create a recorder, enabled or not
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            enqueued: AtomicU64::new(0),
            dequeued: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            waits: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            pool_hits: AtomicU64::new(0),
            pool_misses: AtomicU64::new(0),
        }
    }

    #[inline]
    fn bump(&self, counter: &AtomicU64, by: u64) {
        if self.enabled.load(Ordering::Relaxed) {
            counter.fetch_add(by, Ordering::Relaxed);
        }
    }

    /// Record `n` accepted elements
    pub fn record_enqueued(&self, n: u64) {
        self.bump(&self.enqueued, n);
    }

    /// Record `n` removed elements
    pub fn record_dequeued(&self, n: u64) {
        self.bump(&self.dequeued, n);
    }

    /// Record an enqueue refused by a closed queue
    pub fn record_rejected(&self) {
        self.bump(&self.rejected, 1);
    }

    /// Record a consumer parking on the condition variable
    pub fn record_wait(&self) {
        self.bump(&self.waits, 1);
    }

    /// Record an expired timed wait
    pub fn record_timeout(&self) {
        self.bump(&self.timeouts, 1);
    }

    /// Record how many inserted nodes were recycled and how many allocated
    pub fn record_nodes(&self, hits: u64, misses: u64) {
        if hits > 0 {
            self.bump(&self.pool_hits, hits);
        }
        if misses > 0 {
            self.bump(&self.pool_misses, misses);
        }
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> QueueMetrics {
        QueueMetrics {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dequeued: self.dequeued.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            waits: self.waits.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            pool_hits: self.pool_hits.load(Ordering::Relaxed),
            pool_misses: self.pool_misses.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        for counter in [
            &self.enqueued,
            &self.dequeued,
            &self.rejected,
            &self.waits,
            &self.timeouts,
            &self.pool_hits,
            &self.pool_misses,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Turn recording on or off
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Whether recording is on
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

impl Default for AtomicMetrics {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Trait for data structures that support performance metrics
pub trait MetricsCollector {
    /// Get current metrics
    fn metrics(&self) -> QueueMetrics;

    /// Reset all metrics
    fn reset_metrics(&self);

    /// Enable or disable metrics collection
    fn set_metrics_enabled(&self, enabled: bool);

    /// Check if metrics collection is enabled
    fn is_metrics_enabled(&self) -> bool;
}
