//! Queue construction settings.

/// Default number of retired nodes a queue keeps for reuse.
pub const DEFAULT_POOL_CAPACITY: usize = 1024;

/// Settings applied when a queue is created.
///
/// ```rust
/// use nqueue::{NQueue, QueueConfig};
///
/// let config = QueueConfig::default().pool_capacity(64).metrics_enabled(false);
/// let queue: NQueue<u32> = NQueue::with_config(config);
/// assert_eq!(queue.count(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    pub(crate) pool_capacity: usize,
    pub(crate) metrics_enabled: bool,
}

impl QueueConfig {
    /// Maximum number of retired nodes cached for reuse. `0` disables pooling.
    pub fn pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    /// Whether operation counters are recorded from the start.
    pub fn metrics_enabled(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    /// Configured pool capacity.
    pub fn get_pool_capacity(&self) -> usize {
        self.pool_capacity
    }

    /// Whether metrics start enabled.
    pub fn is_metrics_enabled(&self) -> bool {
        self.metrics_enabled
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            pool_capacity: DEFAULT_POOL_CAPACITY,
            metrics_enabled: true,
        }
    }
}
