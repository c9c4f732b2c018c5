//! # nqueue
//!
//! An unbounded, closable FIFO queue for handing work between many producer and
//! consumer threads.
//!
//! ## Features
//!
//! - **Blocking and non-blocking removal**: [`NQueue::dequeue`] never waits,
//!   [`NQueue::dequeue_wait`] parks until an element arrives or the queue closes
//! - **Drain loops**: [`NQueue::dequeue_func`] feeds a callback until it declines
//!   or the queue is closed and empty
//! - **Broadcast shutdown**: [`NQueue::close`] wakes every parked consumer; the
//!   remaining elements can still be drained
//! - **Node reuse**: retired list cells are recycled through a lock-free pool
//! - **Shards**: [`ShardedQueue`] spreads producers over independent queues
//!
//! ## Quick Start
//!
//! ```rust
//! use nqueue::NQueue;
//!
//! let queue = NQueue::new();
//! queue.enqueue(42)?;
//! assert_eq!(queue.dequeue().value, Some(42));
//!
//! queue.close();
//! assert!(queue.enqueue(7).is_err());
//! assert!(queue.dequeue().is_drained());
//! # Ok::<(), nqueue::Error>(())
//! ```
//!
//! ## Thread Safety
//!
//! Every queue is `Send + Sync` when its element type is `Send`. Wrap it in an
//! `Arc` (or borrow it from a scoped thread) to share it.

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod config;
pub mod metrics;
pub mod queue;
pub mod trace;

mod sync;

pub use crate::config::QueueConfig;
pub use crate::metrics::{MetricsCollector, QueueMetrics};
pub use crate::queue::{Dequeued, NQueue, Queue, RingQueue, ShardedQueue};

/// Common utilities and helper types
pub mod util {
    use core::ops::Deref;

    /// Cache line size for alignment purposes
    pub const CACHE_LINE_SIZE: usize = 64;

    /// Pads a value to its own cache line so hot counters don't share one.
    #[repr(align(64))]
    #[derive(Debug, Default)]
    pub struct CachePadded<T> {
        value: T,
    }

    impl<T> CachePadded<T> {
        /// Create a new cache-padded value
        #[inline]
        pub const fn new(value: T) -> Self {
            Self { value }
        }

        /// Get the inner value
        #[inline]
        pub fn into_inner(self) -> T {
            self.value
        }
    }

    impl<T> Deref for CachePadded<T> {
        type Target = T;

        #[inline]
        fn deref(&self) -> &T {
            &self.value
        }
    }
}

/// Error types for queue operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The queue was closed before the value could be stored
    Closed,
    /// The queue is closed and every element has been removed
    ClosedEmpty,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Closed => write!(f, "queue is closed"),
            Error::ClosedEmpty => write!(f, "queue is closed and empty"),
        }
    }
}

impl std::error::Error for Error {}

/// Result type for queue operations
pub type Result<T> = core::result::Result<T, Error>;
