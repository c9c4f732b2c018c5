//! Fan-out over independent queues
//!
//! A [`ShardedQueue`] spreads insertions over several queues so producers
//! contend on several locks instead of one. Each shard keeps FIFO order on its
//! own; there is no ordering or atomicity across shards. The usual pattern is
//! one consumer per shard:
//!
//! ```rust
//! use nqueue::ShardedQueue;
//! use std::thread;
//!
//! let queues: ShardedQueue<u64> = ShardedQueue::new(4);
//!
//! let total: u64 = thread::scope(|s| {
//!     let consumers: Vec<_> = queues
//!         .shards()
//!         .iter()
//!         .map(|shard| {
//!             s.spawn(move || {
//!                 let mut sum = 0;
//!                 let _ = shard.dequeue_func(|v, _| {
//!                     sum += v;
//!                     true
//!                 });
//!                 sum
//!             })
//!         })
//!         .collect();
//!
//!     for i in 1..=1000 {
//!         queues.enqueue(i).unwrap();
//!     }
//!     queues.close();
//!
//!     consumers.into_iter().map(|c| c.join().unwrap()).sum()
//! });
//! assert_eq!(total, 500_500);
//! ```

use core::fmt;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicUsize, Ordering};

use super::{Dequeued, NQueue, Queue};
use crate::config::QueueConfig;
use crate::util::CachePadded;
use crate::Result;

/// A fixed set of independent queues with round-robin insertion
pub struct ShardedQueue<T, Q = NQueue<T>> {
    shards: Box<[Q]>,
    enqueue_cursor: CachePadded<AtomicUsize>,
    dequeue_cursor: CachePadded<AtomicUsize>,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T> ShardedQueue<T> {
    /// Create `shards` linked queues with the default configuration
    ///
    /// # Panics
    ///
    /// Panics if `shards` is 0
    pub fn new(shards: usize) -> Self {
        Self::with_config(shards, QueueConfig::default())
    }

    /// Create `shards` linked queues sharing one configuration
    ///
    /// # Panics
    ///
    /// Panics if `shards` is 0
    pub fn with_config(shards: usize, config: QueueConfig) -> Self {
        Self::from_shards((0..shards).map(|_| NQueue::with_config(config)).collect())
    }
}

impl<T, Q> ShardedQueue<T, Q> {
    /// Build a shard set from existing queues
    ///
    /// # Panics
    ///
    /// Panics if `shards` is empty
    pub fn from_shards(shards: Vec<Q>) -> Self {
        assert!(!shards.is_empty(), "a sharded queue needs at least one shard");
        Self {
            shards: shards.into_boxed_slice(),
            enqueue_cursor: CachePadded::new(AtomicUsize::new(0)),
            dequeue_cursor: CachePadded::new(AtomicUsize::new(0)),
            _marker: PhantomData,
        }
    }

    /// Number of shards
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// The shard at `index`, wrapping around
    pub fn shard(&self, index: usize) -> &Q {
        &self.shards[index % self.shards.len()]
    }

    /// All shards, for attaching one consumer to each
    pub fn shards(&self) -> &[Q] {
        &self.shards
    }
}

impl<T, Q: Queue<T>> ShardedQueue<T, Q> {
    /// Append to the next shard in round-robin order
    ///
    /// # Errors
    ///
    /// [`Error::Closed`](crate::Error::Closed) if that shard is closed.
    pub fn enqueue(&self, value: T) -> Result<()> {
        let index = self.enqueue_cursor.fetch_add(1, Ordering::Relaxed);
        self.shard(index).enqueue(value)
    }

    /// Append to the shard selected by `key`, so equal keys keep FIFO order
    /// relative to each other
    ///
    /// # Errors
    ///
    /// [`Error::Closed`](crate::Error::Closed) if that shard is closed.
    pub fn enqueue_to(&self, key: usize, value: T) -> Result<()> {
        self.shard(key).enqueue(value)
    }

    /// Try each shard once without blocking, starting from a rotating shard
    ///
    /// `closed` is true only if every shard was closed when it was inspected.
    pub fn dequeue(&self) -> Dequeued<T> {
        let start = self.dequeue_cursor.fetch_add(1, Ordering::Relaxed);
        let mut all_closed = true;
        for offset in 0..self.shards.len() {
            let Dequeued { value, closed } = self.shard(start.wrapping_add(offset)).dequeue();
            if value.is_some() {
                return Dequeued { value, closed };
            }
            all_closed &= closed;
        }
        Dequeued::empty(all_closed)
    }

    /// Close every shard
    pub fn close(&self) {
        for shard in self.shards.iter() {
            shard.close();
        }
    }

    /// Sum of the shard counts; advisory only
    pub fn count(&self) -> i64 {
        self.shards.iter().map(|shard| shard.count()).sum()
    }

    /// Whether every shard is closed
    pub fn is_closed(&self) -> bool {
        self.shards.iter().all(|shard| shard.is_closed())
    }
}

impl<T, Q: fmt::Debug> fmt::Debug for ShardedQueue<T, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedQueue")
            .field("shards", &self.shards)
            .finish()
    }
}
