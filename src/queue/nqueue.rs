//! Lock-based unbounded FIFO queue with broadcast close
//!
//! [`NQueue`] keeps its elements in a singly linked chain guarded by one mutex,
//! with a condition variable for consumers waiting on an empty queue.
//!
//! ## Protocol
//!
//! ```text
//! enqueue:  pool -> node   lock { closed? reject : link at tail; broadcast }
//! dequeue:  lock { unlink head }   node -> pool
//! wait:     lock { loop { unlink head | closed -> return | park } }
//! close:    lock { open = false; broadcast }
//! ```
//!
//! - Node allocation and recycling happen outside the lock
//! - Parked consumers re-check the chain after every wake, so spurious wakeups
//!   and lost races to another consumer are harmless
//! - Once closed the queue never reopens; remaining elements can still be drained
//!
//! ## Example
//!
//! ```rust
//! use nqueue::NQueue;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let queue = Arc::new(NQueue::new());
//!
//! let consumer = thread::spawn({
//!     let queue = Arc::clone(&queue);
//!     move || {
//!         let mut sum = 0;
//!         let _ = queue.dequeue_func(|value, _closed| {
//!             sum += value;
//!             true
//!         });
//!         sum
//!     }
//! });
//!
//! for i in 1..=100 {
//!     queue.enqueue(i).unwrap();
//! }
//! queue.close();
//!
//! assert_eq!(consumer.join().unwrap(), 5050);
//! ```

use core::fmt;
use core::ptr;
use std::time::{Duration, Instant};

use super::node::{Node, NodePool};
use super::{Dequeued, Queue};
use crate::config::QueueConfig;
use crate::metrics::{AtomicMetrics, MetricsCollector, QueueMetrics};
use crate::sync::{Condvar, Mutex};
use crate::trace::{debug, trace};
use crate::{Error, Result};

/// Linked storage plus the state guarded by the queue lock.
struct Chain<T> {
    head: *mut Node<T>,
    tail: *mut Node<T>,
    count: i64,
    open: bool,
    /// Consumers currently parked on the condition variable.
    waiters: usize,
}

// Nodes are reachable only through the chain, and the chain only through the
// queue mutex.
unsafe impl<T: Send> Send for Chain<T> {}

impl<T> Chain<T> {
    fn new() -> Self {
        Self {
            head: ptr::null_mut(),
            tail: ptr::null_mut(),
            count: 0,
            open: true,
            waiters: 0,
        }
    }

    fn push_back(&mut self, node: Box<Node<T>>) {
        debug_assert!(node.next.is_null());
        let node = Box::into_raw(node);
        if self.tail.is_null() {
            self.head = node;
        } else {
            // SAFETY: a non-null tail points at the last live node of this chain.
            unsafe { (*self.tail).next = node };
        }
        self.tail = node;
        self.count += 1;
    }

    fn pop_front(&mut self) -> Option<Box<Node<T>>> {
        if self.head.is_null() {
            debug_assert_eq!(self.count, 0);
            return None;
        }
        // SAFETY: head came from Box::into_raw in push_back and is unlinked
        // exactly once, here.
        let mut node = unsafe { Box::from_raw(self.head) };
        self.head = node.next;
        if self.head.is_null() {
            self.tail = ptr::null_mut();
        }
        node.next = ptr::null_mut();
        self.count -= 1;
        Some(node)
    }

    fn is_empty(&self) -> bool {
        self.head.is_null()
    }
}

impl<T> Drop for Chain<T> {
    fn drop(&mut self) {
        while self.pop_front().is_some() {}
    }
}

/// An unbounded multi-producer, multi-consumer FIFO queue
///
/// All state changes happen under a single mutex. Consumers that find the queue
/// open and empty park on a condition variable; every insertion and
/// [`close`](NQueue::close) wakes all of them.
///
/// # Performance Characteristics
///
/// - **Enqueue**: O(1), one short critical section, no allocation when a
///   recycled node is available
/// - **Dequeue**: O(1), one short critical section
/// - **Count**: O(1), takes the lock briefly
///
/// # Examples
///
/// ```rust
/// use nqueue::NQueue;
///
/// let queue = NQueue::new();
/// for i in [1, 2, 3] {
///     queue.enqueue(i)?;
/// }
/// queue.close();
///
/// assert_eq!(queue.dequeue().value, Some(1));
/// assert_eq!(queue.count(), 2);
/// # Ok::<(), nqueue::Error>(())
/// ```
pub struct NQueue<T> {
    chain: Mutex<Chain<T>>,
    available: Condvar,
    pool: NodePool<T>,
    metrics: AtomicMetrics,
}

impl<T> NQueue<T> {
    /// Create an open, empty queue with the default configuration
    pub fn new() -> Self {
        Self::with_config(QueueConfig::default())
    }

    /// Create an open, empty queue
    pub fn with_config(config: QueueConfig) -> Self {
        Self {
            chain: Mutex::new(Chain::new()),
            available: Condvar::new(),
            pool: NodePool::new(config.pool_capacity),
            metrics: AtomicMetrics::new(config.metrics_enabled),
        }
    }

    /// Append a value at the tail
    ///
    /// # Errors
    ///
    /// [`Error::Closed`] if the queue has been closed. The value is dropped.
    pub fn enqueue(&self, value: T) -> Result<()> {
        let (node, reused) = self.pool.acquire(value);

        let mut chain = self.chain.lock();
        if !chain.open {
            drop(chain);
            self.reject(node);
            return Err(Error::Closed);
        }
        chain.push_back(node);
        if chain.waiters > 0 {
            self.available.notify_all();
        }
        drop(chain);

        self.metrics.record_nodes(u64::from(reused), u64::from(!reused));
        self.metrics.record_enqueued(1);
        Ok(())
    }

    /// Append every value from `values` under a single lock acquisition
    ///
    /// Returns how many values were appended. Either all of them are stored or,
    /// if the queue is closed, none are.
    ///
    /// # Errors
    ///
    /// [`Error::Closed`] if the queue has been closed. The values are dropped.
    pub fn enqueue_batch<I>(&self, values: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
    {
        let mut reused = 0u64;
        let nodes: Vec<Box<Node<T>>> = values
            .into_iter()
            .map(|value| {
                let (node, hit) = self.pool.acquire(value);
                reused += u64::from(hit);
                node
            })
            .collect();
        let n = nodes.len();

        let mut chain = self.chain.lock();
        if !chain.open {
            drop(chain);
            for node in nodes {
                self.reject(node);
            }
            return Err(Error::Closed);
        }
        for node in nodes {
            chain.push_back(node);
        }
        if n > 0 && chain.waiters > 0 {
            self.available.notify_all();
        }
        drop(chain);

        self.metrics.record_nodes(reused, n as u64 - reused);
        self.metrics.record_enqueued(n as u64);
        Ok(n)
    }

    fn reject(&self, node: Box<Node<T>>) {
        self.metrics.record_rejected();
        trace!("enqueue rejected, queue closed");
        self.pool.release(node);
    }

    /// Remove the head element without blocking
    ///
    /// `closed` in the result reflects the queue status at the moment of
    /// removal, so an empty open queue (`value: None, closed: false`) can be told
    /// apart from a finished one (`value: None, closed: true`).
    pub fn dequeue(&self) -> Dequeued<T> {
        let mut chain = self.chain.lock();
        let node = chain.pop_front();
        let closed = !chain.open;
        drop(chain);

        self.finish(node, closed)
    }

    /// Remove the head element, parking while the queue is open and empty
    ///
    /// Returns with `value: None, closed: true` once the queue is closed and
    /// drained; never returns an empty result for an open queue.
    pub fn dequeue_wait(&self) -> Dequeued<T> {
        let mut chain = self.chain.lock();
        loop {
            if let Some(node) = chain.pop_front() {
                let closed = !chain.open;
                drop(chain);
                return self.finish(Some(node), closed);
            }
            if !chain.open {
                return Dequeued::empty(true);
            }

            chain.waiters += 1;
            self.metrics.record_wait();
            trace!(waiters = chain.waiters, "consumer parked on empty queue");
            chain = self.available.wait(chain);
            chain.waiters -= 1;
        }
    }

    /// Like [`dequeue_wait`](NQueue::dequeue_wait), but gives up after `timeout`
    ///
    /// On expiry the result is `value: None, closed: false`.
    pub fn dequeue_wait_timeout(&self, timeout: Duration) -> Dequeued<T> {
        let deadline = Instant::now().checked_add(timeout);
        let mut chain = self.chain.lock();
        loop {
            if let Some(node) = chain.pop_front() {
                let closed = !chain.open;
                drop(chain);
                return self.finish(Some(node), closed);
            }
            if !chain.open {
                return Dequeued::empty(true);
            }

            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => timeout,
            };
            if remaining.is_zero() {
                self.metrics.record_timeout();
                trace!(?timeout, "timed wait expired");
                return Dequeued::empty(false);
            }

            chain.waiters += 1;
            self.metrics.record_wait();
            let (guard, _timed_out) = self.available.wait_for(chain, remaining);
            chain = guard;
            chain.waiters -= 1;
        }
    }

    /// Remove up to `max` elements without blocking
    pub fn dequeue_batch(&self, max: usize) -> Vec<T> {
        let mut nodes = Vec::new();
        let mut chain = self.chain.lock();
        while nodes.len() < max {
            match chain.pop_front() {
                Some(node) => nodes.push(node),
                None => break,
            }
        }
        drop(chain);

        self.metrics.record_dequeued(nodes.len() as u64);
        nodes
            .into_iter()
            .filter_map(|mut node| {
                let value = node.value.take();
                self.pool.release(node);
                value
            })
            .collect()
    }

    /// Drain the queue through `f`, in FIFO order, on the calling thread
    ///
    /// `f` receives each element and whether the queue was closed when it was
    /// removed. Returning `false` stops the drain. While the queue is open and
    /// empty the call parks, exactly like [`dequeue_wait`](NQueue::dequeue_wait).
    ///
    /// # Errors
    ///
    /// [`Error::ClosedEmpty`] once the queue is closed and drained. `Ok(())`
    /// means `f` asked to stop.
    pub fn dequeue_func<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(T, bool) -> bool,
        T: Send,
    {
        Queue::dequeue_func(self, &mut f)
    }

    /// Close the queue
    ///
    /// Later enqueues fail with [`Error::Closed`]. Elements already stored stay
    /// available, and every parked consumer is woken. Closing twice is a no-op.
    pub fn close(&self) {
        let mut chain = self.chain.lock();
        if chain.open {
            chain.open = false;
            debug!(remaining = chain.count, waiters = chain.waiters, "queue closed");
        }
        self.available.notify_all();
    }

    /// Snapshot of the number of stored elements; advisory only
    pub fn count(&self) -> i64 {
        self.chain.lock().count
    }

    /// Whether the queue currently holds no elements
    pub fn is_empty(&self) -> bool {
        self.chain.lock().is_empty()
    }

    /// Whether [`close`](NQueue::close) has been called
    pub fn is_closed(&self) -> bool {
        !self.chain.lock().open
    }

    /// Number of retired nodes waiting for reuse
    pub fn pooled_nodes(&self) -> usize {
        self.pool.len()
    }

    fn finish(&self, node: Option<Box<Node<T>>>, closed: bool) -> Dequeued<T> {
        match node {
            Some(mut node) => {
                let value = node.value.take();
                self.pool.release(node);
                self.metrics.record_dequeued(1);
                Dequeued { value, closed }
            }
            None => Dequeued::empty(closed),
        }
    }
}

impl<T> Default for NQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for NQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (count, open) = {
            let chain = self.chain.lock();
            (chain.count, chain.open)
        };
        f.debug_struct("NQueue")
            .field("count", &count)
            .field("open", &open)
            .field("pooled_nodes", &self.pool.len())
            .field("pool_capacity", &self.pool.capacity())
            .finish()
    }
}

impl<T: Send> Queue<T> for NQueue<T> {
    fn enqueue(&self, value: T) -> Result<()> {
        NQueue::enqueue(self, value)
    }

    fn dequeue(&self) -> Dequeued<T> {
        NQueue::dequeue(self)
    }

    fn dequeue_wait(&self) -> Dequeued<T> {
        NQueue::dequeue_wait(self)
    }

    fn dequeue_wait_timeout(&self, timeout: Duration) -> Dequeued<T> {
        NQueue::dequeue_wait_timeout(self, timeout)
    }

    fn close(&self) {
        NQueue::close(self)
    }

    fn count(&self) -> i64 {
        NQueue::count(self)
    }

    fn is_closed(&self) -> bool {
        NQueue::is_closed(self)
    }
}

impl<T> MetricsCollector for NQueue<T> {
    fn metrics(&self) -> QueueMetrics {
        self.metrics.snapshot()
    }

    fn reset_metrics(&self) {
        self.metrics.reset();
    }

    fn set_metrics_enabled(&self, enabled: bool) {
        self.metrics.set_enabled(enabled);
    }

    fn is_metrics_enabled(&self) -> bool {
        self.metrics.is_enabled()
    }
}
