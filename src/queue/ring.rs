//! Ring-buffer backed queue
//!
//! Same contract and close/wake protocol as [`NQueue`](super::NQueue), but the
//! elements live in a `VecDeque`, which amortizes allocation by growing in
//! place instead of recycling nodes.

use core::fmt;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use super::{Dequeued, Queue};
use crate::sync::{Condvar, Mutex};
use crate::trace::debug;
use crate::{Error, Result};

struct Ring<T> {
    items: VecDeque<T>,
    open: bool,
    waiters: usize,
}

/// An unbounded MPMC FIFO queue over a growable ring buffer
///
/// # Examples
///
/// ```rust
/// use nqueue::RingQueue;
///
/// let queue = RingQueue::with_capacity(16);
/// queue.enqueue("job")?;
/// assert_eq!(queue.dequeue().value, Some("job"));
/// # Ok::<(), nqueue::Error>(())
/// ```
pub struct RingQueue<T> {
    ring: Mutex<Ring<T>>,
    available: Condvar,
}

impl<T> RingQueue<T> {
    /// Create an open, empty queue
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an open, empty queue with room for `capacity` elements before
    /// the first reallocation
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ring: Mutex::new(Ring {
                items: VecDeque::with_capacity(capacity),
                open: true,
                waiters: 0,
            }),
            available: Condvar::new(),
        }
    }

    /// Append a value at the tail
    ///
    /// # Errors
    ///
    /// [`Error::Closed`] if the queue has been closed. The value is dropped.
    pub fn enqueue(&self, value: T) -> Result<()> {
        let mut ring = self.ring.lock();
        if !ring.open {
            return Err(Error::Closed);
        }
        ring.items.push_back(value);
        if ring.waiters > 0 {
            self.available.notify_all();
        }
        Ok(())
    }

    /// Remove the head element without blocking
    pub fn dequeue(&self) -> Dequeued<T> {
        let mut ring = self.ring.lock();
        Dequeued {
            value: ring.items.pop_front(),
            closed: !ring.open,
        }
    }

    /// Remove the head element, parking while the queue is open and empty
    pub fn dequeue_wait(&self) -> Dequeued<T> {
        let mut ring = self.ring.lock();
        loop {
            if let Some(value) = ring.items.pop_front() {
                return Dequeued {
                    value: Some(value),
                    closed: !ring.open,
                };
            }
            if !ring.open {
                return Dequeued::empty(true);
            }
            ring.waiters += 1;
            ring = self.available.wait(ring);
            ring.waiters -= 1;
        }
    }

    /// Like [`dequeue_wait`](RingQueue::dequeue_wait), but gives up after `timeout`
    pub fn dequeue_wait_timeout(&self, timeout: Duration) -> Dequeued<T> {
        let deadline = Instant::now().checked_add(timeout);
        let mut ring = self.ring.lock();
        loop {
            if let Some(value) = ring.items.pop_front() {
                return Dequeued {
                    value: Some(value),
                    closed: !ring.open,
                };
            }
            if !ring.open {
                return Dequeued::empty(true);
            }
            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => timeout,
            };
            if remaining.is_zero() {
                return Dequeued::empty(false);
            }
            ring.waiters += 1;
            let (guard, _) = self.available.wait_for(ring, remaining);
            ring = guard;
            ring.waiters -= 1;
        }
    }

    /// Drain the queue through `f`; see [`Queue::dequeue_func`]
    ///
    /// # Errors
    ///
    /// [`Error::ClosedEmpty`] once the queue is closed and drained.
    pub fn dequeue_func<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(T, bool) -> bool,
        T: Send,
    {
        Queue::dequeue_func(self, &mut f)
    }

    /// Close the queue and wake every parked consumer
    pub fn close(&self) {
        let mut ring = self.ring.lock();
        if ring.open {
            ring.open = false;
            debug!(remaining = ring.items.len(), "ring queue closed");
        }
        self.available.notify_all();
    }

    /// Snapshot of the number of stored elements; advisory only
    pub fn count(&self) -> i64 {
        self.ring.lock().items.len() as i64
    }

    /// Whether [`close`](RingQueue::close) has been called
    pub fn is_closed(&self) -> bool {
        !self.ring.lock().open
    }
}

impl<T> Default for RingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for RingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (count, open) = {
            let ring = self.ring.lock();
            (ring.items.len(), ring.open)
        };
        f.debug_struct("RingQueue")
            .field("count", &count)
            .field("open", &open)
            .finish()
    }
}

impl<T: Send> Queue<T> for RingQueue<T> {
    fn enqueue(&self, value: T) -> Result<()> {
        RingQueue::enqueue(self, value)
    }

    fn dequeue(&self) -> Dequeued<T> {
        RingQueue::dequeue(self)
    }

    fn dequeue_wait(&self) -> Dequeued<T> {
        RingQueue::dequeue_wait(self)
    }

    fn dequeue_wait_timeout(&self, timeout: Duration) -> Dequeued<T> {
        RingQueue::dequeue_wait_timeout(self, timeout)
    }

    fn close(&self) {
        RingQueue::close(self)
    }

    fn count(&self) -> i64 {
        RingQueue::count(self)
    }

    fn is_closed(&self) -> bool {
        RingQueue::is_closed(self)
    }
}
