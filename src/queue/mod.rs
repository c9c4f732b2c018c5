//! Queue implementations
//!
//! All queues here share one contract, [`Queue`]: unbounded FIFO storage, a
//! non-blocking and a blocking removal, a callback drain loop and a broadcast
//! [`close`](Queue::close).
//!
//! ## Available Queues
//!
//! - [`NQueue`]: linked chain with node reuse, the main implementation
//! - [`RingQueue`]: the same contract over a growable ring buffer
//! - [`ShardedQueue`]: a fixed set of independent queues for fan-out
//!
//! ## Reading a removal result
//!
//! | `value` | `closed` | Meaning |
//! |---------|----------|---------|
//! | `Some`  | `false`  | element removed, queue open |
//! | `Some`  | `true`   | element removed, queue closed but still draining |
//! | `None`  | `false`  | empty for now, more may arrive |
//! | `None`  | `true`   | closed and drained, nothing will ever arrive |
//!
//! ## Examples
//!
//! ```rust
//! use nqueue::queue::{NQueue, Queue, RingQueue};
//!
//! fn produce(queue: &dyn Queue<u32>) -> nqueue::Result<()> {
//!     for i in 0..3 {
//!         queue.enqueue(i)?;
//!     }
//!     queue.close();
//!     Ok(())
//! }
//!
//! let linked = NQueue::new();
//! let ring = RingQueue::new();
//! produce(&linked)?;
//! produce(&ring)?;
//! assert_eq!(linked.count(), ring.count());
//! # Ok::<(), nqueue::Error>(())
//! ```

use std::time::Duration;

use crate::{Error, Result};

mod node;
pub mod nqueue;
pub mod ring;
pub mod sharded;

// Re-export main types for convenience
pub use nqueue::NQueue;
pub use ring::RingQueue;
pub use sharded::ShardedQueue;

/// Outcome of a removal attempt
///
/// See the [module documentation](self) for how to read the two fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dequeued<T> {
    /// The removed element, if any
    pub value: Option<T>,
    /// Whether the queue was closed at the time of the attempt
    pub closed: bool,
}

impl<T> Dequeued<T> {
    pub(crate) fn empty(closed: bool) -> Self {
        Self {
            value: None,
            closed,
        }
    }

    /// An element was removed
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.value.is_some()
    }

    /// The queue is closed and nothing is left to remove
    #[inline]
    pub fn is_drained(&self) -> bool {
        self.closed && self.value.is_none()
    }

    /// Take the element, discarding the status flag
    #[inline]
    pub fn into_value(self) -> Option<T> {
        self.value
    }
}

/// The capability set shared by every queue in this crate
///
/// The trait is object safe, so callers can hold `&dyn Queue<T>` or
/// `Box<dyn Queue<T>>` and swap implementations freely.
pub trait Queue<T>: Send + Sync {
    /// Append a value; fails with [`Error::Closed`] after [`close`](Queue::close)
    fn enqueue(&self, value: T) -> Result<()>;

    /// Remove the head element without blocking
    fn dequeue(&self) -> Dequeued<T>;

    /// Remove the head element, blocking while the queue is open and empty
    fn dequeue_wait(&self) -> Dequeued<T>;

    /// Like [`dequeue_wait`](Queue::dequeue_wait) with an upper bound on the
    /// wait; an expired wait yields `value: None, closed: false`
    fn dequeue_wait_timeout(&self, timeout: Duration) -> Dequeued<T>;

    /// Stop accepting values and wake every blocked consumer
    fn close(&self);

    /// Advisory snapshot of the number of stored elements
    fn count(&self) -> i64;

    /// Whether [`close`](Queue::close) has been called
    fn is_closed(&self) -> bool;

    /// Feed elements to `f` in FIFO order until it returns `false` (`Ok(())`)
    /// or the queue is closed and drained ([`Error::ClosedEmpty`])
    ///
    /// `f` also receives whether the queue was closed when the element was
    /// removed. Blocks like [`dequeue_wait`](Queue::dequeue_wait) while the
    /// queue is open and empty.
    fn dequeue_func(&self, f: &mut dyn FnMut(T, bool) -> bool) -> Result<()> {
        loop {
            let Dequeued { value, closed } = self.dequeue_wait();
            match value {
                Some(value) => {
                    if !f(value, closed) {
                        return Ok(());
                    }
                }
                None => {
                    debug_assert!(closed, "dequeue_wait returned empty on an open queue");
                    return Err(Error::ClosedEmpty);
                }
            }
        }
    }
}


#[cfg(all(test, not(loom)))]
mod proptests;
