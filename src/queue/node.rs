//! Storage nodes and the pool that recycles them.
//!
//! A node is owned either by exactly one queue chain or by that queue's pool,
//! never both. The pool is a bounded lock-free array queue so producers and
//! consumers can borrow and return nodes without the queue lock; a full pool
//! simply frees the node.

use core::ptr;

use crossbeam_queue::ArrayQueue;

use crate::trace::trace;

/// A single list cell.
pub(crate) struct Node<T> {
    /// `Some` while the node is linked into a chain, `None` once retired.
    pub(crate) value: Option<T>,
    /// Next node towards the tail, null at the tail.
    pub(crate) next: *mut Node<T>,
}

// The raw `next` edge is only followed while the owning chain is locked,
// and pooled nodes always have a null edge.
unsafe impl<T: Send> Send for Node<T> {}

impl<T> Node<T> {
    fn new(value: T) -> Box<Self> {
        Box::new(Self {
            value: Some(value),
            next: ptr::null_mut(),
        })
    }
}

/// Cache of retired nodes owned by a single queue.
pub(crate) struct NodePool<T> {
    slots: Option<ArrayQueue<Box<Node<T>>>>,
}

impl<T> NodePool<T> {
    /// A pool holding at most `capacity` nodes. Zero disables pooling.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            slots: (capacity > 0).then(|| ArrayQueue::new(capacity)),
        }
    }

    /// Wrap `value` in a node, recycling one if available.
    ///
    /// The flag reports whether the node came from the pool.
    pub(crate) fn acquire(&self, value: T) -> (Box<Node<T>>, bool) {
        match self.slots.as_ref().and_then(ArrayQueue::pop) {
            Some(mut node) => {
                node.value = Some(value);
                node.next = ptr::null_mut();
                (node, true)
            }
            None => (Node::new(value), false),
        }
    }

    /// Retire a node. Any value still inside is dropped here.
    pub(crate) fn release(&self, mut node: Box<Node<T>>) {
        node.value = None;
        node.next = ptr::null_mut();
        if let Some(slots) = &self.slots {
            if slots.push(node).is_err() {
                trace!("node pool full, freeing node");
            }
        }
    }

    /// Number of nodes currently resting in the pool.
    pub(crate) fn len(&self) -> usize {
        self.slots.as_ref().map_or(0, ArrayQueue::len)
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.as_ref().map_or(0, ArrayQueue::capacity)
    }
}
