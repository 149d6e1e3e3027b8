//! # Bounded Circular Queue
//!
//! Fixed-capacity FIFO used both as the bus inbound mailbox and as every
//! terminal inbox.
//!
//! ## Design
//!
//! - Slots live in a boxed slice allocated once at construction
//! - `front` and `back` advance modulo capacity
//! - An explicit occupancy count decides full/empty, so all `capacity` slots
//!   are usable
//! - A push into a full queue changes nothing and hands the item back

use std::fmt;
use thiserror::Error;

/// Anything that can be listed by type tag in a [`QueueDump`].
pub trait Tagged {
    /// The type tag shown for this item.
    fn tag(&self) -> &str;
}

/// Returned by [`BoundedQueue::push`] when every slot is taken.
///
/// The rejected item is returned so the caller keeps ownership of it.
#[derive(Error)]
#[error("queue is full ({capacity} slots)")]
pub struct QueueFull<T> {
    item: T,
    capacity: usize,
}

impl<T> QueueFull<T> {
    /// Take back the item that could not be queued.
    pub fn into_inner(self) -> T {
        self.item
    }

    /// Capacity of the queue that rejected the push.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> fmt::Debug for QueueFull<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueFull")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

/// Fixed-capacity circular FIFO.
pub struct BoundedQueue<T> {
    slots: Box<[Option<T>]>,
    /// Index of the oldest item.
    front: usize,
    /// Index the next push writes to.
    back: usize,
    len: usize,
}

impl<T> BoundedQueue<T> {
    /// Create a queue with `capacity` slots. The minimum capacity is 1 (clamped).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            front: 0,
            back: 0,
            len: 0,
        }
    }

    /// Append `item` at the back.
    ///
    /// # Errors
    ///
    /// Returns [`QueueFull`] carrying `item` if no slot is free; the queue is
    /// left untouched.
    pub fn push(&mut self, item: T) -> Result<(), QueueFull<T>> {
        if self.is_full() {
            return Err(QueueFull {
                item,
                capacity: self.capacity(),
            });
        }

        self.slots[self.back] = Some(item);
        self.back = (self.back + 1) % self.capacity();
        self.len += 1;
        Ok(())
    }

    /// Remove and return the oldest item.
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let item = self.slots[self.front].take();
        self.front = (self.front + 1) % self.capacity();
        self.len -= 1;
        item
    }

    /// Number of queued items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl<T: Tagged> BoundedQueue<T> {
    /// List every slot, starting at `front`, by tag or as empty.
    #[must_use]
    pub fn dump(&self) -> QueueDump {
        let capacity = self.capacity();
        let slots = (0..capacity)
            .map(|offset| {
                let index = (self.front + offset) % capacity;
                DumpSlot {
                    index,
                    tag: self.slots[index].as_ref().map(|item| item.tag().to_string()),
                }
            })
            .collect();
        QueueDump { slots }
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("capacity", &self.capacity())
            .field("len", &self.len)
            .field("front", &self.front)
            .field("back", &self.back)
            .finish()
    }
}

/// One slot in a [`QueueDump`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpSlot {
    /// Absolute slot index.
    pub index: usize,
    /// Tag of the item in the slot, `None` when empty.
    pub tag: Option<String>,
}

/// Diagnostic snapshot of a queue's slots, front first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueDump {
    pub slots: Vec<DumpSlot>,
}

impl QueueDump {
    /// Tags of occupied slots in pop order.
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        self.slots.iter().filter_map(|s| s.tag.as_deref()).collect()
    }
}

impl fmt::Display for QueueDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slot in &self.slots {
            writeln!(
                f,
                "slot {}: {}",
                slot.index,
                slot.tag.as_deref().unwrap_or("empty")
            )?;
        }
        Ok(())
    }
}
