use std::collections::VecDeque;

use crate::fifo::{FifoError, FifoStatus};

/// Fixed-capacity FIFO whose accounting is a [`FifoStatus`].
///
/// Rejected pushes drop the offered value and rejected pops return an
/// error; both latch the matching sticky fault and leave occupancy alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedFifo<T> {
    entries: VecDeque<T>,
    status: FifoStatus,
}

impl<T> BoundedFifo<T> {
    /// Creates an empty queue holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        Self {
            entries: VecDeque::new(),
            status: FifoStatus::with_capacity(capacity),
        }
    }

    /// Appends an entry at the tail.
    ///
    /// # Errors
    ///
    /// Returns [`FifoError::Overflow`] when the queue is full.
    pub fn push(&mut self, value: T) -> Result<(), FifoError> {
        self.status.push()?;
        self.entries.push_back(value);
        Ok(())
    }

    /// Removes the head entry.
    ///
    /// # Errors
    ///
    /// Returns [`FifoError::Underflow`] when the queue is empty.
    pub fn pop(&mut self) -> Result<T, FifoError> {
        self.status.pop()?;
        self.entries.pop_front().ok_or(FifoError::Underflow)
    }

    /// Returns the head entry without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.entries.front()
    }

    /// Iterates entries from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Current occupancy accounting.
    #[must_use]
    pub const fn status(&self) -> &FifoStatus {
        &self.status
    }

    /// Number of entries held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.status.size()
    }
}
