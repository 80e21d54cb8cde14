use std::collections::VecDeque;

use crate::fifo::{FifoError, FifoStatus};

/// Widest push or pop accepted in one access.
pub const MAX_BYTES_PER_ACCESS: u8 = 8;

/// Byte queue accepting and delivering up to eight bytes per access.
///
/// Multi-byte words are packed byte 0 least significant. An access that
/// cannot be satisfied in full is rejected as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteFifo {
    bytes: VecDeque<u8>,
    status: FifoStatus,
}

impl ByteFifo {
    /// Creates an empty queue of `capacity` bytes.
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        Self {
            bytes: VecDeque::new(),
            status: FifoStatus::with_capacity(capacity),
        }
    }

    /// Pushes the low `bytes_valid` bytes of `data`.
    ///
    /// # Errors
    ///
    /// Returns [`FifoError::AccessTooWide`] for more than eight bytes and
    /// [`FifoError::Overflow`] (latching the sticky flag) when fewer than
    /// `bytes_valid` spaces are free.
    pub fn push_bytes(&mut self, data: u64, bytes_valid: u8) -> Result<(), FifoError> {
        check_width(bytes_valid)?;
        self.status.push_many(u32::from(bytes_valid))?;
        self.bytes
            .extend(data.to_le_bytes().into_iter().take(usize::from(bytes_valid)));
        Ok(())
    }

    /// Returns up to eight head bytes, packed, and how many are valid.
    #[must_use]
    pub fn data_out(&self) -> (u64, u8) {
        let mut word = [0_u8; 8];
        let mut valid = 0_u8;
        for (slot, byte) in word.iter_mut().zip(self.bytes.iter()) {
            *slot = *byte;
            valid += 1;
        }
        (u64::from_le_bytes(word), valid)
    }

    /// Removes `count` head bytes and returns them packed.
    ///
    /// # Errors
    ///
    /// Returns [`FifoError::AccessTooWide`] for more than eight bytes and
    /// [`FifoError::Underflow`] (latching the sticky flag) when fewer than
    /// `count` bytes are held.
    pub fn pop_bytes(&mut self, count: u8) -> Result<u64, FifoError> {
        check_width(count)?;
        self.status.pop_many(u32::from(count))?;
        let mut word = [0_u8; 8];
        for (slot, byte) in word.iter_mut().zip(self.bytes.drain(..usize::from(count))) {
            *slot = byte;
        }
        Ok(u64::from_le_bytes(word))
    }

    /// Current occupancy accounting.
    #[must_use]
    pub const fn status(&self) -> &FifoStatus {
        &self.status
    }

    /// Number of bytes held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when no bytes are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

const fn check_width(requested: u8) -> Result<(), FifoError> {
    if requested > MAX_BYTES_PER_ACCESS {
        return Err(FifoError::AccessTooWide { requested });
    }
    Ok(())
}
