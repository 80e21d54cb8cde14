//! Occupancy accounting for fixed-capacity queues and the packed status word.

use crate::fifo::FifoError;

/// Maximum value representable by the 14-bit count fields of the status word.
pub const STATUS_COUNT_MAX: u32 = 0x3FFF;

const EMPTY_BIT: u32 = 1 << 0;
const FULL_BIT: u32 = 1 << 1;
const UNDERFLOWED_BIT: u32 = 1 << 2;
const OVERFLOWED_BIT: u32 = 1 << 3;
const ENTRIES_FULL_SHIFT: u32 = 4;
const SPACES_AVAILABLE_SHIFT: u32 = 18;

/// Occupancy of a fixed-capacity queue with sticky overflow/underflow latches.
///
/// `empty`, `full` and `spaces_available` are derived from the stored
/// occupancy on every query, so they always agree with `entries_full`.
/// The fault latches are set only by rejected [`push`](Self::push) and
/// [`pop`](Self::pop) calls and are never cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct FifoStatus {
    size: u32,
    entries_full: u32,
    overflowed: bool,
    underflowed: bool,
}

impl FifoStatus {
    /// Creates a status for a queue of `size` entries holding `entries_full`.
    ///
    /// # Errors
    ///
    /// Returns [`FifoError::OccupancyExceedsCapacity`] when
    /// `entries_full > size`.
    pub const fn new(size: u32, entries_full: u32) -> Result<Self, FifoError> {
        Self::with_faults(size, entries_full, false, false)
    }

    /// Creates an empty status for a queue of `size` entries.
    #[must_use]
    pub const fn with_capacity(size: u32) -> Self {
        Self {
            size,
            entries_full: 0,
            overflowed: false,
            underflowed: false,
        }
    }

    /// Creates a status with explicit initial fault latches.
    ///
    /// # Errors
    ///
    /// Returns [`FifoError::OccupancyExceedsCapacity`] when
    /// `entries_full > size`.
    pub const fn with_faults(
        size: u32,
        entries_full: u32,
        overflowed: bool,
        underflowed: bool,
    ) -> Result<Self, FifoError> {
        if entries_full > size {
            return Err(FifoError::OccupancyExceedsCapacity { entries_full, size });
        }
        Ok(Self {
            size,
            entries_full,
            overflowed,
            underflowed,
        })
    }

    /// Queue capacity in entries.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Current occupancy.
    #[must_use]
    pub const fn entries_full(&self) -> u32 {
        self.entries_full
    }

    /// Free entries remaining.
    #[must_use]
    pub const fn spaces_available(&self) -> u32 {
        self.size - self.entries_full
    }

    /// True when no entries are held.
    #[must_use]
    pub const fn empty(&self) -> bool {
        self.entries_full == 0
    }

    /// True when occupancy equals capacity.
    #[must_use]
    pub const fn full(&self) -> bool {
        self.entries_full == self.size
    }

    /// Sticky latch set by a push against a full queue.
    #[must_use]
    pub const fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Sticky latch set by a pop against an empty queue.
    #[must_use]
    pub const fn underflowed(&self) -> bool {
        self.underflowed
    }

    /// Accounts for one pushed entry.
    ///
    /// # Errors
    ///
    /// Returns [`FifoError::Overflow`] when the queue is full; the overflow
    /// latch is set and occupancy is unchanged.
    pub fn push(&mut self) -> Result<(), FifoError> {
        self.push_many(1)
    }

    /// Accounts for one popped entry.
    ///
    /// # Errors
    ///
    /// Returns [`FifoError::Underflow`] when the queue is empty; the
    /// underflow latch is set and occupancy is unchanged.
    pub fn pop(&mut self) -> Result<(), FifoError> {
        self.pop_many(1)
    }

    /// Accounts for `count` entries pushed in one access, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`FifoError::Overflow`] when fewer than `count` spaces are
    /// free; the overflow latch is set and occupancy is unchanged.
    pub fn push_many(&mut self, count: u32) -> Result<(), FifoError> {
        if count > self.spaces_available() {
            self.overflowed = true;
            return Err(FifoError::Overflow { size: self.size });
        }
        self.entries_full += count;
        Ok(())
    }

    /// Accounts for `count` entries popped in one access, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`FifoError::Underflow`] when fewer than `count` entries are
    /// held; the underflow latch is set and occupancy is unchanged.
    pub fn pop_many(&mut self, count: u32) -> Result<(), FifoError> {
        if count > self.entries_full {
            self.underflowed = true;
            return Err(FifoError::Underflow);
        }
        self.entries_full -= count;
        Ok(())
    }

    /// Packs the status into the 32-bit word read by the debug master.
    ///
    /// Both counts saturate at [`STATUS_COUNT_MAX`].
    #[must_use]
    pub const fn pack(&self) -> u32 {
        let mut word = 0;
        if self.empty() {
            word |= EMPTY_BIT;
        }
        if self.full() {
            word |= FULL_BIT;
        }
        if self.underflowed {
            word |= UNDERFLOWED_BIT;
        }
        if self.overflowed {
            word |= OVERFLOWED_BIT;
        }
        word |= saturate_count(self.entries_full) << ENTRIES_FULL_SHIFT;
        word |= saturate_count(self.spaces_available()) << SPACES_AVAILABLE_SHIFT;
        word
    }

    /// Decodes a packed status word.
    #[must_use]
    pub const fn unpack(word: u32) -> PackedFifoStatus {
        PackedFifoStatus::from_word(word)
    }
}

const fn saturate_count(value: u32) -> u32 {
    if value > STATUS_COUNT_MAX {
        STATUS_COUNT_MAX
    } else {
        value
    }
}

/// Field view of a packed FIFO status word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PackedFifoStatus {
    /// Bit 0.
    pub empty: bool,
    /// Bit 1.
    pub full: bool,
    /// Bit 2.
    pub underflowed: bool,
    /// Bit 3.
    pub overflowed: bool,
    /// Bits 4..=17, saturated.
    pub entries_full: u32,
    /// Bits 18..=31, saturated.
    pub spaces_available: u32,
}

impl PackedFifoStatus {
    /// Splits a status word into its fields.
    #[must_use]
    pub const fn from_word(word: u32) -> Self {
        Self {
            empty: word & EMPTY_BIT != 0,
            full: word & FULL_BIT != 0,
            underflowed: word & UNDERFLOWED_BIT != 0,
            overflowed: word & OVERFLOWED_BIT != 0,
            entries_full: (word >> ENTRIES_FULL_SHIFT) & STATUS_COUNT_MAX,
            spaces_available: (word >> SPACES_AVAILABLE_SHIFT) & STATUS_COUNT_MAX,
        }
    }

    /// Reassembles the status word.
    #[must_use]
    pub const fn to_word(self) -> u32 {
        let mut word = 0;
        if self.empty {
            word |= EMPTY_BIT;
        }
        if self.full {
            word |= FULL_BIT;
        }
        if self.underflowed {
            word |= UNDERFLOWED_BIT;
        }
        if self.overflowed {
            word |= OVERFLOWED_BIT;
        }
        word |= saturate_count(self.entries_full) << ENTRIES_FULL_SHIFT;
        word |= saturate_count(self.spaces_available) << SPACES_AVAILABLE_SHIFT;
        word
    }
}

impl From<FifoStatus> for PackedFifoStatus {
    fn from(status: FifoStatus) -> Self {
        Self::from_word(status.pack())
    }
}
