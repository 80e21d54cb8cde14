//! Fixed-capacity queues sharing one occupancy accounting model.

mod byte_fifo;
mod queue;
mod status;

use thiserror::Error;

pub use byte_fifo::{ByteFifo, MAX_BYTES_PER_ACCESS};
pub use queue::BoundedFifo;
pub use status::{FifoStatus, PackedFifoStatus, STATUS_COUNT_MAX};

use crate::FaultCode;

/// Rejected queue operation or geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum FifoError {
    /// Push offered to a queue with too little space.
    #[error("push rejected: fifo of {size} entries has no room")]
    Overflow {
        /// Queue capacity.
        size: u32,
    },
    /// Pop requested from a queue with too few entries.
    #[error("pop rejected: fifo has too few entries")]
    Underflow,
    /// Status constructed with more entries than capacity.
    #[error("occupancy {entries_full} exceeds capacity {size}")]
    OccupancyExceedsCapacity {
        /// Requested occupancy.
        entries_full: u32,
        /// Queue capacity.
        size: u32,
    },
    /// Multi-byte access wider than the port.
    #[error("access of {requested} bytes exceeds the 8-byte port")]
    AccessTooWide {
        /// Bytes requested.
        requested: u8,
    },
}

impl FifoError {
    /// Maps the rejection to the canonical fault code surface.
    #[must_use]
    pub const fn fault_code(self) -> FaultCode {
        match self {
            Self::Overflow { .. } => FaultCode::Overflowed,
            Self::Underflow => FaultCode::Underflowed,
            Self::OccupancyExceedsCapacity { .. } | Self::AccessTooWide { .. } => {
                FaultCode::InvalidFifoAccess
            }
        }
    }
}
