use thiserror::Error;

/// Fault classes used for aggregation and policy decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// Queue occupancy accounting violation.
    Fifo,
    /// Dprintf format program violation.
    Format,
    /// Debug script construction or decode violation.
    Script,
    /// Debug-master session could not start.
    Session,
    /// Target reported a non-success completion.
    Completion,
}

/// Stable fault taxonomy shared by the FIFO, dprintf and debug-master models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum FaultCode {
    /// Push attempted while the queue was full.
    #[error("fifo overflowed")]
    Overflowed = 0x01,
    /// Pop attempted while the queue was empty.
    #[error("fifo underflowed")]
    Underflowed = 0x02,
    /// Queue constructed or accessed outside its geometry.
    #[error("invalid fifo access")]
    InvalidFifoAccess = 0x03,
    /// Decimal directive requested a pad width of 10 or more.
    #[error("dprintf pad width out of range")]
    PadWidthOutOfRange = 0x04,
    /// Debug script opcode or parameters are malformed.
    #[error("invalid debug script")]
    InvalidScript = 0x05,
    /// Session start attempted while the target was not idle.
    #[error("debug target not idle")]
    NotIdle = 0x06,
    /// `read_err` found insufficient data.
    #[error("debug target poll failed")]
    PollFailed = 0x07,
    /// Target signalled an internal fault.
    #[error("debug target errored")]
    Errored = 0x08,
    /// Final response type was not a terminal completion.
    #[error("unexpected debug target response")]
    Unexpected = 0x09,
}

impl FaultCode {
    /// Converts a fault code to its stable byte value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a stable byte value back into a fault code.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::Overflowed),
            0x02 => Some(Self::Underflowed),
            0x03 => Some(Self::InvalidFifoAccess),
            0x04 => Some(Self::PadWidthOutOfRange),
            0x05 => Some(Self::InvalidScript),
            0x06 => Some(Self::NotIdle),
            0x07 => Some(Self::PollFailed),
            0x08 => Some(Self::Errored),
            0x09 => Some(Self::Unexpected),
            _ => None,
        }
    }

    /// Returns the aggregation class for this fault code.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::Overflowed | Self::Underflowed | Self::InvalidFifoAccess => FaultClass::Fifo,
            Self::PadWidthOutOfRange => FaultClass::Format,
            Self::InvalidScript => FaultClass::Script,
            Self::NotIdle => FaultClass::Session,
            Self::PollFailed | Self::Errored | Self::Unexpected => FaultClass::Completion,
        }
    }

    /// Faults that are contract violations by the caller rather than observed
    /// protocol outcomes.
    #[must_use]
    pub const fn is_contract_violation(self) -> bool {
        matches!(
            self,
            Self::InvalidFifoAccess | Self::PadWidthOutOfRange | Self::InvalidScript
        )
    }
}
