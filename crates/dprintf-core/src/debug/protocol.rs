//! Per-tick request/response register contract between the debug master and
//! its target.

/// Most script bytes carried by one `data`/`data_last` request.
pub const MAX_REQUEST_BYTES: u8 = 6;

/// Most response bytes carried by one response word.
pub const MAX_RESPONSE_BYTES: u8 = 4;

/// Request operation driven by the debug master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum DbgOp {
    /// No request; also the inter-data idle pulse.
    #[default]
    Idle = 0,
    /// Begin a script.
    Start = 1,
    /// Begin a script, clearing target interpreter state.
    StartClear = 2,
    /// Script bytes with more to follow.
    Data = 3,
    /// Final script bytes; zero valid bytes ends the script.
    DataLast = 4,
}

impl DbgOp {
    /// Wire value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decodes a wire value.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Idle),
            1 => Some(Self::Start),
            2 => Some(Self::StartClear),
            3 => Some(Self::Data),
            4 => Some(Self::DataLast),
            _ => None,
        }
    }

    /// True for operations that carry script bytes.
    #[must_use]
    pub const fn carries_data(self) -> bool {
        matches!(self, Self::Data | Self::DataLast)
    }
}

/// Response type reported by the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum RespType {
    /// No script active.
    #[default]
    Idle = 0,
    /// Script executing.
    Running = 1,
    /// Script finished successfully.
    Completed = 2,
    /// A `read_err` found too little data.
    PollFailed = 3,
    /// Malformed script or internal fault.
    Errored = 4,
}

impl RespType {
    /// Wire value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decodes a wire value.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Idle),
            1 => Some(Self::Running),
            2 => Some(Self::Completed),
            3 => Some(Self::PollFailed),
            4 => Some(Self::Errored),
            _ => None,
        }
    }

    /// True for the three end-of-script responses.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::PollFailed | Self::Errored)
    }
}

/// Request registers driven for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DbgMasterRequest {
    /// Operation.
    pub op: DbgOp,
    /// Valid bytes in `data` for `data`/`data_last`; idle-pulse count otherwise.
    pub num_data_valid: u8,
    /// Script bytes, byte 0 least significant.
    pub data: u64,
}

impl DbgMasterRequest {
    /// Plain idle request.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            op: DbgOp::Idle,
            num_data_valid: 0,
            data: 0,
        }
    }

    /// Script bytes carried by a `data`/`data_last` request, up to
    /// [`MAX_REQUEST_BYTES`].
    #[must_use]
    pub fn data_bytes(&self) -> Vec<u8> {
        if !self.op.carries_data() {
            return Vec::new();
        }
        let valid = usize::from(self.num_data_valid.min(MAX_REQUEST_BYTES));
        self.data.to_le_bytes()[..valid].to_vec()
    }
}

/// Response registers sampled after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DbgMasterResponse {
    /// Response type.
    pub resp_type: RespType,
    /// Script bytes the target took from the request this tick.
    pub bytes_consumed: u8,
    /// Valid low bytes of `data`, 0..=4.
    pub bytes_valid: u8,
    /// Returned data, low bytes significant.
    pub data: u32,
}

impl DbgMasterResponse {
    /// Response of the given type with no data or consumption.
    #[must_use]
    pub const fn of(resp_type: RespType) -> Self {
        Self {
            resp_type,
            bytes_consumed: 0,
            bytes_valid: 0,
            data: 0,
        }
    }

    /// Returned data masked to its valid bytes, or `None` when no byte is
    /// valid.
    #[must_use]
    pub const fn valid_data(&self) -> Option<u32> {
        let mask = match self.bytes_valid {
            1 => 0x0000_00FF,
            2 => 0x0000_FFFF,
            3 => 0x00FF_FFFF,
            MAX_RESPONSE_BYTES => 0xFFFF_FFFF,
            _ => return None,
        };
        Some(self.data & mask)
    }
}
