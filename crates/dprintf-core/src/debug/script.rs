use std::fmt;

use thiserror::Error;

use crate::FaultCode;

/// Opcode byte of `status`.
pub const OPCODE_STATUS: u8 = 0x00;
/// Base opcode byte of `read`; the low six bits hold `width_bytes - 1`.
pub const OPCODE_READ_BASE: u8 = 0x40;
/// Base opcode byte of `read_err`; the low six bits hold `width_bytes - 1`.
pub const OPCODE_READ_ERR_BASE: u8 = 0x80;
/// Widest element a read may request, in bits.
pub const MAX_WIDTH_BITS: u16 = 512;
/// Most elements a read may request.
pub const MAX_COUNT: u32 = 0x1_0000;

const WIDTH_FIELD_MASK: u8 = 0x3F;
const READ_OPCODE_LEN: usize = 3;

/// Malformed debug script or script parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ScriptError {
    /// Width is not a multiple of 8 in `8..=512`.
    #[error("read width {width_bits} is not a multiple of 8 in 8..=512")]
    InvalidWidth {
        /// Requested width in bits.
        width_bits: u16,
    },
    /// Count is outside `1..=65536`.
    #[error("read count {count} is outside 1..=65536")]
    InvalidCount {
        /// Requested element count.
        count: u32,
    },
    /// Opcode byte with no assigned meaning.
    #[error("undefined opcode {opcode:#04x} at offset {offset}")]
    UndefinedOpcode {
        /// Offending byte.
        opcode: u8,
        /// Position in the script.
        offset: usize,
    },
    /// Script ends inside an opcode.
    #[error("opcode at offset {offset} needs {needed} bytes, {available} available")]
    Truncated {
        /// Position of the incomplete opcode.
        offset: usize,
        /// Bytes the opcode needs.
        needed: usize,
        /// Bytes present.
        available: usize,
    },
}

impl ScriptError {
    /// Maps the rejection to the canonical fault code surface.
    #[must_use]
    pub const fn fault_code(self) -> FaultCode {
        match self {
            Self::InvalidWidth { .. }
            | Self::InvalidCount { .. }
            | Self::UndefinedOpcode { .. }
            | Self::Truncated { .. } => FaultCode::InvalidScript,
        }
    }

    const fn at_offset(self, base: usize) -> Self {
        match self {
            Self::UndefinedOpcode { opcode, offset } => Self::UndefinedOpcode {
                opcode,
                offset: offset + base,
            },
            Self::Truncated {
                offset,
                needed,
                available,
            } => Self::Truncated {
                offset: offset + base,
                needed,
                available,
            },
            other => other,
        }
    }
}

/// Element width and count of a `read`/`read_err`, validated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ReadShape {
    width_bytes: u8,
    count: u32,
}

impl ReadShape {
    /// Validates a read of `count` elements of `width_bits` each.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::InvalidWidth`] or [`ScriptError::InvalidCount`]
    /// for parameters the opcode cannot encode.
    pub fn new(width_bits: u16, count: u32) -> Result<Self, ScriptError> {
        if width_bits == 0 || width_bits % 8 != 0 || width_bits > MAX_WIDTH_BITS {
            return Err(ScriptError::InvalidWidth { width_bits });
        }
        if count == 0 || count > MAX_COUNT {
            return Err(ScriptError::InvalidCount { count });
        }
        let width_bytes =
            u8::try_from(width_bits / 8).map_err(|_| ScriptError::InvalidWidth { width_bits })?;
        Ok(Self { width_bytes, count })
    }

    /// Element width in bytes, 1..=64.
    #[must_use]
    pub const fn width_bytes(self) -> u8 {
        self.width_bytes
    }

    /// Element width in bits.
    #[must_use]
    pub fn width_bits(self) -> u16 {
        u16::from(self.width_bytes) * 8
    }

    /// Elements requested, 1..=65536.
    #[must_use]
    pub const fn count(self) -> u32 {
        self.count
    }

    const fn encode(self, base: u8) -> [u8; READ_OPCODE_LEN] {
        let [low, high, _, _] = (self.count - 1).to_le_bytes();
        [base + (self.width_bytes - 1), low, high]
    }

    fn decode(opcode: u8, low: u8, high: u8) -> Self {
        Self {
            width_bytes: (opcode & WIDTH_FIELD_MASK) + 1,
            count: u32::from(u16::from_le_bytes([low, high])) + 1,
        }
    }
}

/// One debug-master opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ScriptOp {
    /// Return the packed FIFO status word.
    Status,
    /// Read up to `count` elements; stops quietly when data runs out.
    Read(ReadShape),
    /// Read `count` elements; fails the poll when fewer are available.
    ReadErr(ReadShape),
}

impl ScriptOp {
    /// Builds a validated `read`.
    ///
    /// # Errors
    ///
    /// See [`ReadShape::new`].
    pub fn read(width_bits: u16, count: u32) -> Result<Self, ScriptError> {
        ReadShape::new(width_bits, count).map(Self::Read)
    }

    /// Builds a validated `read_err`.
    ///
    /// # Errors
    ///
    /// See [`ReadShape::new`].
    pub fn read_err(width_bits: u16, count: u32) -> Result<Self, ScriptError> {
        ReadShape::new(width_bits, count).map(Self::ReadErr)
    }

    /// Encoded length in bytes.
    #[must_use]
    pub const fn encoded_len(self) -> usize {
        match self {
            Self::Status => 1,
            Self::Read(_) | Self::ReadErr(_) => READ_OPCODE_LEN,
        }
    }

    /// Appends the encoded opcode to `out`.
    pub fn encode_into(self, out: &mut Vec<u8>) {
        match self {
            Self::Status => out.push(OPCODE_STATUS),
            Self::Read(shape) => out.extend_from_slice(&shape.encode(OPCODE_READ_BASE)),
            Self::ReadErr(shape) => out.extend_from_slice(&shape.encode(OPCODE_READ_ERR_BASE)),
        }
    }

    /// Encoded length implied by an opcode byte, `None` when undefined.
    #[must_use]
    pub const fn len_of_opcode(opcode: u8) -> Option<usize> {
        match opcode {
            OPCODE_STATUS => Some(1),
            0x40..=0xBF => Some(READ_OPCODE_LEN),
            _ => None,
        }
    }

    /// Decodes the opcode at the front of `bytes`, returning it with its
    /// encoded length.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::UndefinedOpcode`] for an unassigned opcode byte
    /// and [`ScriptError::Truncated`] when `bytes` ends inside the opcode.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize), ScriptError> {
        let Some(&opcode) = bytes.first() else {
            return Err(ScriptError::Truncated {
                offset: 0,
                needed: 1,
                available: 0,
            });
        };
        let needed = Self::len_of_opcode(opcode)
            .ok_or(ScriptError::UndefinedOpcode { opcode, offset: 0 })?;
        let truncated = ScriptError::Truncated {
            offset: 0,
            needed,
            available: bytes.len(),
        };
        let op = match bytes {
            [OPCODE_STATUS, ..] => Self::Status,
            [op @ 0x40..=0x7F, low, high, ..] => Self::Read(ReadShape::decode(*op, *low, *high)),
            [op @ 0x80..=0xBF, low, high, ..] => {
                Self::ReadErr(ReadShape::decode(*op, *low, *high))
            }
            _ => return Err(truncated),
        };
        Ok((op, needed))
    }
}

impl fmt::Display for ScriptOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status => f.write_str("status"),
            Self::Read(shape) => write!(f, "read:{}:{}", shape.width_bits(), shape.count()),
            Self::ReadErr(shape) => {
                write!(f, "read_err:{}:{}", shape.width_bits(), shape.count())
            }
        }
    }
}

/// Ordered list of opcodes run as one debug-master session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DebugScript {
    ops: Vec<ScriptOp>,
}

impl DebugScript {
    /// Empty script.
    #[must_use]
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Appends an opcode.
    pub fn push(&mut self, op: ScriptOp) {
        self.ops.push(op);
    }

    /// Appends an opcode, builder style.
    #[must_use]
    pub fn with(mut self, op: ScriptOp) -> Self {
        self.ops.push(op);
        self
    }

    /// Opcodes in execution order.
    #[must_use]
    pub fn ops(&self) -> &[ScriptOp] {
        &self.ops
    }

    /// Encodes the whole script.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.ops.iter().map(|op| op.encoded_len()).sum());
        for op in &self.ops {
            op.encode_into(&mut bytes);
        }
        bytes
    }

    /// Decodes a complete script.
    ///
    /// # Errors
    ///
    /// Returns the first [`ScriptError`] met, with offsets relative to the
    /// start of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, ScriptError> {
        let mut ops = Vec::new();
        let mut offset = 0;
        while offset < bytes.len() {
            let (op, len) =
                ScriptOp::decode(&bytes[offset..]).map_err(|err| err.at_offset(offset))?;
            ops.push(op);
            offset += len;
        }
        Ok(Self { ops })
    }
}

impl FromIterator<ScriptOp> for DebugScript {
    fn from_iter<I: IntoIterator<Item = ScriptOp>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}
