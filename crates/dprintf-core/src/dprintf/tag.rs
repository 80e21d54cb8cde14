/// Tag families of the dprintf format program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum TagKind {
    /// Elided.
    Nul,
    /// Printable byte.
    Literal,
    /// Hex dump.
    Hex,
    /// Padded decimal.
    Decimal,
    /// Terminator.
    End,
}

/// Inclusive byte-value band assigned to one tag family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagBand {
    /// First tag byte in the band.
    pub first: u8,
    /// Last tag byte in the band.
    pub last: u8,
    /// Family every byte in the band belongs to.
    pub kind: TagKind,
}

/// Canonical tag bands in ascending order, covering every byte value.
pub const TAG_BANDS: &[TagBand] = &[
    TagBand {
        first: 0x00,
        last: 0x00,
        kind: TagKind::Nul,
    },
    TagBand {
        first: 0x01,
        last: 0x7F,
        kind: TagKind::Literal,
    },
    TagBand {
        first: 0x80,
        last: 0x8F,
        kind: TagKind::Hex,
    },
    TagBand {
        first: 0x90,
        last: 0xFE,
        kind: TagKind::Decimal,
    },
    TagBand {
        first: 0xFF,
        last: 0xFF,
        kind: TagKind::End,
    },
];

/// Largest accepted decimal pad width.
pub const MAX_PAD_TO: u8 = 9;

/// Decoded meaning of one tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FormatTag {
    /// `0x00`: emits nothing.
    Nul,
    /// `0x01..=0x7F`: emits the byte itself.
    Literal(u8),
    /// `0x80..=0x8F`: uppercase hex dump of `nybbles` digits.
    Hex {
        /// Digits emitted, 1..=16.
        nybbles: u8,
    },
    /// `0x90..=0xFE`: unsigned big-endian decimal.
    Decimal {
        /// Operand bytes, 1..=4.
        num_data_bytes: u8,
        /// Pad width field; output is at least `pad_to + 1` wide when non-zero.
        pad_to: u8,
    },
    /// `0xFF`: terminates the program.
    End,
}

impl FormatTag {
    /// Classifies a tag byte by band.
    #[must_use]
    pub const fn classify(tag: u8) -> Self {
        match tag {
            0x00 => Self::Nul,
            0x01..=0x7F => Self::Literal(tag),
            0x80..=0x8F => Self::Hex {
                nybbles: (tag & 0x0F) + 1,
            },
            0x90..=0xFE => Self::Decimal {
                num_data_bytes: (tag & 0x03) + 1,
                pad_to: (tag >> 2) & 0x0F,
            },
            0xFF => Self::End,
        }
    }

    /// Family of this tag.
    #[must_use]
    pub const fn kind(self) -> TagKind {
        match self {
            Self::Nul => TagKind::Nul,
            Self::Literal(_) => TagKind::Literal,
            Self::Hex { .. } => TagKind::Hex,
            Self::Decimal { .. } => TagKind::Decimal,
            Self::End => TagKind::End,
        }
    }

    /// Operand bytes consumed after the tag.
    #[must_use]
    pub const fn num_data_bytes(self) -> u8 {
        match self {
            Self::Hex { nybbles } => nybbles.div_ceil(2),
            Self::Decimal { num_data_bytes, .. } => num_data_bytes,
            Self::Nul | Self::Literal(_) | Self::End => 0,
        }
    }
}
