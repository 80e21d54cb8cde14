use thiserror::Error;

use crate::dprintf::tag::{FormatTag, MAX_PAD_TO};
use crate::FaultCode;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Operand byte read when the program ends before a directive's operands.
pub const MISSING_OPERAND: u8 = 0xFF;

/// Rejected dprintf format program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DprintfError {
    /// Decimal directive with a pad width of 10 or more.
    #[error("decimal tag {tag:#04x} at offset {offset} requests pad width {pad_to} (max 9)")]
    PadWidthOutOfRange {
        /// Offending tag byte.
        tag: u8,
        /// Decoded pad width.
        pad_to: u8,
        /// Position of the tag in the program.
        offset: usize,
    },
}

impl DprintfError {
    /// Maps the rejection to the canonical fault code surface.
    #[must_use]
    pub const fn fault_code(self) -> FaultCode {
        match self {
            Self::PadWidthOutOfRange { .. } => FaultCode::PadWidthOutOfRange,
        }
    }
}

/// Renders a dprintf format program into its output bytes.
///
/// # Errors
///
/// Returns [`DprintfError::PadWidthOutOfRange`] for a decimal directive whose
/// pad width exceeds [`MAX_PAD_TO`].
pub fn render(program: &[u8]) -> Result<Vec<u8>, DprintfError> {
    let mut output = Vec::with_capacity(program.len());
    let mut offset = 0;

    while let Some(&tag_byte) = program.get(offset) {
        let tag = FormatTag::classify(tag_byte);
        let num_data_bytes = usize::from(tag.num_data_bytes());
        let operands = operand_bytes(program, offset + 1, num_data_bytes);

        match tag {
            FormatTag::Nul => {}
            FormatTag::Literal(byte) => output.push(byte),
            FormatTag::Hex { nybbles } => {
                // odd widths drop the high nybble of the first operand
                let skip = usize::from(nybbles % 2);
                let digits = operands
                    .flat_map(|byte| [byte >> 4, byte & 0x0F])
                    .skip(skip)
                    .map(|nybble| HEX_DIGITS[usize::from(nybble)]);
                output.extend(digits);
            }
            FormatTag::Decimal { pad_to, .. } => {
                if pad_to > MAX_PAD_TO {
                    return Err(DprintfError::PadWidthOutOfRange {
                        tag: tag_byte,
                        pad_to,
                        offset,
                    });
                }
                let value = operands.fold(0_u32, |acc, byte| (acc << 8) | u32::from(byte));
                let width = if pad_to == 0 {
                    0
                } else {
                    usize::from(pad_to) + 1
                };
                output.extend_from_slice(format!("{value:>width$}").as_bytes());
            }
            FormatTag::End => break,
        }

        offset += 1 + num_data_bytes;
    }

    Ok(output)
}

fn operand_bytes(program: &[u8], start: usize, count: usize) -> impl Iterator<Item = u8> + '_ {
    (start..start + count).map(|index| program.get(index).copied().unwrap_or(MISSING_OPERAND))
}
