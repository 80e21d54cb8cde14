//! Record files: one dprintf record per line.
//!
//! ```text
//! # address: program bytes
//! 0000: 48 69 c3 00 00 00 2a
//! 0040: 8f 0123456789abcdef
//! ```
//!
//! The address is hex (an optional `0x` prefix is accepted). Program bytes
//! are hex pairs; whitespace between them is ignored. `#` starts a comment
//! and blank lines are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use dprintf_core::{DprintfError, DprintfRecord};
use thiserror::Error;
use tracing::debug;

/// Failure to load a record file.
#[derive(Debug, Error)]
pub enum RecordFileError {
    /// File could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Line has no `ADDR:` prefix.
    #[error("line {line}: expected `ADDR: BYTES`")]
    MissingAddress {
        /// 1-indexed line number.
        line: usize,
    },
    /// Address is not a 16-bit hex value.
    #[error("line {line}: invalid address `{text}`")]
    BadAddress {
        /// 1-indexed line number.
        line: usize,
        /// Address text as written.
        text: String,
    },
    /// Program bytes are not hex pairs.
    #[error("line {line}: invalid program bytes `{text}`")]
    BadBytes {
        /// 1-indexed line number.
        line: usize,
        /// Byte text as written.
        text: String,
    },
    /// Program does not render.
    #[error("line {line}: {source}")]
    Render {
        /// 1-indexed line number.
        line: usize,
        /// Renderer rejection.
        #[source]
        source: DprintfError,
    },
}

/// Reads and parses a record file.
///
/// # Errors
///
/// Returns [`RecordFileError::Read`] when the file cannot be read, or the
/// first parse error in its contents.
pub fn load_records(path: &Path) -> Result<Vec<DprintfRecord>, RecordFileError> {
    let content = fs::read_to_string(path).map_err(|source| RecordFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_records(&content)?;
    debug!(path = %path.display(), records = records.len(), "loaded record file");
    Ok(records)
}

/// Parses record-file text.
///
/// # Errors
///
/// Returns the first malformed line's error.
pub fn parse_records(content: &str) -> Result<Vec<DprintfRecord>, RecordFileError> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let text = raw.split('#').next().unwrap_or("").trim();
            (!text.is_empty()).then_some((idx + 1, text))
        })
        .map(|(line, text)| parse_line(line, text))
        .collect()
}

fn parse_line(line: usize, text: &str) -> Result<DprintfRecord, RecordFileError> {
    let (address_text, bytes_text) = text
        .split_once(':')
        .ok_or(RecordFileError::MissingAddress { line })?;

    let address_text = address_text.trim();
    let digits = address_text
        .strip_prefix("0x")
        .or_else(|| address_text.strip_prefix("0X"))
        .unwrap_or(address_text);
    let address = u16::from_str_radix(digits, 16).map_err(|_| RecordFileError::BadAddress {
        line,
        text: address_text.to_string(),
    })?;

    let program = parse_hex_bytes(bytes_text).ok_or_else(|| RecordFileError::BadBytes {
        line,
        text: bytes_text.trim().to_string(),
    })?;

    DprintfRecord::new(address, program).map_err(|source| RecordFileError::Render { line, source })
}

/// Hex pairs with any whitespace between them; `None` for an odd digit count
/// or a non-hex character.
#[must_use]
pub fn parse_hex_bytes(text: &str) -> Option<Vec<u8>> {
    let digits: Vec<u8> = text
        .bytes()
        .filter(|byte| !byte.is_ascii_whitespace())
        .collect();
    if digits.len() % 2 != 0 || !digits.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    digits
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(pair, 16).ok()
        })
        .collect()
}
