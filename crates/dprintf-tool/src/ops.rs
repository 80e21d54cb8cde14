//! Command-line spelling of debug-master script operations.

use dprintf_core::{DebugScript, ScriptError, ScriptOp};
use thiserror::Error;

/// Rejected operation text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpParseError {
    /// Not `status`, `read:…` or `read_err:…`.
    #[error("unknown op `{0}` (expected status, read:<bits>:<count> or read_err:<bits>:<count>)")]
    Unknown(String),
    /// Width or count is not a decimal number.
    #[error("op `{0}`: width and count must be decimal numbers")]
    BadNumber(String),
    /// Shape outside the encodable range.
    #[error("op `{op}`: {source}")]
    Shape {
        /// Operation text.
        op: String,
        /// Shape rejection.
        #[source]
        source: ScriptError,
    },
}

/// Parses one operation: `status`, `read:<bits>:<count>` or
/// `read_err:<bits>:<count>`.
///
/// # Errors
///
/// Returns [`OpParseError`] for unknown names, non-numeric fields or shapes
/// the script encoding cannot carry.
pub fn parse_op(text: &str) -> Result<ScriptOp, OpParseError> {
    let mut fields = text.split(':');
    let name = fields.next().unwrap_or_default();
    let shape = match (name, fields.next(), fields.next(), fields.next()) {
        ("status", None, None, None) => return Ok(ScriptOp::Status),
        ("read" | "read_err", Some(width), Some(count), None) => (
            width
                .parse::<u16>()
                .map_err(|_| OpParseError::BadNumber(text.to_string()))?,
            count
                .parse::<u32>()
                .map_err(|_| OpParseError::BadNumber(text.to_string()))?,
        ),
        _ => return Err(OpParseError::Unknown(text.to_string())),
    };

    let op = if name == "read" {
        ScriptOp::read(shape.0, shape.1)
    } else {
        ScriptOp::read_err(shape.0, shape.1)
    };
    op.map_err(|source| OpParseError::Shape {
        op: text.to_string(),
        source,
    })
}

/// Parses a sequence of operations into a script.
///
/// # Errors
///
/// Returns the first operation's [`OpParseError`].
pub fn parse_script<S: AsRef<str>>(ops: &[S]) -> Result<DebugScript, OpParseError> {
    ops.iter().map(|op| parse_op(op.as_ref())).collect()
}
