//! Dprintf tagged-byte format: tag table, renderer and request records.

mod record;
mod render;
mod tag;

pub use record::{
    DprintfByte, DprintfRecord, DprintfReq2, DprintfReq4, DprintfRequest, MIN_DATA_WORDS,
};
pub use render::{render, DprintfError, MISSING_OPERAND};
pub use tag::{FormatTag, TagBand, TagKind, MAX_PAD_TO, TAG_BANDS};
