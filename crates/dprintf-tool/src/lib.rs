//! Command-line support for the dprintf golden models.

use tracing_subscriber as _;
#[cfg(test)]
use tempfile as _;

/// Debug-master op parsing.
pub mod ops;
/// Record-file loading.
pub mod records;
/// Sink simulation and reports.
pub mod simulate;
