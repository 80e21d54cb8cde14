//! Golden models for dprintf logging, FIFO status accounting and the
//! debug-master protocol.

/// Fault taxonomy shared by every model.
pub mod fault;
pub use fault::{FaultClass, FaultCode};

/// Host-facing configuration and the debug port contract.
pub mod api;
pub use api::{
    DebugPort, SessionConfig, SinkConfig, DEFAULT_IDLE_SENTINEL, DEFAULT_SINK_CAPACITY,
    DEFAULT_TICK_BUDGET,
};

/// Fixed-capacity queues and the packed status word.
pub mod fifo;
pub use fifo::{
    BoundedFifo, ByteFifo, FifoError, FifoStatus, PackedFifoStatus, MAX_BYTES_PER_ACCESS,
    STATUS_COUNT_MAX,
};

/// Dprintf tag table, renderer and records.
pub mod dprintf;
pub use dprintf::{
    render, DprintfByte, DprintfError, DprintfRecord, DprintfReq2, DprintfReq4, DprintfRequest,
    FormatTag, TagBand, TagKind, MAX_PAD_TO, MIN_DATA_WORDS, MISSING_OPERAND, TAG_BANDS,
};

/// Debug-master opcodes, session driver and FIFO sink target.
pub mod debug;
pub use debug::{
    invoke_script, Completion, DbgMasterRequest, DbgMasterResponse, DbgOp, DebugMasterSession,
    DebugScript, DprintfFifoSink, ReadShape, RespType, ScriptError, ScriptOp, SessionError,
    SessionOutcome,
};

/// Maximal-length LFSR generator and validator.
pub mod lfsr;
pub use lfsr::{poly_of_taps, Lfsr, LfsrError, MaximalTaps, MAXIMAL_TAPS};

/// Clock-ratio solver and divider configuration.
pub mod clock_ratio;
pub use clock_ratio::{
    dda_of_ratio, find_closest_ratio, ClockDividerConfig, ClockRatio, DdaSettings,
};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
