//! Debug-master opcode protocol, session driver and FIFO sink target.

mod fifo_sink;
mod protocol;
mod script;
mod session;

pub use fifo_sink::DprintfFifoSink;
pub use protocol::{
    DbgMasterRequest, DbgMasterResponse, DbgOp, RespType, MAX_REQUEST_BYTES, MAX_RESPONSE_BYTES,
};
pub use script::{
    DebugScript, ReadShape, ScriptError, ScriptOp, MAX_COUNT, MAX_WIDTH_BITS, OPCODE_READ_BASE,
    OPCODE_READ_ERR_BASE, OPCODE_STATUS,
};
pub use session::{invoke_script, Completion, DebugMasterSession, SessionError, SessionOutcome};
