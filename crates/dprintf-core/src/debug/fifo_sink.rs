//! Behavioural model of a dprintf request FIFO drained by debug-master
//! opcodes.

use tracing::{debug, trace};

use crate::debug::protocol::{DbgMasterRequest, DbgMasterResponse, DbgOp, RespType};
use crate::debug::script::{ReadShape, ScriptError, ScriptOp};
use crate::dprintf::{DprintfRecord, DprintfReq4};
use crate::fifo::{BoundedFifo, FifoError, FifoStatus};
use crate::{DebugPort, SinkConfig};

/// Opcode being executed by the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Execution {
    Status,
    Read {
        shape: ReadShape,
        fail_if_short: bool,
        started: bool,
        elements_left: u32,
        byte_offset: u8,
    },
}

/// Target-side interpreter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SinkState {
    Idle,
    Running(Option<Execution>),
    Terminal(RespType),
}

/// Dprintf request FIFO behind a debug-master target port.
///
/// Records enter through [`push_request`](Self::push_request) or
/// [`push_record`](Self::push_record); `status` reports the packed FIFO
/// status word and `read`/`read_err` return queued entries as 32-bit words,
/// popping each entry once fully returned.
#[derive(Debug, Clone)]
pub struct DprintfFifoSink {
    fifo: BoundedFifo<DprintfReq4>,
    state: SinkState,
    request: DbgMasterRequest,
    response: DbgMasterResponse,
}

impl Default for DprintfFifoSink {
    fn default() -> Self {
        Self::new(SinkConfig::default())
    }
}

impl DprintfFifoSink {
    /// Creates an idle sink with an empty request FIFO.
    #[must_use]
    pub fn new(config: SinkConfig) -> Self {
        Self {
            fifo: BoundedFifo::new(config.capacity),
            state: SinkState::Idle,
            request: DbgMasterRequest::idle(),
            response: DbgMasterResponse::of(RespType::Idle),
        }
    }

    /// Request-side acknowledge: true while the FIFO can take an entry.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        !self.fifo.status().full()
    }

    /// Queues one request entry.
    ///
    /// # Errors
    ///
    /// Returns [`FifoError::Overflow`] and latches the sticky flag when the
    /// FIFO is full.
    pub fn push_request(&mut self, request: DprintfReq4) -> Result<(), FifoError> {
        self.fifo.push(request)
    }

    /// Queues the four-word request of a record.
    ///
    /// # Errors
    ///
    /// Returns [`FifoError::Overflow`] when the FIFO is full.
    pub fn push_record(&mut self, record: &DprintfRecord) -> Result<(), FifoError> {
        self.push_request(record.request())
    }

    /// Request FIFO accounting.
    #[must_use]
    pub const fn status(&self) -> &FifoStatus {
        self.fifo.status()
    }

    /// Queued entries, head first.
    pub fn entries(&self) -> impl Iterator<Item = &DprintfReq4> {
        self.fifo.iter()
    }

    fn step(&mut self) -> DbgMasterResponse {
        let request = self.request;
        match self.state {
            SinkState::Idle => {
                if matches!(request.op, DbgOp::Start | DbgOp::StartClear) {
                    debug!(op = ?request.op, "sink script start");
                    self.state = SinkState::Running(None);
                    return DbgMasterResponse::of(RespType::Running);
                }
                DbgMasterResponse::of(RespType::Idle)
            }
            SinkState::Terminal(resp_type) => {
                if request.op == DbgOp::Idle {
                    self.state = SinkState::Idle;
                    return DbgMasterResponse::of(RespType::Idle);
                }
                DbgMasterResponse::of(resp_type)
            }
            SinkState::Running(_) if matches!(request.op, DbgOp::Start | DbgOp::StartClear) => {
                self.state = SinkState::Running(None);
                DbgMasterResponse::of(RespType::Running)
            }
            SinkState::Running(Some(execution)) => self.execute(execution),
            SinkState::Running(None) => self.accept(request),
        }
    }

    fn accept(&mut self, request: DbgMasterRequest) -> DbgMasterResponse {
        if !request.op.carries_data() {
            return DbgMasterResponse::of(RespType::Running);
        }
        let bytes = request.data_bytes();
        let is_last = request.op == DbgOp::DataLast;
        match ScriptOp::decode(&bytes) {
            Ok((op, len)) => {
                trace!(%op, "sink consumed opcode");
                self.state = SinkState::Running(Some(Execution::start(op)));
                DbgMasterResponse {
                    bytes_consumed: u8::try_from(len).unwrap_or(u8::MAX),
                    ..DbgMasterResponse::of(RespType::Running)
                }
            }
            Err(_) if bytes.is_empty() && is_last => self.finish(RespType::Completed),
            Err(ScriptError::Truncated { .. }) if !is_last => {
                DbgMasterResponse::of(RespType::Running)
            }
            Err(err) => {
                debug!(%err, "sink rejected script bytes");
                self.finish(RespType::Errored)
            }
        }
    }

    fn execute(&mut self, execution: Execution) -> DbgMasterResponse {
        match execution {
            Execution::Status => {
                self.state = SinkState::Running(None);
                DbgMasterResponse {
                    bytes_valid: 4,
                    data: self.fifo.status().pack(),
                    ..DbgMasterResponse::of(RespType::Running)
                }
            }
            Execution::Read {
                shape,
                fail_if_short,
                started: false,
                ..
            } if fail_if_short && self.fifo.status().entries_full() < shape.count() => {
                self.finish(RespType::PollFailed)
            }
            Execution::Read {
                shape,
                fail_if_short,
                elements_left,
                byte_offset,
                ..
            } => {
                let Some(entry) = self.fifo.peek().copied() else {
                    // a short read ends the whole script
                    return self.finish(RespType::Completed);
                };
                let width = shape.width_bytes();
                let chunk = (width - byte_offset).min(4);
                let mut word = [0_u8; 4];
                for (index, slot) in word.iter_mut().take(usize::from(chunk)).enumerate() {
                    *slot = entry.payload_byte(usize::from(byte_offset) + index);
                }

                let byte_offset = byte_offset + chunk;
                let next = if byte_offset < width {
                    Some(Execution::Read {
                        shape,
                        fail_if_short,
                        started: true,
                        elements_left,
                        byte_offset,
                    })
                } else {
                    // whole element returned; the entry was just peeked
                    let _ = self.fifo.pop();
                    (elements_left > 1).then_some(Execution::Read {
                        shape,
                        fail_if_short,
                        started: true,
                        elements_left: elements_left - 1,
                        byte_offset: 0,
                    })
                };
                self.state = SinkState::Running(next);
                DbgMasterResponse {
                    bytes_valid: chunk,
                    data: u32::from_le_bytes(word),
                    ..DbgMasterResponse::of(RespType::Running)
                }
            }
        }
    }

    fn finish(&mut self, resp_type: RespType) -> DbgMasterResponse {
        debug!(?resp_type, "sink script finished");
        self.state = SinkState::Terminal(resp_type);
        DbgMasterResponse::of(resp_type)
    }
}

impl Execution {
    const fn start(op: ScriptOp) -> Self {
        match op {
            ScriptOp::Status => Self::Status,
            ScriptOp::Read(shape) => Self::read(shape, false),
            ScriptOp::ReadErr(shape) => Self::read(shape, true),
        }
    }

    const fn read(shape: ReadShape, fail_if_short: bool) -> Self {
        Self::Read {
            shape,
            fail_if_short,
            started: false,
            elements_left: shape.count(),
            byte_offset: 0,
        }
    }
}

impl DebugPort for DprintfFifoSink {
    fn response(&self) -> DbgMasterResponse {
        self.response
    }

    fn drive(&mut self, request: DbgMasterRequest) {
        self.request = request;
    }

    fn tick(&mut self) {
        self.response = self.step();
    }
}
