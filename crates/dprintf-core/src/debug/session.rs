use std::collections::VecDeque;

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::debug::protocol::{DbgMasterRequest, DbgOp, RespType, MAX_REQUEST_BYTES};
use crate::debug::script::DebugScript;
use crate::{DebugPort, FaultCode, SessionConfig};

/// Final result of one script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Completion {
    /// Target reported `completed`.
    Ok,
    /// Target reported `errored`.
    Errored,
    /// A `read_err` found too little data.
    PollFailed,
    /// Session ended on a non-terminal response, usually budget exhaustion.
    Unexpected,
}

impl Completion {
    /// Maps the last observed response type.
    #[must_use]
    pub const fn from_resp_type(resp_type: RespType) -> Self {
        match resp_type {
            RespType::Completed => Self::Ok,
            RespType::Errored => Self::Errored,
            RespType::PollFailed => Self::PollFailed,
            RespType::Idle | RespType::Running => Self::Unexpected,
        }
    }

    /// True for [`Completion::Ok`].
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Fault code of a non-success completion.
    #[must_use]
    pub const fn fault_code(self) -> Option<FaultCode> {
        match self {
            Self::Ok => None,
            Self::Errored => Some(FaultCode::Errored),
            Self::PollFailed => Some(FaultCode::PollFailed),
            Self::Unexpected => Some(FaultCode::Unexpected),
        }
    }

    /// Lower-case name used in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Errored => "errored",
            Self::PollFailed => "poll_failed",
            Self::Unexpected => "unexpected",
        }
    }
}

/// Session could not be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SessionError {
    /// Target was not idle when the session began.
    #[error("debug target not idle (response {observed:?})")]
    NotIdle {
        /// Response type seen at start.
        observed: RespType,
    },
}

impl SessionError {
    /// Maps the failure to the canonical fault code surface.
    #[must_use]
    pub const fn fault_code(self) -> FaultCode {
        match self {
            Self::NotIdle { .. } => FaultCode::NotIdle,
        }
    }
}

/// Result of a session that ran.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SessionOutcome {
    /// Mapped final response type.
    pub completion: Completion,
    /// Response words in arrival order, masked to their valid bytes.
    pub data_returned: Vec<u32>,
    /// Ticks driven, including start and finishing pulses.
    pub ticks: u64,
}

/// One script run against one debug port.
///
/// The session borrows the port exclusively and is consumed by
/// [`run`](Self::run).
#[derive(Debug)]
pub struct DebugMasterSession<'p, P: DebugPort + ?Sized> {
    port: &'p mut P,
    config: SessionConfig,
    bytes_to_run: VecDeque<u8>,
    data_returned: Vec<u32>,
    ticks: u64,
    budget_left: u32,
}

impl<'p, P: DebugPort + ?Sized> DebugMasterSession<'p, P> {
    /// Prepares a session; nothing is driven until [`run`](Self::run).
    pub fn new(port: &'p mut P, config: SessionConfig) -> Self {
        Self {
            port,
            config,
            bytes_to_run: VecDeque::new(),
            data_returned: Vec::new(),
            ticks: 0,
            budget_left: config.tick_budget,
        }
    }

    /// Runs encoded script bytes to completion.
    ///
    /// `idle_policy` is sampled once at start and again after every script
    /// byte the target consumes; a non-zero answer inserts that many idle
    /// pulses before the next data request. Idle pulses do not use budget.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotIdle`] without driving the port when the
    /// target is not idle. Every other outcome is reported through
    /// [`SessionOutcome::completion`].
    pub fn run(
        mut self,
        script: &[u8],
        mut idle_policy: impl FnMut() -> u32,
    ) -> Result<SessionOutcome, SessionError> {
        let observed = self.port.response().resp_type;
        if observed != RespType::Idle {
            warn!(?observed, "debug target not idle, session refused");
            return Err(SessionError::NotIdle { observed });
        }

        debug!(
            script_len = script.len(),
            budget = self.config.tick_budget,
            "debug master session start"
        );
        self.bytes_to_run.extend(script.iter().copied());
        self.pulse(DbgMasterRequest {
            op: DbgOp::StartClear,
            num_data_valid: 0,
            data: 0,
        });
        self.pulse(DbgMasterRequest::idle());

        let mut idle_count = idle_policy();
        while self.budget_left > 0 {
            let response = self.port.response();
            trace!(
                tick = self.ticks,
                resp_type = ?response.resp_type,
                bytes_consumed = response.bytes_consumed,
                bytes_valid = response.bytes_valid,
                data = response.data,
                "response"
            );
            if let Some(word) = response.valid_data() {
                self.data_returned.push(word);
            }
            if response.resp_type != RespType::Running {
                break;
            }

            for _ in 0..response.bytes_consumed {
                self.bytes_to_run.pop_front();
                idle_count = idle_policy();
            }

            if idle_count > 0 {
                self.pulse(DbgMasterRequest {
                    op: DbgOp::Idle,
                    num_data_valid: idle_pulse_count(idle_count),
                    data: self.config.idle_sentinel,
                });
                idle_count -= 1;
                continue;
            }

            self.pulse(self.next_data_request());
            self.budget_left -= 1;
        }

        let final_type = self.port.response().resp_type;
        self.pulse(DbgMasterRequest::idle());

        let completion = Completion::from_resp_type(final_type);
        debug!(
            ?completion,
            words = self.data_returned.len(),
            ticks = self.ticks,
            "debug master session finished"
        );
        Ok(SessionOutcome {
            completion,
            data_returned: self.data_returned,
            ticks: self.ticks,
        })
    }

    fn next_data_request(&self) -> DbgMasterRequest {
        let mut bytes = [0_u8; 8];
        let mut valid = 0_u8;
        for (slot, byte) in bytes
            .iter_mut()
            .zip(&self.bytes_to_run)
            .take(usize::from(MAX_REQUEST_BYTES))
        {
            *slot = *byte;
            valid += 1;
        }
        let op = if self.bytes_to_run.len() > usize::from(MAX_REQUEST_BYTES) {
            DbgOp::Data
        } else {
            DbgOp::DataLast
        };
        DbgMasterRequest {
            op,
            num_data_valid: valid,
            data: u64::from_le_bytes(bytes),
        }
    }

    fn pulse(&mut self, request: DbgMasterRequest) {
        self.port.drive(request);
        self.port.tick();
        self.ticks += 1;
    }
}

/// Idle pulses carry the low three bits of the pending idle count.
#[allow(clippy::cast_possible_truncation)]
const fn idle_pulse_count(idle_count: u32) -> u8 {
    (idle_count & 7) as u8
}

/// Runs `script` against `port` with no inter-data idle insertion.
///
/// # Errors
///
/// Returns [`SessionError::NotIdle`] when the target is not idle.
pub fn invoke_script<P: DebugPort + ?Sized>(
    port: &mut P,
    config: SessionConfig,
    script: &DebugScript,
) -> Result<SessionOutcome, SessionError> {
    DebugMasterSession::new(port, config).run(&script.encode(), || 0)
}
