//! Host-facing configuration and the register-port contract driven by the
//! debug master.

use crate::{DbgMasterRequest, DbgMasterResponse};

/// Default budget of data ticks per session.
pub const DEFAULT_TICK_BUDGET: u32 = 1000;

/// Data word driven alongside inter-data idle pulses.
pub const DEFAULT_IDLE_SENTINEL: u64 = 0xDEAD_BEEF;

/// Default request FIFO depth of the dprintf sink.
pub const DEFAULT_SINK_CAPACITY: u32 = 515;

/// Per-session debug-master settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SessionConfig {
    /// Data ticks allowed before the session gives up waiting.
    pub tick_budget: u32,
    /// Data word carried by inter-data idle pulses.
    pub idle_sentinel: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_budget: DEFAULT_TICK_BUDGET,
            idle_sentinel: DEFAULT_IDLE_SENTINEL,
        }
    }
}

/// Dprintf FIFO sink settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SinkConfig {
    /// Request FIFO depth in entries.
    pub capacity: u32,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_SINK_CAPACITY,
        }
    }
}

/// Register-level debug target driven once per tick.
///
/// The request set by [`drive`](Self::drive) is held until changed and is
/// sampled by the target on each [`tick`](Self::tick); the response becomes
/// visible after the tick.
pub trait DebugPort {
    /// Response registers as of the last tick.
    fn response(&self) -> DbgMasterResponse;

    /// Sets the request registers for the next tick.
    fn drive(&mut self, request: DbgMasterRequest);

    /// Advances the target by one clock.
    fn tick(&mut self);
}
