//! Bench simulation: queue records in a FIFO sink and drain them with one
//! debug-master script.

use std::fmt;

use dprintf_core::{
    invoke_script, DebugScript, DprintfFifoSink, DprintfRecord, FifoStatus, PackedFifoStatus,
    SessionConfig, SessionError, SinkConfig,
};
use serde::Serialize;
use tracing::warn;

/// Result of one simulated bench run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    /// Completion name: `ok`, `errored`, `poll_failed` or `unexpected`.
    pub completion: &'static str,
    /// Response words in arrival order.
    pub data_returned: Vec<u32>,
    /// Ticks driven by the session.
    pub ticks: u64,
    /// Records accepted by the sink.
    pub records_queued: usize,
    /// Records refused because the sink was full.
    pub records_dropped: usize,
    /// Sink FIFO status after the run.
    pub fifo: PackedFifoStatus,
}

impl SimulationReport {
    /// Pretty-printed JSON form.
    ///
    /// # Errors
    ///
    /// Returns the serializer error, which a report of plain fields does not
    /// produce in practice.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "completion: {}", self.completion)?;
        writeln!(f, "ticks: {}", self.ticks)?;
        writeln!(
            f,
            "records: {} queued, {} dropped",
            self.records_queued, self.records_dropped
        )?;
        f.write_str("data:")?;
        for word in &self.data_returned {
            write!(f, " 0x{word:08x}")?;
        }
        writeln!(f)?;
        write!(
            f,
            "fifo: entries={} spaces={} empty={} full={} overflowed={} underflowed={}",
            self.fifo.entries_full,
            self.fifo.spaces_available,
            self.fifo.empty,
            self.fifo.full,
            self.fifo.overflowed,
            self.fifo.underflowed
        )
    }
}

/// Queues `records` in a fresh sink and runs `script` against it.
///
/// Records that do not fit are dropped, latching the sink's overflow flag.
///
/// # Errors
///
/// Returns [`SessionError`] when the session cannot start.
pub fn simulate(
    records: &[DprintfRecord],
    script: &DebugScript,
    sink_config: SinkConfig,
    session_config: SessionConfig,
) -> Result<SimulationReport, SessionError> {
    let mut sink = DprintfFifoSink::new(sink_config);
    let mut records_queued = 0;
    let mut records_dropped = 0;
    for record in records {
        match sink.push_record(record) {
            Ok(()) => records_queued += 1,
            Err(err) => {
                warn!(address = record.address(), %err, "record dropped");
                records_dropped += 1;
            }
        }
    }

    let outcome = invoke_script(&mut sink, session_config, script)?;
    let status: FifoStatus = *sink.status();
    Ok(SimulationReport {
        completion: outcome.completion.as_str(),
        data_returned: outcome.data_returned,
        ticks: outcome.ticks,
        records_queued,
        records_dropped,
        fifo: status.into(),
    })
}
