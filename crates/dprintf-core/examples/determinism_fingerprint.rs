//! Deterministic session fingerprint used by CI cross-host comparison.
//!
//! Queues a fixed set of records in a FIFO sink, drains them with a fixed
//! debug-master script and hashes every observable result.

#![allow(clippy::unreadable_literal)]

use dprintf_core::{
    invoke_script, Completion, DebugScript, DprintfFifoSink, DprintfRecord, Lfsr, ScriptOp,
    SessionConfig, SinkConfig,
};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;

const RECORD_PROGRAMS: [[u64; 4]; 3] = [
    [0x80ff81ee82dddd83, 0xcccc84bbbbbb85aa, 0xaaaa869999999987, 0x8888888800ff0000],
    [0xc400c401c40ac464, 0xc4ffff0000000000, 0, 0],
    [0xd700000fa0, 0xdb00009c40, 0xdf00061a80, 0xe3003d0900],
];

fn hash_bytes(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= u64::from(*byte);
        *hash = hash.wrapping_mul(0x1000_0000_01B3);
    }
}

const fn completion_tag(completion: Completion) -> u8 {
    match completion {
        Completion::Ok => 0x10,
        Completion::Errored => 0x11,
        Completion::PollFailed => 0x12,
        Completion::Unexpected => 0x13,
    }
}

fn fingerprint() -> String {
    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    let mut sink = DprintfFifoSink::new(SinkConfig { capacity: 8 });

    for (address, ints) in (0_u16..).step_by(0x40).zip(RECORD_PROGRAMS) {
        let record = DprintfRecord::from_ints(address, &ints).expect("renderable program");
        hash_bytes(&mut hash, record.output());
        sink.push_record(&record).expect("sink has room");
    }

    let script = DebugScript::new()
        .with(ScriptOp::Status)
        .with(ScriptOp::read(256, 2).expect("valid shape"))
        .with(ScriptOp::Status)
        .with(ScriptOp::read_err(64, 4).expect("valid shape"));
    let outcome =
        invoke_script(&mut sink, SessionConfig::default(), &script).expect("sink starts idle");

    hash_bytes(&mut hash, &[completion_tag(outcome.completion)]);
    hash_bytes(&mut hash, &outcome.ticks.to_le_bytes());
    for word in &outcome.data_returned {
        hash_bytes(&mut hash, &word.to_le_bytes());
    }
    hash_bytes(&mut hash, &sink.status().pack().to_le_bytes());

    let mut lfsr = Lfsr::maximal(16).expect("table entry");
    lfsr.clk(1000);
    hash_bytes(&mut hash, &lfsr.value().to_le_bytes());

    format!("{hash:016x}")
}

fn main() {
    println!("{}", fingerprint());
}
