//! Performance harness for the dprintf golden models.
//!
//! Measures how fast records can be rendered and drained through the FIFO
//! sink by debug-master sessions.
//!
//! ## Usage
//!
//! ```sh
//! cargo run -p dprintf-core --release --example performance_harness
//! ```
//!
//! ## Metrics
//!
//! - Records rendered per second
//! - Records drained per second through `read` sessions
//! - Debug-master ticks per second
//!
//! The benchmark runs on multiple threads to reflect a regression farm
//! replaying many benches at once.

#![allow(clippy::pedantic)]

use dprintf_core::{
    invoke_script, render, DebugScript, DprintfFifoSink, DprintfRecord, ScriptOp, SessionConfig,
};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

const NUM_THREADS: usize = 4;
const RECORDS_PER_SESSION: u32 = 16;
const PROGRAM: [u64; 4] = [
    0x80ff81ee82dddd83,
    0xcccc84bbbbbb85aa,
    0xd700000fa0,
    0xe3003d0900,
];

#[derive(Debug, Clone, Copy)]
struct BenchmarkResult {
    name: &'static str,
    records_per_second: f64,
    ticks_per_second: f64,
}

/// Runs `work` on every thread until `duration` passes; `work` returns
/// `(records, ticks)` per call.
fn run_threads(duration: Duration, work: fn() -> (u64, u64)) -> (u64, u64) {
    let (tx, rx) = mpsc::channel();

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|_| {
            let tx = tx.clone();
            thread::spawn(move || {
                let mut records = 0u64;
                let mut ticks = 0u64;
                let start = Instant::now();
                while start.elapsed() < duration {
                    let (r, t) = work();
                    records += r;
                    ticks += t;
                }
                tx.send((records, ticks)).ok();
            })
        })
        .collect();

    for h in handles {
        h.join().ok();
    }

    drop(tx);

    rx.into_iter()
        .fold((0, 0), |(records, ticks), (r, t)| (records + r, ticks + t))
}

fn render_once() -> (u64, u64) {
    let program: Vec<u8> = PROGRAM.iter().flat_map(|word| word.to_be_bytes()).collect();
    let output = render(&program).expect("renderable program");
    std::hint::black_box(output);
    (1, 0)
}

fn drain_once() -> (u64, u64) {
    let mut sink = DprintfFifoSink::default();
    let record = DprintfRecord::from_ints(0, &PROGRAM).expect("renderable program");
    for _ in 0..RECORDS_PER_SESSION {
        sink.push_record(&record).expect("sink has room");
    }
    let script = DebugScript::new()
        .with(ScriptOp::Status)
        .with(ScriptOp::read(256, RECORDS_PER_SESSION).expect("valid shape"));
    let outcome =
        invoke_script(&mut sink, SessionConfig::default(), &script).expect("sink starts idle");
    assert!(outcome.completion.is_ok());
    (u64::from(RECORDS_PER_SESSION), outcome.ticks)
}

fn benchmark(name: &'static str, duration: Duration, work: fn() -> (u64, u64)) -> BenchmarkResult {
    let (records, ticks) = run_threads(duration, work);
    let elapsed_secs = duration.as_secs_f64();
    BenchmarkResult {
        name,
        records_per_second: records as f64 / elapsed_secs,
        ticks_per_second: ticks as f64 / elapsed_secs,
    }
}

fn print_result(result: &BenchmarkResult) {
    println!(
        "{:<10} {:>14.0} records/s {:>14.0} ticks/s",
        result.name, result.records_per_second, result.ticks_per_second
    );
}

fn main() {
    let duration = Duration::from_secs(2);
    println!("dprintf-core performance harness ({NUM_THREADS} threads, {duration:?} each)");
    print_result(&benchmark("render", duration, render_once));
    print_result(&benchmark("drain", duration, drain_once));
}
