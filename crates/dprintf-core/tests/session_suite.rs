//! Debug-master sessions driven against the dprintf FIFO sink.
//!
//! Each scenario queues records, runs one script end to end and checks the
//! completion and the returned words. Scenarios within one test share a sink
//! so FIFO contents carry over the way they do on a bench.

#![allow(
    clippy::pedantic,
    clippy::nursery,
    clippy::cast_possible_truncation,
    clippy::too_many_lines
)]

use dprintf_core::{
    invoke_script, Completion, DbgMasterRequest, DbgOp, DebugMasterSession, DebugPort,
    DebugScript, DprintfFifoSink, DprintfRecord, FaultCode, FifoStatus, RespType, ScriptOp,
    SessionConfig, SessionError, SinkConfig,
};
use proptest as _;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;

const FIRST_HALF: u32 = 0x6566_6768;
const SECOND_HALF: u32 = 0x6162_6364;

fn record() -> DprintfRecord {
    DprintfRecord::new(0x0, b"abcdefghijklmnop".to_vec()).expect("printable record")
}

fn status_word(entries: u32) -> u32 {
    FifoStatus::new(515, entries).expect("within capacity").pack()
}

fn script(ops: &[&str]) -> DebugScript {
    ops.iter()
        .map(|op| match *op {
            "status" => ScriptOp::Status,
            "read:64:1" => ScriptOp::read(64, 1).expect("valid shape"),
            "read:64:2" => ScriptOp::read(64, 2).expect("valid shape"),
            "read_err:64:2" => ScriptOp::read_err(64, 2).expect("valid shape"),
            other => panic!("unknown op {other}"),
        })
        .collect()
}

fn run(sink: &mut DprintfFifoSink, ops: &[&str]) -> (Completion, Vec<u32>) {
    let outcome =
        invoke_script(sink, SessionConfig::default(), &script(ops)).expect("sink idle");
    (outcome.completion, outcome.data_returned)
}

#[test]
fn bench_regression_sequence() {
    let mut sink = DprintfFifoSink::default();

    sink.push_record(&record()).expect("room");
    assert_eq!(run(&mut sink, &["status"]), (Completion::Ok, vec![status_word(1)]));

    sink.push_record(&record()).expect("room");
    assert_eq!(
        run(&mut sink, &["status", "status", "status", "status"]),
        (Completion::Ok, vec![status_word(2); 4])
    );

    assert_eq!(
        run(&mut sink, &["read:64:1", "status"]),
        (
            Completion::Ok,
            vec![FIRST_HALF, SECOND_HALF, status_word(1)]
        )
    );

    // second element is missing, so the status opcode never runs
    assert_eq!(
        run(&mut sink, &["read:64:2", "status"]),
        (Completion::Ok, vec![FIRST_HALF, SECOND_HALF])
    );

    assert_eq!(
        run(&mut sink, &["read:64:2", "status"]),
        (Completion::Ok, vec![])
    );

    let (completion, data) = run(&mut sink, &["read_err:64:2", "status"]);
    assert_eq!(completion, Completion::PollFailed);
    assert_eq!(completion.fault_code(), Some(FaultCode::PollFailed));
    assert!(data.is_empty());

    assert_eq!(sink.response().resp_type, RespType::Idle);
}

#[test]
fn read_err_with_enough_entries_behaves_like_read() {
    let mut sink = DprintfFifoSink::default();
    sink.push_record(&record()).expect("room");
    sink.push_record(&record()).expect("room");
    assert_eq!(
        run(&mut sink, &["read_err:64:2", "status"]),
        (
            Completion::Ok,
            vec![FIRST_HALF, SECOND_HALF, FIRST_HALF, SECOND_HALF, status_word(0)]
        )
    );
    assert!(sink.status().empty());
}

#[test]
fn busy_target_is_refused_and_queue_is_untouched() {
    let mut sink = DprintfFifoSink::default();
    sink.push_record(&record()).expect("room");

    // leave the sink mid-script
    sink.drive(DbgMasterRequest {
        op: DbgOp::Start,
        num_data_valid: 0,
        data: 0,
    });
    sink.tick();

    let result = invoke_script(&mut sink, SessionConfig::default(), &script(&["read:64:1"]));
    assert_eq!(
        result,
        Err(SessionError::NotIdle {
            observed: RespType::Running
        })
    );
    assert_eq!(sink.status().entries_full(), 1);
}

#[rstest]
#[case::every_byte(1)]
#[case::every_other_byte(2)]
#[case::bursts(5)]
fn idle_insertion_does_not_change_results(#[case] idle_after: u32) {
    let mut plain = DprintfFifoSink::default();
    let mut padded = DprintfFifoSink::default();
    for sink in [&mut plain, &mut padded] {
        sink.push_record(&record()).expect("room");
        sink.push_record(&record()).expect("room");
    }
    let bytes = script(&["status", "read:64:1", "status", "read:64:1"]).encode();

    let expected = DebugMasterSession::new(&mut plain, SessionConfig::default())
        .run(&bytes, || 0)
        .expect("sink idle");

    let mut calls = 0_u32;
    let outcome = DebugMasterSession::new(&mut padded, SessionConfig::default())
        .run(&bytes, move || {
            calls += 1;
            if calls % idle_after == 0 {
                3
            } else {
                0
            }
        })
        .expect("sink idle");

    assert_eq!(outcome.completion, expected.completion);
    assert_eq!(outcome.data_returned, expected.data_returned);
    assert!(outcome.ticks > expected.ticks);
}

#[test]
fn exhausted_budget_reports_unexpected() {
    let mut sink = DprintfFifoSink::default();
    let config = SessionConfig {
        tick_budget: 1,
        ..SessionConfig::default()
    };
    let outcome = invoke_script(&mut sink, config, &script(&["status", "status"]))
        .expect("sink idle");
    assert_eq!(outcome.completion, Completion::Unexpected);
    assert_eq!(outcome.completion.fault_code(), Some(FaultCode::Unexpected));
}

#[test]
fn malformed_script_reports_errored_and_sink_recovers() {
    let mut sink = DprintfFifoSink::default();
    let outcome = DebugMasterSession::new(&mut sink, SessionConfig::default())
        .run(&[0xC5], || 0)
        .expect("sink idle");
    assert_eq!(outcome.completion, Completion::Errored);

    let outcome = DebugMasterSession::new(&mut sink, SessionConfig::default())
        .run(&[0x47], || 0)
        .expect("sink back to idle");
    assert_eq!(outcome.completion, Completion::Errored, "truncated read opcode");

    sink.push_record(&record()).expect("room");
    assert_eq!(run(&mut sink, &["status"]), (Completion::Ok, vec![status_word(1)]));
}

#[test]
fn status_reports_sticky_overflow_of_small_sink() {
    let mut sink = DprintfFifoSink::new(SinkConfig { capacity: 1 });
    sink.push_record(&record()).expect("room");
    assert!(sink.push_record(&record()).is_err());

    let (completion, data) = run(&mut sink, &["status"]);
    assert_eq!(completion, Completion::Ok);
    let packed = FifoStatus::unpack(data[0]);
    assert!(packed.full);
    assert!(packed.overflowed);
    assert!(!packed.underflowed);
    assert_eq!(packed.entries_full, 1);
    assert_eq!(packed.spaces_available, 0);
}

#[test]
fn wide_read_of_word_aligned_record_returns_repeated_word() {
    let mut sink = DprintfFifoSink::default();
    sink.push_record(&DprintfRecord::new(0x0, b"abcdefgh".to_vec()).expect("printable record"))
        .expect("room");

    let wide = DebugScript::new().with(ScriptOp::read(256, 1).expect("valid shape"));
    let outcome = invoke_script(&mut sink, SessionConfig::default(), &wide).expect("sink idle");

    assert_eq!(outcome.completion, Completion::Ok);
    assert_eq!(
        outcome.data_returned,
        vec![FIRST_HALF, SECOND_HALF, FIRST_HALF, SECOND_HALF, 0, 0, 0, 0]
    );
    assert!(sink.status().empty());
}
