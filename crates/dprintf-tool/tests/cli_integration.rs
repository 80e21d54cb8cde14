//! Integration tests for the dprintf-tool CLI.

use dprintf_core as _;
use dprintf_tool as _;
use serde as _;
use thiserror as _;
use tracing as _;
use tracing_subscriber as _;

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn binary_path() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    path.pop();
    path.join("dprintf-tool")
}

fn create_temp_file(dir: &std::path::Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(binary_path())
        .args(args)
        .output()
        .expect("failed to run dprintf-tool")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

const BENCH_RECORDS: &str = "\
# two copies of the bench record
0000: 61 62 63 64 65 66 67 68 69 6a 6b 6c 6d 6e 6f 70
0000: 6162636465666768 696a6b6c6d6e6f70
";

#[test]
fn render_program_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let program = create_temp_file(
        temp_dir.path(),
        "vector.bin",
        &[0xc4, 0x00, 0xc4, 0x01, 0xc4, 0x0a, 0xc4, 0x64, 0xc4, 0xff, 0xff],
    );

    let output = run(&["render", program.to_str().unwrap()]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), " 0 110100255\n");
}

#[test]
fn render_verbose_lists_addressed_bytes() {
    let temp_dir = tempfile::tempdir().unwrap();
    let program = create_temp_file(temp_dir.path(), "hi.bin", b"Hi");

    let output = run(&["render", program.to_str().unwrap(), "-a", "40", "-v"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "Hi\n");
    let listing = stderr(&output);
    assert!(listing.contains("0040: 48 H"));
    assert!(listing.contains("0041: 69 i"));
}

#[test]
fn render_rejects_wide_pad() {
    let temp_dir = tempfile::tempdir().unwrap();
    let program = create_temp_file(temp_dir.path(), "bad.bin", &[0x41, 0xa8, 0x01]);

    let output = run(&["render", program.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("pad width 10"));
}

#[test]
fn script_prints_encoded_bytes() {
    let output = run(&["script", "read:64:2", "status", "read_err:512:256"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "47 01 00 00 bf ff 00\n");
}

#[test]
fn script_rejects_unknown_op() {
    let output = run(&["script", "poll"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown op `poll`"));
}

#[test]
fn simulate_bench_sequence() {
    let temp_dir = tempfile::tempdir().unwrap();
    let records = create_temp_file(temp_dir.path(), "bench.rec", BENCH_RECORDS.as_bytes());

    let output = run(&[
        "simulate",
        records.to_str().unwrap(),
        "read:64:1",
        "status",
    ]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("completion: ok\n"));
    assert!(text.contains("records: 2 queued, 0 dropped"));
    assert!(text.contains("data: 0x65666768 0x61626364 0x"));
    assert!(text.contains("fifo: entries=1 spaces=514"));
}

#[test]
fn simulate_json_report() {
    let temp_dir = tempfile::tempdir().unwrap();
    let records = create_temp_file(temp_dir.path(), "bench.rec", BENCH_RECORDS.as_bytes());

    let output = run(&[
        "simulate",
        records.to_str().unwrap(),
        "status",
        "--capacity",
        "1",
        "--json",
    ]);

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["completion"], "ok");
    assert_eq!(report["records_queued"], 1);
    assert_eq!(report["records_dropped"], 1);
    assert_eq!(report["fifo"]["overflowed"], true);
    assert_eq!(report["data_returned"].as_array().map(Vec::len), Some(1));
}

#[test]
fn simulate_poll_failure_exits_nonzero() {
    let temp_dir = tempfile::tempdir().unwrap();
    let records = create_temp_file(temp_dir.path(), "empty.rec", b"# nothing queued\n");

    let output = run(&["simulate", records.to_str().unwrap(), "read_err:64:2"]);

    assert!(!output.status.success());
    assert!(stdout(&output).starts_with("completion: poll_failed\n"));
}

#[test]
fn simulate_reports_bad_record_line() {
    let temp_dir = tempfile::tempdir().unwrap();
    let records = create_temp_file(temp_dir.path(), "bad.rec", b"0000: 41\nzz: 41\n");

    let output = run(&["simulate", records.to_str().unwrap(), "status"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("line 2: invalid address `zz`"));
}

#[test]
fn ratio_prints_dda_settings() {
    let output = run(&["ratio", "1.54", "200"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("77/50 (1.540000)\n"));
    assert!(text.contains("adder=76 subtractor=-28"));
    assert!(text.contains("divider=0x8032001b"));
}

#[test]
fn lfsr_steps_from_one() {
    let output = run(&["lfsr", "4", "--steps", "3"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "poly=0x19\n0001 0x1\n0010 0x2\n0100 0x4\n");
}

#[test]
fn help_and_unknown_command() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("Usage: dprintf-tool"));

    let output = run(&["frobnicate"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown command: frobnicate"));
}
