//! CLI entry point for the dprintf-tool binary.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use dprintf_core::{
    dda_of_ratio, find_closest_ratio, ClockDividerConfig, DprintfRecord, Lfsr, SessionConfig,
    SinkConfig,
};
use dprintf_tool::ops::parse_script;
use dprintf_tool::records::load_records;
use dprintf_tool::simulate::simulate;
use serde as _;
use serde_json as _;
#[cfg(test)]
use tempfile as _;
use thiserror as _;
use tracing as _;
use tracing_subscriber::EnvFilter;

const USAGE_TEXT: &str = "\
Usage: dprintf-tool <command> [options]

Commands:
  render <program> [-a <addr>] [-v]        Render a raw dprintf program file
  script <op>...                           Print the encoded debug-master script
  simulate <records> <op>... [options]     Drain queued records with a script
  ratio <f> <max>                          Closest clock ratio and DDA settings
  lfsr <nbits> [--steps <n>]               Step a maximal-length LFSR

Ops:
  status, read:<bits>:<count>, read_err:<bits>:<count>

Options:
  -a, --address <hex>  Address of the first output byte (render, default 0)
  -v, --verbose        Print the addressed byte stream to stderr (render)
  --capacity <n>       Sink FIFO depth (simulate, default 515)
  --budget <n>         Session data-tick budget (simulate, default 1000)
  --json               Print the simulation report as JSON (simulate)
  --steps <n>          Shifts to print (lfsr, default 8)
  -h, --help           Show this help message

simulate exits with status 1 when the script does not complete ok.
Set RUST_LOG=debug to trace sessions.

Examples:
  dprintf-tool render greeting.bin -a 40 -v
  dprintf-tool script read:64:2 status
  dprintf-tool simulate bench.rec read:64:1 status --json
";

#[derive(Debug, PartialEq)]
enum Command {
    Render(RenderArgs),
    Script(Vec<String>),
    Simulate(SimulateArgs),
    Ratio(RatioArgs),
    Lfsr(LfsrArgs),
}

#[derive(Debug, PartialEq, Eq)]
struct RenderArgs {
    input: PathBuf,
    address: u16,
    verbose: bool,
}

#[derive(Debug, PartialEq, Eq)]
struct SimulateArgs {
    records: PathBuf,
    ops: Vec<String>,
    capacity: Option<u32>,
    budget: Option<u32>,
    json: bool,
}

#[derive(Debug, PartialEq)]
struct RatioArgs {
    target: f64,
    max: u16,
}

#[derive(Debug, PartialEq, Eq)]
struct LfsrArgs {
    nbits: u8,
    steps: u64,
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();
    let rest: Vec<String> = args.map(|arg| arg.to_string_lossy().to_string()).collect();
    if rest.iter().any(|arg| arg == "--help" || arg == "-h") {
        return Err(USAGE_TEXT.to_string());
    }

    let command = match command_str.as_str() {
        "render" => parse_render_args(rest).map(Command::Render),
        "script" => parse_script_args(rest).map(Command::Script),
        "simulate" => parse_simulate_args(rest).map(Command::Simulate),
        "ratio" => parse_ratio_args(&rest).map(Command::Ratio),
        "lfsr" => parse_lfsr_args(rest).map(Command::Lfsr),
        other => Err(format!("unknown command: {other}")),
    }?;
    Ok(ParseResult::Command(command))
}

fn parse_number<T: FromStr>(name: &str, value: Option<String>) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("missing value for {name}"))?;
    value
        .parse()
        .map_err(|_| format!("invalid value for {name}: {value}"))
}

fn parse_address(value: Option<String>) -> Result<u16, String> {
    let value = value.ok_or_else(|| "missing value for -a".to_string())?;
    let digits = value.strip_prefix("0x").unwrap_or(&value);
    u16::from_str_radix(digits, 16).map_err(|_| format!("invalid address: {value}"))
}

fn is_option(arg: &str) -> bool {
    arg.starts_with('-') && arg.len() > 1
}

fn parse_render_args(args: Vec<String>) -> Result<RenderArgs, String> {
    let mut input: Option<PathBuf> = None;
    let mut address = 0;
    let mut verbose = false;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = true,
            "-a" | "--address" => address = parse_address(args.next())?,
            option if is_option(option) => return Err(format!("unknown option: {option}")),
            _ if input.is_some() => return Err("multiple input paths provided".to_string()),
            _ => input = Some(PathBuf::from(arg)),
        }
    }

    let input = input.ok_or_else(|| "missing input path".to_string())?;
    Ok(RenderArgs {
        input,
        address,
        verbose,
    })
}

fn parse_script_args(args: Vec<String>) -> Result<Vec<String>, String> {
    if let Some(option) = args.iter().find(|arg| is_option(arg)) {
        return Err(format!("unknown option: {option}"));
    }
    if args.is_empty() {
        return Err("missing script ops".to_string());
    }
    Ok(args)
}

fn parse_simulate_args(args: Vec<String>) -> Result<SimulateArgs, String> {
    let mut records: Option<PathBuf> = None;
    let mut ops = Vec::new();
    let mut capacity = None;
    let mut budget = None;
    let mut json = false;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--capacity" => capacity = Some(parse_number("--capacity", args.next())?),
            "--budget" => budget = Some(parse_number("--budget", args.next())?),
            option if is_option(option) => return Err(format!("unknown option: {option}")),
            _ if records.is_none() => records = Some(PathBuf::from(arg)),
            _ => ops.push(arg),
        }
    }

    let records = records.ok_or_else(|| "missing records path".to_string())?;
    if ops.is_empty() {
        return Err("missing script ops".to_string());
    }
    Ok(SimulateArgs {
        records,
        ops,
        capacity,
        budget,
        json,
    })
}

fn parse_ratio_args(args: &[String]) -> Result<RatioArgs, String> {
    match args {
        [target, max] => Ok(RatioArgs {
            target: parse_number("<f>", Some(target.clone()))?,
            max: parse_number("<max>", Some(max.clone()))?,
        }),
        _ => Err("ratio takes exactly <f> and <max>".to_string()),
    }
}

fn parse_lfsr_args(args: Vec<String>) -> Result<LfsrArgs, String> {
    let mut nbits: Option<u8> = None;
    let mut steps = 8;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--steps" => steps = parse_number("--steps", args.next())?,
            option if is_option(option) => return Err(format!("unknown option: {option}")),
            _ if nbits.is_some() => return Err("multiple widths provided".to_string()),
            _ => nbits = Some(parse_number("<nbits>", Some(arg))?),
        }
    }

    let nbits = nbits.ok_or_else(|| "missing <nbits>".to_string())?;
    Ok(LfsrArgs { nbits, steps })
}

fn run_render(args: &RenderArgs) -> Result<(), i32> {
    let program = fs::read(&args.input).map_err(|e| {
        eprintln!("error: failed to read {}: {e}", args.input.display());
        1
    })?;
    let record = DprintfRecord::new(args.address, program).map_err(|e| {
        eprintln!("{}: error: {e}", args.input.display());
        1
    })?;

    if args.verbose {
        for byte in record.byte_stream().iter().filter(|byte| byte.valid) {
            eprintln!(
                "{:04X}: {:02X} {}",
                byte.address,
                byte.data,
                char::from(byte.data).escape_default()
            );
        }
    }

    println!("{}", String::from_utf8_lossy(record.output()));
    Ok(())
}

fn run_script(ops: &[String]) -> Result<(), i32> {
    let script = parse_script(ops).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;
    let hex: Vec<String> = script
        .encode()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect();
    println!("{}", hex.join(" "));
    Ok(())
}

fn run_simulate(args: &SimulateArgs) -> Result<(), i32> {
    let records = load_records(&args.records).map_err(|e| {
        eprintln!("{}: error: {e}", args.records.display());
        1
    })?;
    let script = parse_script(&args.ops).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;

    let mut sink_config = SinkConfig::default();
    if let Some(capacity) = args.capacity {
        sink_config.capacity = capacity;
    }
    let mut session_config = SessionConfig::default();
    if let Some(budget) = args.budget {
        session_config.tick_budget = budget;
    }

    let report = simulate(&records, &script, sink_config, session_config).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;

    if args.json {
        let json = report.to_json().map_err(|e| {
            eprintln!("error: failed to encode report: {e}");
            1
        })?;
        println!("{json}");
    } else {
        println!("{report}");
    }

    if report.completion == "ok" {
        Ok(())
    } else {
        Err(1)
    }
}

fn run_ratio(args: &RatioArgs) -> Result<(), i32> {
    let Some(ratio) = find_closest_ratio(args.target, args.max) else {
        eprintln!("error: no ratio for {} within {}", args.target, args.max);
        return Err(1);
    };
    let dda = dda_of_ratio(Some(ratio));
    println!(
        "{}/{} ({:.6})",
        ratio.numerator,
        ratio.denominator,
        ratio.as_f64()
    );
    println!("adder={} subtractor={}", dda.adder, dda.subtractor);
    if let Some(config) = ClockDividerConfig::for_ratio(ratio) {
        println!("divider=0x{:08x}", config.pack());
    }
    Ok(())
}

fn run_lfsr(args: &LfsrArgs) -> Result<(), i32> {
    let mut lfsr = Lfsr::maximal(args.nbits).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;
    println!("poly=0x{:x}", lfsr.poly());
    for _ in 0..args.steps {
        println!("{lfsr} 0x{:x}", lfsr.value());
        lfsr.clk_once();
    }
    Ok(())
}

fn run(command: &Command) -> Result<(), i32> {
    match command {
        Command::Render(args) => run_render(args),
        Command::Script(ops) => run_script(ops),
        Command::Simulate(args) => run_simulate(args),
        Command::Ratio(args) => run_ratio(args),
        Command::Lfsr(args) => run_lfsr(args),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(command)) => match run(&command) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::path::PathBuf;

    fn args(list: &[&str]) -> impl Iterator<Item = OsString> {
        list.iter()
            .map(OsString::from)
            .collect::<Vec<_>>()
            .into_iter()
    }

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parses_render_command() {
        let result = parse_render_args(strings(&["program.bin", "-a", "0x40", "--verbose"]))
            .expect("valid render args should parse");

        assert_eq!(
            result,
            RenderArgs {
                input: PathBuf::from("program.bin"),
                address: 0x40,
                verbose: true,
            }
        );
    }

    #[test]
    fn parses_simulate_command() {
        let result = parse_simulate_args(strings(&[
            "bench.rec",
            "read:64:1",
            "--capacity",
            "4",
            "status",
            "--json",
        ]))
        .expect("valid simulate args should parse");

        assert_eq!(
            result,
            SimulateArgs {
                records: PathBuf::from("bench.rec"),
                ops: strings(&["read:64:1", "status"]),
                capacity: Some(4),
                budget: None,
                json: true,
            }
        );
    }

    #[test]
    fn parses_ratio_and_lfsr_commands() {
        let result = parse_args(args(&["ratio", "1.54", "200"])).expect("valid ratio args");
        assert!(matches!(
            result,
            ParseResult::Command(Command::Ratio(RatioArgs { max: 200, .. }))
        ));

        let result = parse_lfsr_args(strings(&["16", "--steps", "3"])).expect("valid lfsr args");
        assert_eq!(result, LfsrArgs { nbits: 16, steps: 3 });
    }

    #[test]
    fn parses_help_flag() {
        let result = parse_args(args(&["--help"])).expect("help should parse without error");
        assert!(matches!(result, ParseResult::Help));
    }

    #[test]
    fn subcommand_help_prints_usage() {
        let error = parse_args(args(&["simulate", "-h"])).expect_err("help is routed as usage");
        assert!(error.starts_with("Usage:"));
    }

    #[test]
    fn rejects_unknown_command() {
        let error = parse_args(args(&["unknown"])).expect_err("unknown command should fail parse");
        assert!(error.contains("unknown command"));
    }

    #[test]
    fn rejects_incomplete_commands() {
        let error = parse_render_args(Vec::new()).expect_err("missing input should fail");
        assert!(error.contains("missing input"));

        let error =
            parse_simulate_args(strings(&["bench.rec"])).expect_err("missing ops should fail");
        assert!(error.contains("missing script ops"));

        let error = parse_script_args(strings(&["--json"])).expect_err("script takes no options");
        assert!(error.contains("unknown option"));

        let error = parse_ratio_args(&strings(&["1.5"])).expect_err("ratio needs two values");
        assert!(error.contains("exactly"));

        let error = parse_render_args(strings(&["p.bin", "-a", "zz"])).expect_err("bad address");
        assert!(error.contains("invalid address"));

        let error = parse_simulate_args(strings(&["bench.rec", "status", "--budget"]))
            .expect_err("missing budget value");
        assert!(error.contains("missing value for --budget"));
    }
}
