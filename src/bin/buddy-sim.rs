//! Replays a request trace against a simulated buddy pool.
//!
//! Usage: buddy-sim [--legacy] [TRACE] [TOTAL_UNITS]
//!
//! `TRACE` defaults to `data/buddy.dat` and `TOTAL_UNITS` to 1024. `--legacy`
//! reproduces the classic simulator (exact-match expiry, zero-offset reclaim
//! without merging, overwrite on repeated ids). Log verbosity follows
//! `RUST_LOG`.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

use buddy_sim::sim::DEFAULT_TOTAL_UNITS;
use buddy_sim::{parse_trace, SimConfig, Simulator};
use log::LevelFilter;

const USAGE: &str = "Usage: buddy-sim [--legacy] [TRACE] [TOTAL_UNITS]";
const DEFAULT_TRACE: &str = "data/buddy.dat";

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliArgs {
    legacy: bool,
    path: String,
    total_units: usize,
}

/// Parse the arguments after the program name.
///
/// `Ok(None)` means help was requested.
fn parse_args(args: impl Iterator<Item = String>) -> Result<Option<CliArgs>, String> {
    let mut legacy = false;
    let mut positional = Vec::new();
    for arg in args {
        match arg.as_str() {
            "--legacy" => legacy = true,
            "-h" | "--help" => return Ok(None),
            flag if flag.starts_with("--") => return Err(format!("unknown option {}", flag)),
            _ => positional.push(arg),
        }
    }
    if positional.len() > 2 {
        return Err(format!("unexpected argument {:?}", positional[2]));
    }

    let mut positional = positional.into_iter();
    let path = positional
        .next()
        .unwrap_or_else(|| DEFAULT_TRACE.to_string());
    let total_units = match positional.next() {
        None => DEFAULT_TOTAL_UNITS,
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|err| format!("invalid pool size {:?}: {}", raw, err))?,
    };

    Ok(Some(CliArgs {
        legacy,
        path,
        total_units,
    }))
}

fn init_logging() {
    env_logger::Builder::new()
        .filter_level(if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();
}

fn main() -> ExitCode {
    init_logging();

    let args = match parse_args(env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("Error: {}\n{}", err, USAGE);
            return ExitCode::FAILURE;
        }
    };

    let input = match fs::read_to_string(&args.path) {
        Ok(input) => input,
        Err(err) => {
            eprintln!("Error: Could not open {}: {}", args.path, err);
            return ExitCode::FAILURE;
        }
    };
    let requests = match parse_trace(&input) {
        Ok(requests) => requests,
        Err(err) => {
            eprintln!("Error: {}: {}", args.path, err);
            return ExitCode::FAILURE;
        }
    };

    let config = if args.legacy {
        SimConfig::legacy(args.total_units)
    } else {
        SimConfig::builder().total_units(args.total_units).build()
    };
    let mut sim = match Simulator::new(config) {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for event in sim.run(requests) {
        if writeln!(out, "{}", event).is_err() {
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<CliArgs>, String> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        assert_eq!(
            parse(&[]),
            Ok(Some(CliArgs {
                legacy: false,
                path: "data/buddy.dat".to_string(),
                total_units: 1024,
            }))
        );
    }

    #[test]
    fn test_legacy_flag_anywhere() {
        let args = parse(&["trace.dat", "--legacy", "256"]).unwrap().unwrap();
        assert!(args.legacy);
        assert_eq!(args.path, "trace.dat");
        assert_eq!(args.total_units, 256);
    }

    #[test]
    fn test_help_short_circuits() {
        assert_eq!(parse(&["-h"]), Ok(None));
        assert_eq!(parse(&["--legacy", "--help", "not-a-number"]), Ok(None));
    }

    #[test]
    fn test_rejects_bad_arguments() {
        let err = parse(&["trace.dat", "lots"]).unwrap_err();
        assert!(err.starts_with("invalid pool size \"lots\""), "{}", err);
        assert!(parse(&["--verbose"]).is_err());
        assert!(parse(&["a", "1024", "extra"]).is_err());
    }
}
