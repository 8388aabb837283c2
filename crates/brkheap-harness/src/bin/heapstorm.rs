//! CLI entrypoint for brkheap storm workloads.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use brkheap_core::FitPolicy;
use brkheap_harness::report::{self, StormRecord};
use brkheap_harness::storm::{self, StormShape, StormSpec};

/// Allocation storm workloads for brkheap.
#[derive(Debug, Parser)]
#[command(name = "heapstorm")]
#[command(about = "Run allocation storms against the brkheap engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one storm under one fit policy and emit JSONL metrics.
    Run {
        /// Fit policy: first, best, or hybrid.
        #[arg(long, default_value = "hybrid")]
        policy: String,
        /// Storm shape: sawtooth, random-churn, or policy-thrash.
        #[arg(long, default_value = "random-churn")]
        shape: String,
        /// Number of storm operations.
        #[arg(long, default_value_t = 10_000)]
        ops: usize,
        /// Workload seed; same seed, same operation stream.
        #[arg(long, default_value_t = 0xDEAD_BEEF)]
        seed: u64,
        /// Output JSONL path (if omitted, prints to stdout).
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replay one storm under every fit policy and print a summary table.
    Compare {
        /// Storm shape: sawtooth, random-churn, or policy-thrash.
        #[arg(long, default_value = "random-churn")]
        shape: String,
        /// Number of storm operations.
        #[arg(long, default_value_t = 10_000)]
        ops: usize,
        /// Workload seed; same seed, same operation stream.
        #[arg(long, default_value_t = 0xDEAD_BEEF)]
        seed: u64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            policy,
            shape,
            ops,
            seed,
            output,
        } => run(&policy, &shape, ops, seed, output),
        Command::Compare { shape, ops, seed } => compare(&shape, ops, seed),
    }
}

fn run(policy: &str, shape: &str, ops: usize, seed: u64, output: Option<PathBuf>) -> ExitCode {
    let Some(shape) = StormShape::from_str_loose(shape) else {
        eprintln!("unknown storm shape: {shape}");
        return ExitCode::FAILURE;
    };
    let policy = FitPolicy::from_str_loose(policy);
    let spec = StormSpec::new(shape, ops, seed);

    let metrics = storm::run_storm(policy, &spec);
    let records = vec![StormRecord::new(0, metrics)];

    match output {
        Some(path) => match report::write_jsonl(&path, &records) {
            Ok(digest) => {
                println!(
                    "wrote {} record(s) to {} (sha256 {})",
                    digest.records, digest.path, digest.sha256
                );
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("failed to write report: {err}");
                ExitCode::FAILURE
            }
        },
        None => match report::render_jsonl(&records) {
            Ok(rendered) => {
                print!("{rendered}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("failed to render report: {err}");
                ExitCode::FAILURE
            }
        },
    }
}

fn compare(shape: &str, ops: usize, seed: u64) -> ExitCode {
    let Some(shape) = StormShape::from_str_loose(shape) else {
        eprintln!("unknown storm shape: {shape}");
        return ExitCode::FAILURE;
    };
    let spec = StormSpec::new(shape, ops, seed);

    println!(
        "{:<10} {:>14} {:>14} {:>12} {:>8}",
        "policy", "segment_size", "peak_live", "frag_ratio", "blocks"
    );
    for policy in [FitPolicy::FirstFit, FitPolicy::BestFit, FitPolicy::Hybrid] {
        let metrics = storm::run_storm(policy, &spec);
        println!(
            "{:<10} {:>14} {:>14} {:>12.4} {:>8}",
            metrics.policy,
            metrics.segment_size,
            metrics.peak_live_bytes,
            metrics.fragmentation_ratio,
            metrics.free_blocks
        );
    }
    ExitCode::SUCCESS
}
