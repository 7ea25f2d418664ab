//! CLI entrypoint for the filum conformance harness.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};

use filum_harness::HarnessError;
use filum_harness::fixtures::FixtureSet;
use filum_harness::report::RunReport;
use filum_harness::runner::Runner;
use filum_harness::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};

/// Conformance tooling for the filum stream library.
#[derive(Debug, Parser)]
#[command(name = "filum-harness")]
#[command(about = "Conformance harness for the filum stream library")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write the built-in fixture set as a JSON file.
    Generate {
        /// Output path for the fixture JSON.
        #[arg(long)]
        output: PathBuf,
    },
    /// Run a fixture set and report the results.
    Verify {
        /// Fixture JSON path.
        #[arg(long)]
        fixture: PathBuf,
        /// Optional markdown report path.
        #[arg(long)]
        report: Option<PathBuf>,
        /// Optional JSONL log path (defaults to stdout lines).
        #[arg(long)]
        log: Option<PathBuf>,
        /// Scratch directory for case files (defaults to the OS temp dir).
        #[arg(long)]
        scratch: Option<PathBuf>,
        /// Fixed timestamp string for deterministic reports.
        #[arg(long)]
        timestamp: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(all_passed) => {
            if all_passed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("harness error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool, HarnessError> {
    match cli.command {
        Command::Generate { output } => {
            let set = FixtureSet::builtin();
            std::fs::write(&output, set.to_json()?)?;
            println!("wrote {} cases to {}", set.cases.len(), output.display());
            Ok(true)
        }
        Command::Verify {
            fixture,
            report,
            log,
            scratch,
            timestamp,
        } => {
            let set = FixtureSet::from_file(&fixture)?;
            let stamp = timestamp.unwrap_or_else(epoch_seconds);

            let mut emitter = match &log {
                Some(path) => LogEmitter::to_file(path)?,
                None => LogEmitter::to_stdout(),
            };
            emitter.emit(&LogEntry::event(&stamp, LogLevel::Info, "run_started"))?;

            let scratch = scratch.unwrap_or_else(std::env::temp_dir);
            let outcomes = Runner::new(scratch).run_set(&set)?;

            for o in &outcomes {
                let outcome = if o.passed { Outcome::Pass } else { Outcome::Fail };
                let level = if o.passed { LogLevel::Info } else { LogLevel::Error };
                emitter.emit(&LogEntry::event(&stamp, level, "case_finished").for_case(
                    &o.case_name,
                    outcome,
                    o.detail.clone(),
                ))?;
            }

            let run_report = RunReport::new(&set.suite, &stamp, outcomes);
            emitter.emit(&LogEntry::event(&stamp, LogLevel::Info, "run_finished"))?;

            if let Some(path) = report {
                std::fs::write(&path, run_report.to_markdown())?;
                println!("report written to {}", path.display());
            }
            println!(
                "{}: {} passed, {} failed",
                run_report.suite, run_report.passed, run_report.failed
            );
            Ok(run_report.all_passed())
        }
    }
}

fn epoch_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
