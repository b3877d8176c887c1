//! ferry-check: analyze ferry simulation logs, optionally running the
//! simulation first.
//!
//! # Usage
//!
//! ```bash
//! # Check an existing log against N=3 trucks, O=5 cars, capacity K=6
//! ferry-check analyze ./proj2.out 3 5 6
//!
//! # Run the simulation, then check the log it wrote
//! ferry-check run ./proj2 3 5 6 100 100
//! ```
//!
//! Exits with 0 when the log is consistent and 1 on any violation or I/O
//! error. When the simulation itself exits non-zero, its exit code is
//! passed through.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use ferry_log_check::{
    check_file_with, runner, Bounds, Error, NoopObserver, ReportFormat, RunConfig,
    SnapshotEmitter, DEFAULT_LOG,
};

/// Ferry log checker
///
/// Validates the log of the ferry synchronization exercise: line numbering,
/// every ferry and vehicle transition, capacity, and final state.
#[derive(Parser, Debug)]
#[command(name = "ferry-check")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze an existing log file
    Analyze {
        /// Log file to analyze
        #[arg(default_value = DEFAULT_LOG)]
        log_file: PathBuf,

        /// Expected number of trucks
        #[arg(value_name = "N")]
        trucks: Option<u32>,

        /// Expected number of cars
        #[arg(value_name = "O")]
        cars: Option<u32>,

        /// Ferry capacity
        #[arg(value_name = "K")]
        capacity: Option<u32>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Run the simulation binary, then analyze the log it wrote
    Run {
        /// Path to the simulation binary
        path_to_binary: PathBuf,

        /// Number of trucks
        #[arg(value_name = "N")]
        trucks: u32,

        /// Number of cars
        #[arg(value_name = "O")]
        cars: u32,

        /// Ferry capacity
        #[arg(value_name = "K")]
        capacity: u32,

        /// Maximum vehicle arrival delay in microseconds
        #[arg(value_name = "TA")]
        max_arrival_us: u32,

        /// Maximum crossing time in microseconds
        #[arg(value_name = "TP")]
        max_crossing_us: u32,

        /// Log file to analyze after the run
        #[arg(long, default_value = DEFAULT_LOG)]
        log_file: PathBuf,

        /// Seconds before the simulation is killed
        #[arg(long, default_value_t = runner::DEFAULT_TIMEOUT.as_secs())]
        timeout: u64,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Write a per-line NDJSON snapshot trace to this file
    #[arg(long, value_name = "PATH")]
    trace_out: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Analyze {
            log_file,
            trucks,
            cars,
            capacity,
            output,
        } => {
            let bounds = Bounds {
                trucks,
                cars,
                capacity,
            };
            analyze(&log_file, bounds, &output)
        }

        Command::Run {
            path_to_binary,
            trucks,
            cars,
            capacity,
            max_arrival_us,
            max_crossing_us,
            log_file,
            timeout,
            output,
        } => {
            let config = RunConfig::builder()
                .executable(path_to_binary)
                .trucks(trucks)
                .cars(cars)
                .capacity(capacity)
                .max_arrival_us(max_arrival_us)
                .max_crossing_us(max_crossing_us)
                .timeout(Duration::from_secs(timeout))
                .build();
            let config = match config {
                Ok(config) => config,
                Err(err) => {
                    eprintln!("{err}");
                    return ExitCode::FAILURE;
                }
            };

            println!("Running '{}'", config.command_line());
            if let Err(err) = runner::run(&config) {
                eprintln!("{err}");
                return exit_code(err.exit_code());
            }

            let bounds = Bounds::new().trucks(trucks).cars(cars).capacity(capacity);
            analyze(&log_file, bounds, &output)
        }
    }
}

fn analyze(path: &Path, bounds: Bounds, output: &OutputArgs) -> ExitCode {
    let format = if output.json {
        ReportFormat::Json
    } else {
        ReportFormat::Text
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let result = match &output.trace_out {
        Some(trace_path) => {
            let mut emitter = match SnapshotEmitter::new(trace_path) {
                Ok(emitter) => emitter,
                Err(err) => {
                    eprintln!("Failed to create trace file '{}': {err}", trace_path.display());
                    return ExitCode::FAILURE;
                }
            };
            let result = check_file_with(path, bounds, format, &mut emitter, &mut out);
            if let Err(err) = emitter.finish() {
                error!(error = %err, path = %trace_path.display(), "Snapshot trace incomplete");
            }
            result
        }
        None => check_file_with(path, bounds, format, &mut NoopObserver, &mut out),
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        // the report already describes the failure
        Err(Error::Analysis(_) | Error::Io(_)) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code)
        .ok()
        .filter(|&code| code != 0)
        .map_or(ExitCode::FAILURE, ExitCode::from)
}
