//! Reads integers from stdin, keeps the positive multiples of three, and
//! prints the most recent ones on a fixed interval. Type `exit` to stop.

use clap::Parser;
use sieve_pipeline::config::{DEFAULT_BUFFER_CAPACITY, DEFAULT_FLUSH_INTERVAL};
use sieve_pipeline::observer::tracing_observer;
use sieve_pipeline::{run_pipeline, ConsoleSink, InputOutcome, PipelineConfig};
use std::io::{self, BufReader};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "sieve-pipeline", version, about)]
struct Cli {
    /// Number of most recent values kept between flushes
    #[arg(long, default_value_t = DEFAULT_BUFFER_CAPACITY)]
    capacity: usize,

    /// Seconds between flushes of the buffer to stdout
    #[arg(long = "flush-interval", default_value_t = DEFAULT_FLUSH_INTERVAL.as_secs())]
    flush_interval: u64,
}

fn init_logging() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_thread_names(true)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let config = PipelineConfig::new()
        .with_buffer_capacity(cli.capacity)
        .with_flush_interval(Duration::from_secs(cli.flush_interval));
    tracing::info!(
        capacity = config.buffer_capacity,
        flush_interval_secs = config.flush_interval.as_secs(),
        "pipeline starting"
    );

    let report = run_pipeline(
        BufReader::new(io::stdin()),
        Arc::new(ConsoleSink::new()),
        config,
        tracing_observer(),
    );

    match report {
        Ok(report) if report.succeeded() => ExitCode::SUCCESS,
        Ok(report) => {
            if let InputOutcome::Failed(reason) = &report.outcome {
                tracing::error!(%reason, "input stream failed");
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "pipeline failed");
            ExitCode::FAILURE
        }
    }
}
