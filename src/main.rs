//! mqbench - load generator for AMQP message brokers

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use mqbench_brokers::AmqpConnector;
use mqbench_core::{RunControllerBuilder, RunOutcome, WorkConfig};
use mqbench_report::ConsoleReport;
use tracing_subscriber::EnvFilter;

mod cli;

fn main() -> Result<ExitCode> {
    let cli = cli::Cli::parse();

    // Logs go to stderr so CSV on stdout stays clean.
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match cli.to_config() {
        Ok(config) => config,
        Err(e) => return Ok(usage(&e.to_string())),
    };

    let mut runtime = tokio::runtime::Builder::new_multi_thread();
    if let Some(cpus) = cli.cpus {
        runtime.worker_threads(usize::from(cpus));
    }
    let runtime = runtime
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    let outcome = runtime.block_on(run(config))?;
    Ok(match outcome {
        RunOutcome::Completed(_) => ExitCode::SUCCESS,
        RunOutcome::Interrupted(_) => ExitCode::FAILURE,
    })
}

async fn run(config: WorkConfig) -> Result<RunOutcome> {
    let controller = RunControllerBuilder::new()
        .config(config)
        .connector(Arc::new(AmqpConnector::new()))
        .build()?;

    let mut report = ConsoleReport::stdout();
    let outcome = controller.run_with_signal_handling(&mut report).await?;
    Ok(outcome)
}

fn usage(message: &str) -> ExitCode {
    eprintln!("{message}\n");
    let _ = cli::Cli::command().write_help(&mut std::io::stderr());
    eprintln!();
    ExitCode::FAILURE
}
