//! CLI entry point for the whale-sound archive mirror.

// Clippy lints - strict for binary code as well
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]

use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use whalesounds_core::{
    Discovery, Dispatcher, FailureLedger, FetchExtractWorker, HttpClient, RunConfig,
};

mod app_config;
mod cli;
mod exit_handler;
mod progress;
mod terminal;

use exit_handler::determine_exit_outcome;
use progress::{DiscoveryProgress, DownloadProgress};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let (args, sources) = cli::parse_args_with_sources();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let no_color = terminal::no_color_env_requested();
    terminal::init_tracing(
        terminal::default_log_level(args.quiet, args.verbose),
        no_color,
    );
    debug!(?args, "CLI arguments parsed");

    let file_config = app_config::load_default_file_config()?;
    let config = app_config::resolve_run_config(&args, &sources, file_config.as_ref())?;
    let show_progress = terminal::should_show_progress(
        io::stderr().is_terminal(),
        args.quiet,
        args.no_progress,
        terminal::is_dumb_terminal(),
    );

    let (succeeded, failed) = run(&config, show_progress).await?;

    let outcome = determine_exit_outcome(succeeded, failed);
    if args.strict && outcome.strict_code() != 0 {
        std::process::exit(outcome.strict_code());
    }
    Ok(())
}

/// Runs discovery, dispatch and ledger writing; returns (succeeded, failed).
async fn run(config: &RunConfig, show_progress: bool) -> Result<(usize, usize)> {
    info!(
        collection = %config.collection,
        output_dir = %config.output_dir.display(),
        workers = config.workers,
        wait_secs = config.wait.as_secs_f64(),
        "whalesounds starting"
    );

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create output directory '{}'",
                config.output_dir.display()
            )
        })?;

    // Validate before the crawl so a bad worker count fails fast.
    let dispatcher = Dispatcher::new(config.workers, config.wait)?;
    debug!(
        workers = dispatcher.workers(),
        wait_ms = dispatcher.wait().as_millis(),
        "dispatcher ready"
    );
    let client = HttpClient::new();

    let discovery_progress = DiscoveryProgress::new(show_progress);
    let tasks = Discovery::new(client.clone(), config.collection.species_walk())
        .discover(&config.root_url, &discovery_progress)
        .await;
    discovery_progress.finish();
    let tasks = tasks.context("Failed to discover files to download")?;

    let worker = FetchExtractWorker::new(
        client,
        config.output_dir.clone(),
        config.collection.archive_mode(),
    );
    let download_progress = DownloadProgress::new(show_progress, tasks.len());
    let report = dispatcher
        .run(tasks, Arc::new(worker), &download_progress)
        .await;
    download_progress.finish();

    let ledger = FailureLedger::from_report(&report);
    let ledger_path = ledger.write(&config.output_dir).await?;

    info!(
        total = report.total(),
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Download complete"
    );
    if !ledger.is_empty() {
        warn!(
            ledger = %ledger_path.display(),
            "{} files were not downloaded",
            ledger.len()
        );
        for url in ledger.urls() {
            debug!(url = %url, "not downloaded");
        }
    }

    Ok((report.succeeded(), report.failed()))
}
