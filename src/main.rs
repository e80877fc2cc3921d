//! weblog-stats - Parallel Web-Access Log Analyzer
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use weblog_stats::analyzer::{analyze_serial, BatchCoordinator};
use weblog_stats::config::{self, AnalyzeConfig, CliArgs, Command};
use weblog_stats::progress::{print_header, print_serial_summary, print_summary, ProgressReporter};
use weblog_stats::query::{scan_file, RecordFilter, Window};
use weblog_stats::report::ReportWriter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    match args.command.clone() {
        Some(Command::Serial { logs, output, top_k }) => run_serial(&logs, &output, top_k),
        Some(Command::Query {
            log,
            status_class,
            method,
            region,
            path_sub,
            offset,
            limit,
        }) => {
            let filter = RecordFilter::from_params(status_class, method, region.as_deref(), path_sub)
                .context("Invalid query filter")?;
            let window = Window::new(offset, limit).context("Invalid query window")?;
            run_query(&log, &filter, window)
        }
        None => {
            let config = AnalyzeConfig::from_args(args).context("Invalid configuration")?;
            run_batch(config)
        }
    }
}

/// Run the one-worker-per-file batch
fn run_batch(config: AnalyzeConfig) -> Result<()> {
    if config.show_progress {
        print_header(
            config.roster.len(),
            config.worker_count,
            &config.output_path.display().to_string(),
        );
    }

    // Preconditions are checked before any file is opened
    let coordinator = BatchCoordinator::new(config.clone()).context("Batch rejected")?;

    let progress = config.show_progress.then(ProgressReporter::new);
    if let Some(ref p) = progress {
        p.set_status(&format!("Analyzing {} log files...", coordinator.entities().len()));
    }

    let result = match coordinator.run() {
        Ok(result) => result,
        Err(e) => {
            if let Some(ref p) = progress {
                p.finish_and_clear();
            }
            return Err(e).context("Batch failed; previous report left untouched");
        }
    };

    if let Some(ref p) = progress {
        p.finish("Analysis completed");
        print_summary(&result);
    }

    Ok(())
}

/// Run the single-threaded analyzer and write the global summary
fn run_serial(logs: &[PathBuf], output: &Path, top_k: usize) -> Result<()> {
    config::validate_top_k(top_k).context("Invalid configuration")?;
    config::validate_output(output).context("Invalid configuration")?;

    let start = Instant::now();
    let summary = analyze_serial(logs, top_k).context("Serial analysis failed")?;

    ReportWriter::new(output)
        .write(&summary)
        .context("Failed to write summary")?;

    info!(output = %output.display(), "Serial summary written");
    print_serial_summary(&summary, start.elapsed(), &output.display().to_string());
    Ok(())
}

/// Print one page of matching raw records as JSON
fn run_query(log: &Path, filter: &RecordFilter, window: Window) -> Result<()> {
    let page = scan_file(log, filter, window)
        .with_context(|| format!("Query of '{}' failed", log.display()))?;
    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("weblog_stats=debug,warn")
    } else {
        EnvFilter::new("weblog_stats=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
