//! Configuration types for weblog-stats
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//!
//! The worker/roster equality check is not done here: it is the
//! coordinator's precondition, so library callers get it as well.

use crate::error::ConfigError;
use crate::query::DEFAULT_LIMIT;
use crate::stats::DEFAULT_TOP_K;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Largest accepted top-K
pub const MAX_TOP_K: usize = 1000;

/// Default report location for the parallel analyzer
pub const DEFAULT_OUTPUT: &str = "reports/parallel_summary.json";

/// Default report location for the serial analyzer
pub const DEFAULT_SERIAL_OUTPUT: &str = "reports/serial_summary.json";

/// Parallel web-access log analyzer
#[derive(Parser, Debug, Clone)]
#[command(
    name = "weblog-stats",
    version,
    about = "Parallel web-access log analyzer",
    long_about = "Analyzes web-access logs with one worker thread per file, waits for every\n\
                  worker, merges the partial statistics and atomically writes a JSON report\n\
                  with per-file summaries, a global summary and rankings.",
    after_help = "EXAMPLES:\n    \
        weblog-stats logs/server1.log logs/server2.log logs/server3.log\n    \
        weblog-stats logs/*.log -o reports/today.json -k 10 --deadline 300\n    \
        weblog-stats serial logs/*.log -o reports/serial_summary.json\n    \
        weblog-stats query logs/server1.log --status-class 5 --region Europe",
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
pub struct CliArgs {
    /// Log files to analyze, one worker each
    #[arg(value_name = "LOG", required = true)]
    pub logs: Vec<PathBuf>,

    /// Subcommand (serial, query)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output report file (JSON)
    #[arg(short, long, default_value = DEFAULT_OUTPUT, value_name = "FILE")]
    pub output: PathBuf,

    /// Declared worker count; must equal the number of log files
    #[arg(short = 'w', long, value_name = "NUM")]
    pub workers: Option<usize>,

    /// Number of top paths kept per summary
    #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K, value_name = "NUM")]
    pub top_k: usize,

    /// Fail the batch if workers have not all finished after this many seconds (0 disables)
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Subcommands
#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Analyze all logs in a single thread and write only the global summary
    Serial {
        /// Log files to analyze, in order
        #[arg(value_name = "LOG", required = true)]
        logs: Vec<PathBuf>,

        /// Output summary file (JSON)
        #[arg(short, long, default_value = DEFAULT_SERIAL_OUTPUT, value_name = "FILE")]
        output: PathBuf,

        /// Number of top paths kept
        #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K, value_name = "NUM")]
        top_k: usize,
    },

    /// Print matching raw records from one log file as JSON
    Query {
        /// Log file to scan
        #[arg(value_name = "LOG")]
        log: PathBuf,

        /// Status class prefix, e.g. 4 or 40
        #[arg(long, value_name = "PREFIX")]
        status_class: Option<String>,

        /// Exact HTTP method
        #[arg(long, value_name = "METHOD")]
        method: Option<String>,

        /// Region name, e.g. "North America"
        #[arg(long, value_name = "REGION")]
        region: Option<String>,

        /// Substring the path must contain
        #[arg(long = "path-sub", value_name = "TEXT")]
        path_sub: Option<String>,

        /// Matching records to skip
        #[arg(long, default_value_t = 0, value_name = "NUM")]
        offset: usize,

        /// Maximum records returned
        #[arg(long, default_value_t = DEFAULT_LIMIT, value_name = "NUM")]
        limit: usize,
    },
}

/// Validated configuration for one batch run
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    /// Ordered input files
    pub roster: Vec<PathBuf>,

    /// Declared worker count
    pub worker_count: usize,

    /// Report destination
    pub output_path: PathBuf,

    /// Paths kept in each summary's top list
    pub top_k: usize,

    /// Optional barrier deadline
    pub deadline: Option<Duration>,

    /// Show progress indicator
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl AnalyzeConfig {
    /// Configuration with one worker per file and default settings
    pub fn new(roster: Vec<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            worker_count: roster.len(),
            roster,
            output_path: output_path.into(),
            top_k: DEFAULT_TOP_K,
            deadline: None,
            show_progress: false,
            verbose: false,
        }
    }

    /// Override the declared worker count
    pub fn with_workers(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    /// Override top-K
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set a barrier deadline
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        if args.logs.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }

        validate_top_k(args.top_k)?;
        validate_output(&args.output)?;

        let worker_count = args.workers.unwrap_or(args.logs.len());

        Ok(Self {
            roster: args.logs,
            worker_count,
            output_path: args.output,
            top_k: args.top_k,
            deadline: args
                .deadline
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            show_progress: !args.quiet,
            verbose: args.verbose,
        })
    }
}

/// Check a top-K value
pub fn validate_top_k(top_k: usize) -> Result<(), ConfigError> {
    if top_k == 0 || top_k > MAX_TOP_K {
        return Err(ConfigError::InvalidTopK {
            value: top_k,
            max: MAX_TOP_K,
        });
    }
    Ok(())
}

/// Check that a report path can name a file
pub fn validate_output(path: &std::path::Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() || path.file_name().is_none() {
        return Err(ConfigError::InvalidOutputPath {
            path: path.to_path_buf(),
            reason: "Path does not name a file".to_string(),
        });
    }
    if path.is_dir() {
        return Err(ConfigError::InvalidOutputPath {
            path: path.to_path_buf(),
            reason: "Path is a directory".to_string(),
        });
    }
    Ok(())
}
