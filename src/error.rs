//! Error types for weblog-stats
//!
//! This module defines the error hierarchy for the analyzer:
//! - Per-line parse failures (recoverable, silently dropped by workers)
//! - Configuration and precondition errors
//! - Worker errors (missing file, I/O, panics, deadline)
//! - Report persistence errors
//! - Raw record query errors
//!
//! Only `LineError` is recoverable. Everything wrapped by `AnalyzerError`
//! aborts the batch, and no report is written.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Top-level error type for a batch run
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Configuration or precondition errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// Report persistence errors
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Raw record query errors
    #[error("Query error: {0}")]
    Query(#[from] QueryError),
}

/// Why a single log line could not be turned into a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// The line does not match the access log grammar
    #[error("line does not match the access log format")]
    Malformed,

    /// The bracketed timestamp could not be parsed
    #[error("invalid timestamp '{0}'")]
    BadTimestamp(String),

    /// Status code outside 100..=599
    #[error("status {0} outside 100-599")]
    StatusOutOfRange(u16),

    /// Response size does not fit in 64 bits
    #[error("response size '{0}' overflows")]
    SizeOverflow(String),
}

/// Configuration and batch precondition errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Declared worker count differs from the roster length
    #[error("Worker count mismatch: expected {expected} workers (one per log file) but got {actual}")]
    WorkerCountMismatch { expected: usize, actual: usize },

    /// No input files
    #[error("Roster is empty: at least one log file is required")]
    EmptyRoster,

    /// Two roster files map to the same entity name
    #[error("Duplicate entity '{name}': '{first}' and '{second}' share a file stem")]
    DuplicateEntity {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// A roster path has no usable file stem
    #[error("Cannot derive an entity name from '{path}'")]
    UnnamedEntity { path: PathBuf },

    /// Invalid top-K
    #[error("Invalid top-k {value}: must be between 1 and {max}")]
    InvalidTopK { value: usize, max: usize },

    /// Output path error
    #[error("Invalid output path '{path}': {reason}")]
    InvalidOutputPath { path: PathBuf, reason: String },

    /// Invalid query window
    #[error("Invalid query limit {limit}: must be between 1 and {max}")]
    InvalidLimit { limit: usize, max: usize },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Input file does not exist
    #[error("Worker {id}: log file not found: '{path}'")]
    FileNotFound { id: usize, path: PathBuf },

    /// Failed to open or read the input file
    #[error("Worker {id}: failed to read '{path}': {source}")]
    Read {
        id: usize,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Worker thread could not be started
    #[error("Failed to spawn worker {id}: {reason}")]
    SpawnFailed { id: usize, reason: String },

    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Not every worker reported before the deadline
    #[error("Batch deadline of {limit:?} exceeded with {pending} of {total} workers still running")]
    DeadlineExceeded {
        limit: Duration,
        pending: usize,
        total: usize,
    },

    /// Result channel closed before every worker reported
    #[error("Result channel closed with {pending} workers unaccounted for")]
    ResultChannelClosed { pending: usize },
}

impl WorkerError {
    /// Worker index the error belongs to, when it belongs to one
    pub fn worker_id(&self) -> Option<usize> {
        match self {
            WorkerError::FileNotFound { id, .. }
            | WorkerError::Read { id, .. }
            | WorkerError::SpawnFailed { id, .. }
            | WorkerError::Panicked { id, .. } => Some(*id),
            WorkerError::DeadlineExceeded { .. } | WorkerError::ResultChannelClosed { .. } => None,
        }
    }
}

/// Report persistence errors
#[derive(Error, Debug)]
pub enum ReportError {
    /// JSON encoding/decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to create the output directory
    #[error("Failed to create report directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write or sync the temporary file
    #[error("Failed to write temporary report '{path}': {source}")]
    WriteTemp {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to move the temporary file into place
    #[error("Failed to rename '{from}' to '{to}': {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a persisted report
    #[error("Failed to read report '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Raw record query errors
#[derive(Error, Debug)]
pub enum QueryError {
    /// Log file does not exist
    #[error("Log file not found: '{0}'")]
    NotFound(PathBuf),

    /// Failed to read the log file
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unknown region name in a filter
    #[error("Unknown region '{0}'")]
    UnknownRegion(String),
}

/// Result type alias for AnalyzerError
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Result type alias for WorkerError
pub type WorkerResult<T> = std::result::Result<T, WorkerError>;

/// Result type alias for ReportError
pub type ReportResult<T> = std::result::Result<T, ReportError>;

/// Result type alias for QueryError
pub type QueryResult<T> = std::result::Result<T, QueryError>;
