//! weblog-stats - Parallel Web-Access Log Analyzer
//!
//! Ingests fixed-format access log lines and produces per-source and global
//! usage statistics: request volume, status/method/region breakdowns,
//! hourly distribution, error rate and top paths.
//!
//! # Features
//!
//! - **One Worker Per File**: A fixed roster of F files is analyzed by
//!   exactly F worker threads. No rebalancing, no retry.
//!
//! - **Mergeable Statistics**: Per-file accumulators form a commutative
//!   monoid, so the global result does not depend on how input was split
//!   across files or in which order workers finish.
//!
//! - **All-or-Nothing Batches**: Any worker failure fails the run. Reports
//!   are replaced atomically, so readers never see a partial document.
//!
//! - **Streaming**: Each file is read forward once; memory is bounded by
//!   the number of distinct keys, not by file size.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Roster: server1.log ... serverN.log           │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ one file per worker
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Worker Threads                              │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐         ┌─────────┐     │
//! │  │Worker 0 │  │Worker 1 │  │Worker 2 │  ...    │Worker N │     │
//! │  │ parse   │  │ parse   │  │ parse   │         │ parse   │     │
//! │  │ absorb  │  │ absorb  │  │ absorb  │         │ absorb  │     │
//! │  └────┬────┘  └────┬────┘  └────┬────┘         └────┬────┘     │
//! │       └────────────┼────────────┼────────────────────┘          │
//! │                    ▼            ▼                               │
//! │            ┌──────────────────────────┐                         │
//! │            │   Barrier (crossbeam)    │                         │
//! │            │  - all or nothing        │                         │
//! │            │  - optional deadline     │                         │
//! │            └──────────────────────────┘                         │
//! │                         │                                       │
//! │                         ▼                                       │
//! │            ┌──────────────────────────┐                         │
//! │            │  Reduce                  │                         │
//! │            │  - summary per entity    │                         │
//! │            │  - merged global summary │                         │
//! │            │  - rankings              │                         │
//! │            └──────────────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │ tmp + fsync + rename
//!                               ▼
//!                    ┌──────────────────┐
//!                    │   Report JSON    │
//!                    └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # One worker per log file
//! weblog-stats logs/server1.log logs/server2.log logs/server3.log
//!
//! # Single-threaded reference run
//! weblog-stats serial logs/*.log
//!
//! # Browse matching raw records
//! weblog-stats query logs/server1.log --status-class 5 --limit 20
//! ```

pub mod analyzer;
pub mod config;
pub mod error;
pub mod log;
pub mod progress;
pub mod query;
pub mod report;
pub mod stats;

pub use analyzer::{analyze_serial, BatchCoordinator, BatchResult};
pub use config::{AnalyzeConfig, CliArgs};
pub use error::{AnalyzerError, Result};
pub use log::{classify, parse_line, Record, Region};
pub use report::{Rankings, Report, ReportWriter};
pub use stats::{summarize, Accumulator, Summary};
