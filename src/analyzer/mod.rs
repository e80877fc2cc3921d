//! Batch analysis
//!
//! This module implements the rigid one-worker-per-file batch: a fixed
//! roster of F files is analyzed by exactly F worker threads, and the
//! coordinator blocks until all of them have reported.
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │    BatchCoordinator     │
//!                     │  - precondition checks  │
//!                     │  - roster → workers 1:1 │
//!                     └───────────┬─────────────┘
//!                                 │ spawn
//!       ┌─────────────────────────┼─────────────────────────┐
//!       │                         │                         │
//! ┌─────▼─────┐             ┌─────▼─────┐             ┌─────▼─────┐
//! │  Worker 0 │             │  Worker 1 │             │  Worker N │
//! │  file 0   │             │  file 1   │             │  file N   │
//! │  local acc│             │  local acc│             │  local acc│
//! └─────┬─────┘             └─────┬─────┘             └─────┬─────┘
//!       │                         │                         │
//!       └─────────────────────────┼─────────────────────────┘
//!                                 │ results channel (barrier)
//!                     ┌───────────▼─────────────┐
//!                     │  reduce: summarize each │
//!                     │  merge all, rankings    │
//!                     └───────────┬─────────────┘
//!                                 ▼
//!                       atomic report write
//! ```

pub mod coordinator;
pub mod serial;
pub mod worker;

pub use coordinator::{reduce, BatchCoordinator, BatchResult, Entity};
pub use serial::{analyze_serial, analyze_serial_raw};
pub use worker::{analyze_file, Worker, WorkerReport};
