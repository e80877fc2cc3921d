//! Statistics aggregation
//!
//! ```text
//! Record ──absorb──► Accumulator ──merge──► Accumulator ──summarize──► Summary
//!                    (per file)             (global)
//! ```

pub mod accumulator;
pub mod summary;

pub use accumulator::{Accumulator, HOURS_PER_DAY};
pub use summary::{summarize, PathCount, Summary, DEFAULT_TOP_K};
