//! Access log input
//!
//! Turns raw lines into typed records:
//!
//! ```text
//! raw line ──► parse_line ──► Record ──► classify(address) ──► Region
//!                  │
//!                  └── LineError (dropped by callers, never counted)
//! ```
//!
//! # Example
//!
//! ```
//! use weblog_stats::log::{classify, parse_line, Region};
//!
//! let line = r#"10.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "GET /health HTTP/1.1" 200 512"#;
//! let record = parse_line(line).unwrap();
//! assert_eq!(record.path, "/health");
//! assert_eq!(classify(&record.address), Region::NorthAmerica);
//! ```

pub mod parser;
pub mod reader;
pub mod region;
pub mod types;

pub use parser::parse_line;
pub use reader::for_each_record;
pub use region::classify;
pub use types::{Record, Region};
