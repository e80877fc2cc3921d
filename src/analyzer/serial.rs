//! Single-threaded reference analyzer
//!
//! Analyzes every roster file in order on the calling thread and merges
//! them into one accumulator. It produces only the global view, and is the
//! baseline the parallel batch must agree with.

use crate::analyzer::worker::analyze_file;
use crate::error::WorkerResult;
use crate::stats::{summarize, Accumulator, Summary};
use std::path::PathBuf;
use tracing::info;

/// Merge every file in `roster` into one accumulator, in order
pub fn analyze_serial_raw(roster: &[PathBuf]) -> WorkerResult<Accumulator> {
    let mut merged = Accumulator::new();
    for (id, path) in roster.iter().enumerate() {
        merged.merge_from(&analyze_file(id, path)?);
    }

    info!(
        files = roster.len(),
        requests = merged.requests(),
        "Serial analysis complete"
    );
    Ok(merged)
}

/// Global summary of every file in `roster`
pub fn analyze_serial(roster: &[PathBuf], top_k: usize) -> WorkerResult<Summary> {
    analyze_serial_raw(roster).map(|acc| summarize(&acc, top_k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkerError;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_serial_merges_all_files() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.log");
        let b = dir.path().join("b.log");
        fs::write(
            &a,
            "10.0.0.1 - - [10/Oct/2023:01:00:00 +0000] \"GET /x HTTP/1.1\" 200 5\n",
        )
        .unwrap();
        fs::write(
            &b,
            "60.0.0.1 - - [10/Oct/2023:02:00:00 +0000] \"GET /x HTTP/1.1\" 500 7\n",
        )
        .unwrap();

        let summary = analyze_serial(&[a, b], 5).unwrap();
        assert_eq!(summary.total_requests, 2);
        assert_eq!(summary.total_bytes, 12);
        assert!((summary.error_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(summary.top_paths[0].count, 2);
    }

    #[test]
    fn test_serial_missing_file() {
        let dir = tempdir().unwrap();
        let err = analyze_serial(&[dir.path().join("missing.log")], 5).unwrap_err();
        assert!(matches!(err, WorkerError::FileNotFound { .. }));
    }
}
