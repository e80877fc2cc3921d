//! Batch report and its persistence
//!
//! The report is the only contract with downstream consumers. It is
//! written once per run and replaced atomically: serialize in memory,
//! write a temporary file next to the target, fsync, then rename over the
//! target. A reader polling the file never sees a truncated document, and
//! a failed run leaves the previous report untouched.

use crate::error::{ReportError, ReportResult};
use crate::stats::Summary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Entities that stand out across the batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rankings {
    /// Entity with the most requests
    pub busiest_entity: Option<String>,

    /// Entity with the highest error rate
    pub highest_error_entity: Option<String>,
}

/// Result of one batch run
///
/// `per_entity` serializes in entity-name order, not roster order. Roster
/// order only matters for ranking ties, which are resolved before the
/// report is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// One summary per roster file, keyed by entity name
    pub per_entity: BTreeMap<String, Summary>,

    /// Summary of all files merged
    pub global: Summary,

    pub rankings: Rankings,
}

impl Report {
    /// Load a persisted report
    pub fn load(path: &Path) -> ReportResult<Self> {
        let data = fs::read(path).map_err(|source| ReportError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_slice(&data)?)
    }
}

/// Derive rankings from summaries given in roster order
///
/// Only entities with at least one request are candidates. Ties go to the
/// entity that comes first in the roster.
pub fn derive_rankings<'a, I>(entities: I) -> Rankings
where
    I: IntoIterator<Item = (&'a str, &'a Summary)>,
{
    let mut busiest: Option<(&str, u64)> = None;
    let mut highest_error: Option<(&str, f64)> = None;

    for (name, summary) in entities {
        if summary.total_requests == 0 {
            continue;
        }

        if busiest.map_or(true, |(_, best)| summary.total_requests > best) {
            busiest = Some((name, summary.total_requests));
        }

        if highest_error.map_or(true, |(_, best)| summary.error_rate > best) {
            highest_error = Some((name, summary.error_rate));
        }
    }

    Rankings {
        busiest_entity: busiest.map(|(name, _)| name.to_string()),
        highest_error_entity: highest_error.map(|(name, _)| name.to_string()),
    }
}

/// Atomic JSON writer for a single report file
#[derive(Debug, Clone)]
pub struct ReportWriter {
    path: PathBuf,
}

impl ReportWriter {
    /// Writer targeting `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Temporary path used while writing, in the target's directory
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Serialize `value` and atomically replace the target with it
    pub fn write<T: Serialize>(&self, value: &T) -> ReportResult<()> {
        // Serialize first so an encoding failure touches nothing on disk
        let json = serde_json::to_vec_pretty(value)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| ReportError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let tmp = self.temp_path();
        if let Err(source) = write_synced(&tmp, &json) {
            let _ = fs::remove_file(&tmp);
            return Err(ReportError::WriteTemp { path: tmp, source });
        }
        debug!(path = %tmp.display(), bytes = json.len(), "Temporary report written");

        if let Err(source) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(ReportError::Rename {
                from: tmp,
                to: self.path.clone(),
                source,
            });
        }

        info!(path = %self.path.display(), "Report persisted");
        Ok(())
    }
}

fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{summarize, Accumulator};
    use tempfile::tempdir;

    fn summary_with(total: u64, error_rate: f64) -> Summary {
        let mut summary = summarize(&Accumulator::new(), 5);
        summary.total_requests = total;
        summary.error_rate = error_rate;
        summary
    }

    fn sample_report() -> Report {
        let a = summary_with(10, 0.1);
        let mut per_entity = BTreeMap::new();
        per_entity.insert("server1".to_string(), a.clone());
        Report {
            per_entity,
            global: a,
            rankings: Rankings {
                busiest_entity: Some("server1".into()),
                highest_error_entity: Some("server1".into()),
            },
        }
    }

    #[test]
    fn test_rankings() {
        let a = summary_with(100, 0.05);
        let b = summary_with(300, 0.01);
        let c = summary_with(50, 0.20);
        let rankings = derive_rankings([("a", &a), ("b", &b), ("c", &c)]);
        assert_eq!(rankings.busiest_entity.as_deref(), Some("b"));
        assert_eq!(rankings.highest_error_entity.as_deref(), Some("c"));
    }

    #[test]
    fn test_rankings_ties_follow_roster_order() {
        let a = summary_with(100, 0.5);
        let b = summary_with(100, 0.5);
        let rankings = derive_rankings([("second", &b), ("first", &a)]);
        assert_eq!(rankings.busiest_entity.as_deref(), Some("second"));
        assert_eq!(rankings.highest_error_entity.as_deref(), Some("second"));
    }

    #[test]
    fn test_rankings_skip_empty_entities() {
        let empty = summary_with(0, 0.0);
        let rankings = derive_rankings([("idle", &empty)]);
        assert_eq!(rankings, Rankings::default());

        // an entity with zero errors still ranks when it is the only candidate
        let quiet = summary_with(5, 0.0);
        let rankings = derive_rankings([("idle", &empty), ("quiet", &quiet)]);
        assert_eq!(rankings.highest_error_entity.as_deref(), Some("quiet"));
    }

    #[test]
    fn test_write_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports").join("summary.json");
        let writer = ReportWriter::new(&path);

        let report = sample_report();
        writer.write(&report).unwrap();

        assert!(path.exists());
        assert!(!writer.temp_path().exists());
        assert_eq!(Report::load(&path).unwrap(), report);
    }

    #[test]
    fn test_write_replaces_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("summary.json");
        fs::write(&path, b"old").unwrap();

        ReportWriter::new(&path).write(&sample_report()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"per_entity\""));
        assert!(text.contains("\"busiest_entity\": \"server1\""));
    }

    #[test]
    fn test_failed_write_keeps_previous() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("summary.json");
        fs::write(&path, b"previous").unwrap();

        // a directory squatting on the temp path makes the write fail
        let writer = ReportWriter::new(&path);
        fs::create_dir(writer.temp_path()).unwrap();

        let err = writer.write(&sample_report()).unwrap_err();
        assert!(matches!(err, ReportError::WriteTemp { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous");
    }

    #[test]
    fn test_load_preserves_awkward_error_rate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("summary.json");

        let mut report = sample_report();
        report.global = summary_with(94, 46.0 / 94.0);
        ReportWriter::new(&path).write(&report).unwrap();

        let loaded = Report::load(&path).unwrap();
        assert_eq!(loaded.global.error_rate.to_bits(), (46.0f64 / 94.0).to_bits());
        assert_eq!(loaded, report);
    }

    #[test]
    fn test_entities_serialize_by_name() {
        let mut per_entity = BTreeMap::new();
        per_entity.insert("zeta".to_string(), summary_with(1, 0.0));
        per_entity.insert("alpha".to_string(), summary_with(2, 0.0));
        let report = Report {
            per_entity,
            global: summary_with(3, 0.0),
            rankings: Rankings::default(),
        };

        let text = serde_json::to_string(&report).unwrap();
        let alpha = text.find("\"alpha\"").unwrap();
        let zeta = text.find("\"zeta\"").unwrap();
        assert!(alpha < zeta);
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let writer = ReportWriter::new("/var/reports/summary.json");
        assert_eq!(writer.temp_path(), PathBuf::from("/var/reports/summary.json.tmp"));
    }

    #[test]
    fn test_load_missing() {
        let dir = tempdir().unwrap();
        let err = Report::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ReportError::Read { .. }));
    }
}
