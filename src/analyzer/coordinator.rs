//! Batch coordinator - orchestrates the one-worker-per-file analysis
//!
//! The coordinator is responsible for:
//! - Checking the batch preconditions before any file is touched
//! - Spawning exactly one worker per roster file
//! - Waiting for every worker (the barrier), with an optional deadline
//! - Summarizing each file, merging all files, deriving rankings
//! - Persisting the report atomically
//!
//! The batch is all-or-nothing: any worker failure fails the whole run and
//! no report is written. There is no retry and no reassignment.

use crate::analyzer::worker::{analyze_file, Worker, WorkerReport};
use crate::config::AnalyzeConfig;
use crate::error::{ConfigError, Result, WorkerError, WorkerResult};
use crate::report::{derive_rankings, Report, ReportWriter};
use crate::stats::{summarize, Accumulator};
use crossbeam_channel::{unbounded, RecvTimeoutError};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// A roster entry: one log source and the file it is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Name used as the key in the report (the file stem)
    pub name: String,

    /// Input file
    pub path: PathBuf,
}

impl Entity {
    /// Derive the entity for a roster path
    pub fn from_path(path: &Path) -> std::result::Result<Self, ConfigError> {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| ConfigError::UnnamedEntity {
                path: path.to_path_buf(),
            })?;

        Ok(Self {
            name,
            path: path.to_path_buf(),
        })
    }
}

/// Result of a completed batch
#[derive(Debug)]
pub struct BatchResult {
    /// The persisted report
    pub report: Report,

    /// Where it was written
    pub output_path: PathBuf,

    /// Number of workers that ran
    pub workers: usize,

    /// Wall time for fan-out, barrier, reduction and persist
    pub duration: Duration,
}

impl BatchResult {
    /// Records per second over the whole batch
    pub fn requests_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.report.global.total_requests as f64 / secs
        } else {
            0.0
        }
    }
}

/// Coordinates one batch run
pub struct BatchCoordinator {
    /// Configuration
    config: AnalyzeConfig,

    /// Roster in order, with entity names
    entities: Vec<Entity>,
}

impl BatchCoordinator {
    /// Create a coordinator, checking every precondition
    ///
    /// Fails without opening any file if the roster is empty, the declared
    /// worker count differs from the roster length, or two files would
    /// produce the same entity name.
    pub fn new(config: AnalyzeConfig) -> Result<Self> {
        let expected = config.roster.len();
        if expected == 0 {
            return Err(ConfigError::EmptyRoster.into());
        }

        if config.worker_count != expected {
            error!(
                expected = expected,
                actual = config.worker_count,
                "Worker count does not match roster"
            );
            return Err(ConfigError::WorkerCountMismatch {
                expected,
                actual: config.worker_count,
            }
            .into());
        }

        let entities = config
            .roster
            .iter()
            .map(|path| Entity::from_path(path))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut seen: HashMap<&str, &Path> = HashMap::with_capacity(entities.len());
        for entity in &entities {
            if let Some(first) = seen.insert(&entity.name, &entity.path) {
                return Err(ConfigError::DuplicateEntity {
                    name: entity.name.clone(),
                    first: first.to_path_buf(),
                    second: entity.path.clone(),
                }
                .into());
            }
        }

        Ok(Self { config, entities })
    }

    /// Roster entities in order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Run the batch: fan out, gather, reduce, persist
    pub fn run(self) -> Result<BatchResult> {
        let start = Instant::now();

        info!(
            files = self.entities.len(),
            workers = self.config.worker_count,
            output = %self.config.output_path.display(),
            "Starting batch"
        );

        let parts = self.gather()?;
        let report = reduce(&self.entities, &parts, self.config.top_k);

        ReportWriter::new(&self.config.output_path).write(&report)?;

        let duration = start.elapsed();
        info!(
            requests = report.global.total_requests,
            bytes = report.global.total_bytes,
            duration_ms = duration.as_millis() as u64,
            "Batch completed"
        );

        Ok(BatchResult {
            report,
            output_path: self.config.output_path,
            workers: self.entities.len(),
            duration,
        })
    }

    /// Fan out one worker per file and wait for all of them
    ///
    /// Returns the accumulators in roster order. If any worker fails, the
    /// barrier is still drained and the failure with the lowest roster
    /// index is returned. A deadline abandons the remaining workers.
    pub fn gather(&self) -> WorkerResult<Vec<Accumulator>> {
        self.gather_with(analyze_file)
    }

    fn gather_with<F>(&self, analyze: F) -> WorkerResult<Vec<Accumulator>>
    where
        F: Fn(usize, &Path) -> WorkerResult<Accumulator> + Clone + Send + 'static,
    {
        let total = self.entities.len();
        let (tx, rx) = unbounded::<WorkerReport>();

        let mut workers = Vec::with_capacity(total);
        for (id, entity) in self.entities.iter().enumerate() {
            // On spawn failure, already-started workers finish on their own
            // and their sends fail once `rx` is dropped.
            workers.push(Worker::spawn_with(
                id,
                entity.path.clone(),
                tx.clone(),
                analyze.clone(),
            )?);
        }
        drop(tx);
        info!(count = workers.len(), "Workers spawned");

        let deadline = self.config.deadline.map(|d| (d, Instant::now() + d));
        let mut slots: Vec<Option<WorkerResult<Accumulator>>> = (0..total).map(|_| None).collect();
        let mut received = 0;

        while received < total {
            let report = match deadline {
                Some((limit, at)) => match rx.recv_deadline(at) {
                    Ok(report) => report,
                    Err(RecvTimeoutError::Timeout) => {
                        let pending = workers.iter().filter(|w| !w.is_finished()).count();
                        error!(pending = pending, "Batch deadline exceeded");
                        return Err(WorkerError::DeadlineExceeded {
                            limit,
                            pending: total - received,
                            total,
                        });
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                },
                None => match rx.recv() {
                    Ok(report) => report,
                    Err(_) => break,
                },
            };

            match &report.result {
                Ok(acc) => debug!(worker = report.id, requests = acc.requests(), "Worker reported"),
                Err(e) => warn!(worker = report.id, error = %e, "Worker failed"),
            }

            slots[report.id] = Some(report.result);
            received += 1;
        }

        // Every sender is gone, so every thread has exited or is exiting
        for worker in workers {
            let id = worker.id();
            if let Err(e) = worker.join() {
                error!(worker = id, error = %e, "Worker panicked");
                if slots[id].is_none() {
                    slots[id] = Some(Err(e));
                }
            }
        }

        let pending = slots.iter().filter(|slot| slot.is_none()).count();
        let mut parts = Vec::with_capacity(total);
        for slot in slots {
            match slot {
                Some(Ok(acc)) => parts.push(acc),
                Some(Err(e)) => return Err(e),
                None => return Err(WorkerError::ResultChannelClosed { pending }),
            }
        }

        info!(workers = total, "All workers reported");
        Ok(parts)
    }
}

/// Build the report from per-file accumulators in roster order
///
/// # Panics
///
/// If `entities` and `parts` differ in length.
pub fn reduce(entities: &[Entity], parts: &[Accumulator], top_k: usize) -> Report {
    assert_eq!(
        entities.len(),
        parts.len(),
        "one accumulator per roster entity"
    );

    let summaries: Vec<_> = parts.iter().map(|acc| summarize(acc, top_k)).collect();
    let global = Accumulator::merge_all(parts);

    let rankings = derive_rankings(
        entities
            .iter()
            .zip(&summaries)
            .map(|(entity, summary)| (entity.name.as_str(), summary)),
    );

    let per_entity: BTreeMap<String, _> = entities
        .iter()
        .map(|entity| entity.name.clone())
        .zip(summaries)
        .collect();

    Report {
        per_entity,
        global: summarize(&global, top_k),
        rankings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyzerError;
    use std::fs;
    use std::io::Write;
    use tempfile::tempdir;

    fn line(ip: &str, hour: u8, path: &str, status: u16, size: u64) -> String {
        format!(
            "{} - - [10/Oct/2023:{:02}:00:00 +0000] \"GET {} HTTP/1.1\" {} {}\n",
            ip, hour, path, status, size
        )
    }

    fn write_file(dir: &Path, name: &str, lines: &[String]) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        for l in lines {
            file.write_all(l.as_bytes()).unwrap();
        }
        path
    }

    #[test]
    fn test_entity_from_path() {
        let entity = Entity::from_path(Path::new("/logs/server1.log")).unwrap();
        assert_eq!(entity.name, "server1");
        assert!(Entity::from_path(Path::new("/")).is_err());
    }

    #[test]
    fn test_worker_count_mismatch_touches_nothing() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out").join("report.json");
        // files do not exist: a mismatch must be reported before any open
        let config = AnalyzeConfig::new(vec!["missing1.log".into(), "missing2.log".into()], &output)
            .with_workers(3);

        let err = BatchCoordinator::new(config).err().unwrap();
        assert!(matches!(
            err,
            AnalyzerError::Config(ConfigError::WorkerCountMismatch {
                expected: 2,
                actual: 3
            })
        ));
        assert!(!output.exists());
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_empty_roster() {
        let config = AnalyzeConfig::new(Vec::new(), "report.json");
        let err = BatchCoordinator::new(config).err().unwrap();
        assert!(matches!(err, AnalyzerError::Config(ConfigError::EmptyRoster)));
    }

    #[test]
    fn test_duplicate_entity() {
        let config = AnalyzeConfig::new(
            vec!["a/server1.log".into(), "b/server1.log".into()],
            "report.json",
        );
        let err = BatchCoordinator::new(config).err().unwrap();
        assert!(matches!(
            err,
            AnalyzerError::Config(ConfigError::DuplicateEntity { .. })
        ));
    }

    #[test]
    fn test_gather_in_roster_order() {
        let dir = tempdir().unwrap();
        let a = write_file(dir.path(), "a.log", &[line("10.0.0.1", 1, "/x", 200, 1)]);
        let b = write_file(
            dir.path(),
            "b.log",
            &[line("60.0.0.1", 2, "/y", 500, 2), line("60.0.0.2", 2, "/y", 200, 3)],
        );

        let coordinator =
            BatchCoordinator::new(AnalyzeConfig::new(vec![a, b], dir.path().join("r.json"))).unwrap();
        let parts = coordinator.gather().unwrap();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].requests(), 1);
        assert_eq!(parts[1].requests(), 2);
    }

    #[test]
    fn test_missing_file_fails_batch() {
        let dir = tempdir().unwrap();
        let a = write_file(dir.path(), "a.log", &[line("10.0.0.1", 1, "/x", 200, 1)]);
        let missing = dir.path().join("b.log");
        let output = dir.path().join("r.json");

        let coordinator = BatchCoordinator::new(AnalyzeConfig::new(vec![a, missing], &output)).unwrap();
        let err = coordinator.run().unwrap_err();

        assert!(matches!(
            err,
            AnalyzerError::Worker(WorkerError::FileNotFound { id: 1, .. })
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_lowest_index_failure_reported() {
        let dir = tempdir().unwrap();
        let roster = vec![
            dir.path().join("gone0.log"),
            dir.path().join("gone1.log"),
            dir.path().join("gone2.log"),
        ];
        let coordinator = BatchCoordinator::new(AnalyzeConfig::new(roster, dir.path().join("r.json"))).unwrap();
        let err = coordinator.gather().unwrap_err();
        assert_eq!(err.worker_id(), Some(0));
    }

    #[test]
    fn test_reduce() {
        let dir = tempdir().unwrap();
        let a = write_file(
            dir.path(),
            "alpha.log",
            &[line("10.0.0.1", 1, "/x", 200, 1), line("10.0.0.2", 1, "/x", 404, 1)],
        );
        let b = write_file(
            dir.path(),
            "beta.log",
            &[
                line("60.0.0.1", 2, "/y", 200, 2),
                line("60.0.0.2", 2, "/y", 200, 3),
                line("60.0.0.3", 3, "/z", 200, 4),
            ],
        );

        let coordinator =
            BatchCoordinator::new(AnalyzeConfig::new(vec![a, b], dir.path().join("r.json"))).unwrap();
        let parts = coordinator.gather().unwrap();
        let report = reduce(coordinator.entities(), &parts, 5);

        assert_eq!(report.per_entity.len(), 2);
        assert_eq!(report.per_entity["alpha"].total_requests, 2);
        assert_eq!(report.per_entity["beta"].total_requests, 3);
        assert_eq!(report.global.total_requests, 5);
        assert_eq!(report.global.total_bytes, 11);
        assert_eq!(report.rankings.busiest_entity.as_deref(), Some("beta"));
        assert_eq!(report.rankings.highest_error_entity.as_deref(), Some("alpha"));
    }

    #[test]
    #[should_panic(expected = "one accumulator per roster entity")]
    fn test_reduce_rejects_length_mismatch() {
        let entities = [Entity::from_path(Path::new("a.log")).unwrap()];
        reduce(&entities, &[], 5);
    }

    #[cfg(unix)]
    #[test]
    fn test_deadline_fails_batch_without_report() {
        let dir = tempdir().unwrap();
        let fast = write_file(dir.path(), "fast.log", &[line("10.0.0.1", 1, "/x", 200, 1)]);

        // opening a FIFO for reading blocks until a writer appears
        let stuck = dir.path().join("stuck.log");
        let status = std::process::Command::new("mkfifo").arg(&stuck).status().unwrap();
        assert!(status.success());

        let output = dir.path().join("r.json");
        let config = AnalyzeConfig::new(vec![fast, stuck], &output)
            .with_deadline(Duration::from_millis(300));

        let start = Instant::now();
        let err = BatchCoordinator::new(config).unwrap().run().unwrap_err();

        assert!(start.elapsed() >= Duration::from_millis(300));
        match &err {
            AnalyzerError::Worker(WorkerError::DeadlineExceeded { limit, pending, total }) => {
                assert_eq!(*limit, Duration::from_millis(300));
                assert_eq!(*pending, 1);
                assert_eq!(*total, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("300ms"));
        assert!(!output.exists());
    }

    #[test]
    fn test_worker_panic_fails_batch() {
        let dir = tempdir().unwrap();
        let a = write_file(dir.path(), "a.log", &[line("10.0.0.1", 1, "/x", 200, 1)]);
        let b = write_file(dir.path(), "b.log", &[line("10.0.0.2", 1, "/x", 200, 1)]);

        let coordinator =
            BatchCoordinator::new(AnalyzeConfig::new(vec![a, b], dir.path().join("r.json"))).unwrap();
        let err = coordinator
            .gather_with(|id, path| {
                if id == 1 {
                    panic!("worker {} lost its mind", id);
                }
                analyze_file(id, path)
            })
            .unwrap_err();

        assert!(matches!(
            err,
            WorkerError::Panicked { id: 1, ref message } if message.contains("lost its mind")
        ));
    }

    #[test]
    fn test_batch_result_rate() {
        let result = BatchResult {
            report: reduce(&[], &[], 5),
            output_path: PathBuf::from("r.json"),
            workers: 0,
            duration: Duration::from_secs(0),
        };
        assert_eq!(result.requests_per_second(), 0.0);
        assert_eq!(result.report.rankings.busiest_entity, None);
    }
}
