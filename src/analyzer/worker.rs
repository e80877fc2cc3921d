//! Worker thread logic for per-file analysis
//!
//! Each worker:
//! - Owns exactly one input file, assigned by roster position
//! - Streams it forward once, line by line
//! - Absorbs every parseable record into its own local accumulator
//! - Sends the accumulator (or its failure) to the coordinator, once
//!
//! Workers never talk to each other and share no mutable state.

use crate::error::{WorkerError, WorkerResult};
use crate::log::reader::{for_each_record, READ_BUFFER_SIZE};
use crate::stats::Accumulator;
use crossbeam_channel::Sender;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Message a worker sends to the coordinator when it finishes
#[derive(Debug)]
pub struct WorkerReport {
    /// Roster index of the worker
    pub id: usize,

    /// Local accumulator, or why the file could not be analyzed
    pub result: WorkerResult<Accumulator>,
}

/// A worker thread analyzing one log file
pub struct Worker {
    /// Worker ID (roster index)
    id: usize,

    /// Assigned file
    path: PathBuf,

    /// Thread handle
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn a worker for `path`; its result arrives on `results`
    pub fn spawn(id: usize, path: PathBuf, results: Sender<WorkerReport>) -> WorkerResult<Self> {
        Self::spawn_with(id, path, results, analyze_file)
    }

    /// Spawn a worker that runs `analyze` over `path`
    pub(crate) fn spawn_with<F>(
        id: usize,
        path: PathBuf,
        results: Sender<WorkerReport>,
        analyze: F,
    ) -> WorkerResult<Self>
    where
        F: FnOnce(usize, &Path) -> WorkerResult<Accumulator> + Send + 'static,
    {
        let thread_path = path.clone();

        let handle = thread::Builder::new()
            .name(format!("analyzer-{}", id))
            .spawn(move || {
                let result = analyze(id, &thread_path);
                if results.send(WorkerReport { id, result }).is_err() {
                    // Coordinator gave up (deadline); nothing left to do
                    debug!(worker = id, "Result receiver dropped");
                }
            })
            .map_err(|e| WorkerError::SpawnFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            path,
            handle: Some(handle),
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get the assigned file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True once the thread has exited
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the worker thread to exit
    pub fn join(mut self) -> WorkerResult<()> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|payload| WorkerError::Panicked {
                id: self.id,
                message: panic_message(payload.as_ref()),
            }),
            None => Ok(()),
        }
    }
}

/// Analyze one file into a fresh accumulator
///
/// Memory use is bounded by the number of distinct keys seen, not by
/// file length: the file is never buffered whole.
pub fn analyze_file(id: usize, path: &Path) -> WorkerResult<Accumulator> {
    let start = Instant::now();
    info!(worker = id, path = %path.display(), "Worker starting");

    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => WorkerError::FileNotFound {
            id,
            path: path.to_path_buf(),
        },
        _ => WorkerError::Read {
            id,
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let mut acc = Accumulator::new();
    let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

    for_each_record(reader, |record| {
        acc.absorb(&record);
        ControlFlow::Continue(())
    })
    .map_err(|e| {
        warn!(worker = id, path = %path.display(), error = %e, "Read failed");
        WorkerError::Read {
            id,
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    debug_assert!(acc.is_consistent());

    info!(
        worker = id,
        requests = acc.requests(),
        bytes = acc.bytes(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Worker finished"
    );

    Ok(acc)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Worker thread panicked".into()
    }
}
