//! Filtered raw-record scan of a single log file
//!
//! Re-reads one file on demand and returns the records that match every
//! set filter, within a bounded window. Unparseable lines are skipped
//! exactly as they are during analysis.

use crate::error::{ConfigError, QueryError, QueryResult};
use crate::log::reader::{for_each_record, READ_BUFFER_SIZE};
use crate::log::types::{Record, Region};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::ops::ControlFlow;
use std::path::Path;

/// Default window size
pub const DEFAULT_LIMIT: usize = 200;

/// Largest window size; larger requests are clamped
pub const MAX_LIMIT: usize = 2000;

/// Record filters; unset fields match everything
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Prefix of the decimal status code ("4" matches 4xx, "40" matches 400-409)
    pub status_class: Option<String>,

    /// Exact method
    pub method: Option<String>,

    /// Region of the client address
    pub region: Option<Region>,

    /// Substring of the path
    pub path_contains: Option<String>,
}

impl RecordFilter {
    /// Build a filter from optional string parameters
    pub fn from_params(
        status_class: Option<String>,
        method: Option<String>,
        region: Option<&str>,
        path_contains: Option<String>,
    ) -> QueryResult<Self> {
        let region = region
            .filter(|r| !r.is_empty())
            .map(|r| r.parse::<Region>().map_err(QueryError::UnknownRegion))
            .transpose()?;

        Ok(Self {
            status_class: status_class.filter(|s| !s.is_empty()),
            method: method.filter(|m| !m.is_empty()),
            region,
            path_contains: path_contains.filter(|p| !p.is_empty()),
        })
    }

    /// True if the record passes every set filter
    pub fn matches(&self, record: &Record, region: Region) -> bool {
        if let Some(prefix) = &self.status_class {
            if !record.status.to_string().starts_with(prefix.as_str()) {
                return false;
            }
        }
        if let Some(method) = &self.method {
            if record.method != *method {
                return false;
            }
        }
        if let Some(wanted) = self.region {
            if region != wanted {
                return false;
            }
        }
        if let Some(needle) = &self.path_contains {
            if !record.path.contains(needle.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Result window over the matching records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    offset: usize,
    limit: usize,
}

impl Window {
    /// Window skipping `offset` matches and returning at most `limit`
    /// (clamped to `MAX_LIMIT`)
    pub fn new(offset: usize, limit: usize) -> Result<Self, ConfigError> {
        if limit == 0 {
            return Err(ConfigError::InvalidLimit {
                limit,
                max: MAX_LIMIT,
            });
        }
        Ok(Self {
            offset,
            limit: limit.min(MAX_LIMIT),
        })
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for Window {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One record as returned to query consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordView {
    pub ip: String,
    /// RFC 3339 with the logged offset
    pub time: String,
    pub method: String,
    pub path: String,
    pub status: u16,
    pub bytes: u64,
    pub region: Region,
}

impl RecordView {
    fn new(record: Record, region: Region) -> Self {
        Self {
            ip: record.address,
            time: record.timestamp.to_rfc3339(),
            method: record.method,
            path: record.path,
            status: record.status,
            bytes: record.size,
            region,
        }
    }
}

/// One page of query results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPage {
    pub items: Vec<RecordView>,
    pub count: usize,
    pub offset: usize,
    pub limit: usize,
}

/// Scan `path` and return the window of matching records
pub fn scan_file(path: &Path, filter: &RecordFilter, window: Window) -> QueryResult<QueryPage> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => QueryError::NotFound(path.to_path_buf()),
        _ => QueryError::Read {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let mut items = Vec::new();
    let mut skipped = 0;

    for_each_record(BufReader::with_capacity(READ_BUFFER_SIZE, file), |record| {
        let region = record.region();
        if !filter.matches(&record, region) {
            return ControlFlow::Continue(());
        }
        if skipped < window.offset {
            skipped += 1;
            return ControlFlow::Continue(());
        }
        items.push(RecordView::new(record, region));
        if items.len() >= window.limit {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })
    .map_err(|e| QueryError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(QueryPage {
        count: items.len(),
        items,
        offset: window.offset,
        limit: window.limit,
    })
}
