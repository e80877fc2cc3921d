//! Commutative statistics accumulator
//!
//! An `Accumulator` is the aggregate for one scope: a single log file, or
//! the merge of several. It is built by `absorb`ing records and combined by
//! `merge`, and together with `Accumulator::new()` as the identity these form
//! a commutative monoid. Because of that, the global accumulator can be
//! folded from per-file accumulators in any order or grouping and still
//! equal a single pass over the concatenated input.
//!
//! Invariants (checked by `is_consistent`):
//! - `requests` equals the sum of every histogram's counts
//! - `errors <= requests`
//! - `bytes` never decreases

use crate::log::types::{Record, Region};
use std::collections::HashMap;

/// Number of hour buckets
pub const HOURS_PER_DAY: usize = 24;

/// Aggregated request statistics for one scope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accumulator {
    requests: u64,
    bytes: u64,
    errors: u64,
    statuses: HashMap<u16, u64>,
    paths: HashMap<String, u64>,
    methods: HashMap<String, u64>,
    regions: [u64; Region::COUNT],
    hours: [u64; HOURS_PER_DAY],
}

impl Accumulator {
    /// Empty accumulator (the merge identity)
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into the aggregate
    pub fn absorb(&mut self, record: &Record) {
        self.requests += 1;
        self.bytes = self.bytes.saturating_add(record.size);
        *self.statuses.entry(record.status).or_insert(0) += 1;
        bump(&mut self.paths, &record.path);
        bump(&mut self.methods, &record.method);
        self.regions[record.region().index()] += 1;
        self.hours[usize::from(record.hour())] += 1;

        if record.is_error() {
            self.errors += 1;
        }
    }

    /// Add another accumulator's counts into this one
    pub fn merge_from(&mut self, other: &Accumulator) {
        self.requests += other.requests;
        self.bytes = self.bytes.saturating_add(other.bytes);
        self.errors += other.errors;

        for (status, count) in &other.statuses {
            *self.statuses.entry(*status).or_insert(0) += count;
        }
        for (path, count) in &other.paths {
            add_count(&mut self.paths, path, *count);
        }
        for (method, count) in &other.methods {
            add_count(&mut self.methods, method, *count);
        }
        for (mine, theirs) in self.regions.iter_mut().zip(other.regions) {
            *mine += theirs;
        }
        for (mine, theirs) in self.hours.iter_mut().zip(other.hours) {
            *mine += theirs;
        }
    }

    /// Merge two accumulators into a new one
    pub fn merge(mut self, other: &Accumulator) -> Accumulator {
        self.merge_from(other);
        self
    }

    /// Merge any number of accumulators, starting from the identity
    pub fn merge_all<'a, I>(parts: I) -> Accumulator
    where
        I: IntoIterator<Item = &'a Accumulator>,
    {
        parts.into_iter().fold(Accumulator::new(), Accumulator::merge)
    }

    /// Total successfully parsed requests
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Sum of response sizes
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Requests with status >= 400
    pub fn errors(&self) -> u64 {
        self.errors
    }

    /// True if nothing has been absorbed
    pub fn is_empty(&self) -> bool {
        self.requests == 0
    }

    /// Counts per status code
    pub fn statuses(&self) -> &HashMap<u16, u64> {
        &self.statuses
    }

    /// Counts per request path
    pub fn paths(&self) -> &HashMap<String, u64> {
        &self.paths
    }

    /// Counts per HTTP method
    pub fn methods(&self) -> &HashMap<String, u64> {
        &self.methods
    }

    /// Count for one region
    pub fn region_count(&self, region: Region) -> u64 {
        self.regions[region.index()]
    }

    /// Counts per hour of day, index 0..=23
    pub fn hours(&self) -> &[u64; HOURS_PER_DAY] {
        &self.hours
    }

    /// Check the structural invariants
    pub fn is_consistent(&self) -> bool {
        let n = self.requests;
        self.errors <= n
            && self.statuses.values().sum::<u64>() == n
            && self.paths.values().sum::<u64>() == n
            && self.methods.values().sum::<u64>() == n
            && self.regions.iter().sum::<u64>() == n
            && self.hours.iter().sum::<u64>() == n
    }
}

impl<'a> Extend<&'a Record> for Accumulator {
    fn extend<T: IntoIterator<Item = &'a Record>>(&mut self, records: T) {
        for record in records {
            self.absorb(record);
        }
    }
}

fn bump(map: &mut HashMap<String, u64>, key: &str) {
    add_count(map, key, 1);
}

// Avoids allocating a key String when the bucket already exists
fn add_count(map: &mut HashMap<String, u64>, key: &str, count: u64) {
    if let Some(slot) = map.get_mut(key) {
        *slot += count;
    } else {
        map.insert(key.to_string(), count);
    }
}
