//! Read-only projection of an accumulator
//!
//! Tie-breaks are fixed so that equal inputs always produce identical
//! summaries regardless of hash map iteration order:
//! - `peak_hour`: the lowest hour among those with the maximum count
//! - `top_paths`: count descending, then path ascending (byte order)

use crate::log::types::Region;
use crate::stats::accumulator::{Accumulator, HOURS_PER_DAY};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Default number of entries in `top_paths`
pub const DEFAULT_TOP_K: usize = 5;

/// One ranked path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathCount {
    pub path: String,
    pub count: u64,
}

/// Reporting view of an accumulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_requests: u64,
    pub total_bytes: u64,

    /// errors / requests, 0.0 when there are no requests
    pub error_rate: f64,

    pub status_breakdown: BTreeMap<u16, u64>,
    pub method_breakdown: BTreeMap<String, u64>,

    /// Only regions that were observed
    pub region_distribution: BTreeMap<Region, u64>,

    /// All 24 hours, zero-filled
    pub hour_histogram: BTreeMap<u8, u64>,

    /// None when there are no requests
    pub peak_hour: Option<u8>,

    pub top_paths: Vec<PathCount>,
}

impl Summary {
    /// True if the summarized scope had no requests
    pub fn is_empty(&self) -> bool {
        self.total_requests == 0
    }
}

/// Summarize an accumulator, keeping at most `top_k` paths
pub fn summarize(acc: &Accumulator, top_k: usize) -> Summary {
    let total = acc.requests();
    let error_rate = if total == 0 {
        0.0
    } else {
        acc.errors() as f64 / total as f64
    };

    let region_distribution = Region::ALL
        .into_iter()
        .map(|region| (region, acc.region_count(region)))
        .filter(|(_, count)| *count > 0)
        .collect();

    let hour_histogram = acc
        .hours()
        .iter()
        .enumerate()
        .map(|(hour, count)| (hour as u8, *count))
        .collect();

    Summary {
        total_requests: total,
        total_bytes: acc.bytes(),
        error_rate,
        status_breakdown: acc.statuses().iter().map(|(s, c)| (*s, *c)).collect(),
        method_breakdown: acc.methods().iter().map(|(m, c)| (m.clone(), *c)).collect(),
        region_distribution,
        hour_histogram,
        peak_hour: peak_hour(acc.hours()),
        top_paths: top_paths(acc, top_k),
    }
}

fn peak_hour(hours: &[u64; HOURS_PER_DAY]) -> Option<u8> {
    let mut best: Option<(usize, u64)> = None;
    for (hour, &count) in hours.iter().enumerate() {
        if count == 0 {
            continue;
        }
        // strict > keeps the earliest hour on ties
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((hour, count));
        }
    }
    best.map(|(hour, _)| hour as u8)
}

fn top_paths(acc: &Accumulator, top_k: usize) -> Vec<PathCount> {
    let mut ranked: Vec<(&String, u64)> = acc.paths().iter().map(|(p, c)| (p, *c)).collect();
    ranked.sort_unstable_by_key(|&(path, count)| (Reverse(count), path));
    ranked.truncate(top_k);

    ranked
        .into_iter()
        .map(|(path, count)| PathCount {
            path: path.clone(),
            count,
        })
        .collect()
}
