//! Access log record types
//!
//! A `Record` exists only between a successful parse and its absorption
//! into an accumulator. `Region` is never stored on a record; it is derived
//! from the address whenever it is needed.

use chrono::{DateTime, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse geographic bucket derived from the first address octet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "North America")]
    NorthAmerica,
    #[serde(rename = "Europe")]
    Europe,
    #[serde(rename = "Asia")]
    Asia,
    #[serde(rename = "Africa")]
    Africa,
    #[serde(rename = "Other")]
    Other,
}

impl Region {
    /// Number of regions
    pub const COUNT: usize = 5;

    /// All regions in index order
    pub const ALL: [Region; Region::COUNT] = [
        Region::NorthAmerica,
        Region::Europe,
        Region::Asia,
        Region::Africa,
        Region::Other,
    ];

    /// Dense index used by fixed-size histograms
    pub fn index(self) -> usize {
        self as usize
    }

    /// Human-readable name, as written in reports
    pub fn as_str(self) -> &'static str {
        match self {
            Region::NorthAmerica => "North America",
            Region::Europe => "Europe",
            Region::Asia => "Asia",
            Region::Africa => "Africa",
            Region::Other => "Other",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| s.to_string())
    }
}

/// One successfully parsed access log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Client address (dotted quad)
    pub address: String,

    /// Request time with the offset it was logged in
    pub timestamp: DateTime<FixedOffset>,

    /// HTTP method token
    pub method: String,

    /// Request path
    pub path: String,

    /// HTTP status, 100..=599
    pub status: u16,

    /// Response size in bytes
    pub size: u64,
}

impl Record {
    /// Hour of day (0..=23) in the record's own offset
    pub fn hour(&self) -> u8 {
        // hour() is always < 24
        self.timestamp.hour() as u8
    }

    /// True for 4xx and 5xx responses
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// Region derived from the address
    pub fn region(&self) -> Region {
        super::region::classify(&self.address)
    }
}
