//! Access log line parser
//!
//! Grammar (one request per line):
//!
//! ```text
//! <addr> - - [<DD>/<Mon>/<YYYY>:<HH>:<MM>:<SS> <+-HHMM>] "<METHOD> <path> HTTP/1.1" <status> <size>
//! ```
//!
//! Both the structural match and the timestamp parse must succeed. A line
//! that fails either never yields a partial record. Leading and trailing
//! whitespace is ignored, and anything after the size field is ignored.

use crate::error::LineError;
use crate::log::types::Record;
use chrono::DateTime;
use regex::Regex;
use std::sync::LazyLock;

/// strftime format of the bracketed timestamp
const TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Regex for the structural part of a line
static LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<addr>[0-9]+\.[0-9]+\.[0-9]+\.[0-9]+)\s+-\s+-\s+",
        r"\[(?P<time>[^\]]+)\]\s+",
        r#""(?P<method>[A-Z]+)\s+(?P<path>\S+)\s+HTTP/1\.1"\s+"#,
        r"(?P<status>[0-9]{3})\s+(?P<size>[0-9]+)",
    ))
    .expect("Invalid access log regex")
});

/// Parse one raw line into a `Record`
pub fn parse_line(line: &str) -> Result<Record, LineError> {
    let caps = LINE_REGEX.captures(line.trim()).ok_or(LineError::Malformed)?;

    // All groups are mandatory in the pattern, so a match has every one
    let group = |name: &str| caps.name(name).map(|m| m.as_str()).ok_or(LineError::Malformed);

    let time = group("time")?;
    let timestamp = DateTime::parse_from_str(time, TIMESTAMP_FORMAT)
        .map_err(|_| LineError::BadTimestamp(time.to_string()))?;

    let status: u16 = group("status")?.parse().map_err(|_| LineError::Malformed)?;
    if !(100..=599).contains(&status) {
        return Err(LineError::StatusOutOfRange(status));
    }

    let size_str = group("size")?;
    let size: u64 = size_str
        .parse()
        .map_err(|_| LineError::SizeOverflow(size_str.to_string()))?;

    Ok(Record {
        address: group("addr")?.to_string(),
        timestamp,
        method: group("method")?.to_string(),
        path: group("path")?.to_string(),
        status,
        size,
    })
}
