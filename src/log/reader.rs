//! Streaming record reader
//!
//! Reads a log forward exactly once, one line at a time, reusing a single
//! line buffer. Lines that are not valid UTF-8 or fail to parse are dropped
//! without being counted or logged.

use crate::log::parser::parse_line;
use crate::log::types::Record;
use std::io::{self, BufRead};
use std::ops::ControlFlow;

/// Read buffer size for log files
pub const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Feed every parseable record to `visit` until EOF or `ControlFlow::Break`
pub fn for_each_record<R, F>(mut reader: R, mut visit: F) -> io::Result<()>
where
    R: BufRead,
    F: FnMut(Record) -> ControlFlow<()>,
{
    let mut line = Vec::with_capacity(256);

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(());
        }

        let Ok(text) = std::str::from_utf8(&line) else {
            continue;
        };

        if let Ok(record) = parse_line(text) {
            if visit(record).is_break() {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_skips_bad_lines() {
        let mut input = Vec::new();
        input.extend_from_slice(
            b"10.0.0.1 - - [10/Oct/2023:13:55:36 +0000] \"GET /a HTTP/1.1\" 200 1\n",
        );
        input.extend_from_slice(b"garbage line\n");
        input.extend_from_slice(b"\xff\xfe not utf8\n");
        input.extend_from_slice(b"\n");
        // last line without trailing newline
        input.extend_from_slice(
            b"60.0.0.1 - - [10/Oct/2023:14:00:00 +0000] \"POST /b HTTP/1.1\" 404 2",
        );

        let mut paths = Vec::new();
        for_each_record(Cursor::new(input), |record| {
            paths.push(record.path);
            ControlFlow::Continue(())
        })
        .unwrap();

        assert_eq!(paths, vec!["/a", "/b"]);
    }

    #[test]
    fn test_break_stops_reading() {
        let line = "10.0.0.1 - - [10/Oct/2023:13:55:36 +0000] \"GET /a HTTP/1.1\" 200 1\n";
        let input = line.repeat(10);

        let mut seen = 0;
        for_each_record(Cursor::new(input), |_| {
            seen += 1;
            if seen == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();

        assert_eq!(seen, 3);
    }
}
