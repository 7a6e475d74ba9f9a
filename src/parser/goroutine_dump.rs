//! Goroutine dump scanner.
//!
//! Splits a line-oriented dump into goroutine blocks. A block starts at a
//! header line (see [`super::header`]) and runs until a blank line or the
//! end of input. Everything between is kept verbatim in the record body.

use super::header::{decode_header, is_header};
use super::schema::{ParseStats, StackDump, StackTraceRecord};
use crate::utils::error::ParseError;
use log::{debug, warn};
use std::io::BufRead;

/// What to do with a header that fails to decode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Stop at the first malformed header and return its error
    #[default]
    FailFast,
    /// Drop the malformed block, count it, and keep going
    SkipMalformed,
}

/// Block currently being assembled
enum Block {
    /// Between blocks, or before the first header
    Idle,
    Open(StackTraceRecord),
    /// Body lines of a header that was skipped
    Discarding,
}

/// Parse a goroutine dump
///
/// **Public** - main entry point for parsing
///
/// The reader is consumed and dropped before this returns, on success and
/// on error alike.
///
/// # Errors
/// * Any header decoding error in `ParseMode::FailFast`
/// * `ParseError::Io` - reading the stream failed
pub fn parse_dump<R: BufRead>(reader: R, mode: ParseMode) -> Result<StackDump, ParseError> {
    let mut records = Vec::new();
    let mut stats = ParseStats::default();
    let mut block = Block::Idle;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        let line_no = index + 1;
        stats.lines += 1;

        if line.is_empty() {
            if let Block::Open(record) = std::mem::replace(&mut block, Block::Idle) {
                records.push(record);
            }
            continue;
        }

        if is_header(line) {
            // A header without a blank line before it still closes the previous block
            if let Block::Open(record) = std::mem::replace(&mut block, Block::Idle) {
                records.push(record);
            }

            block = match decode_header(line, line_no) {
                Ok(record) => Block::Open(record),
                Err(e) if mode == ParseMode::SkipMalformed => {
                    warn!("Skipping malformed goroutine: {}", e);
                    stats.skipped_headers += 1;
                    Block::Discarding
                }
                Err(e) => return Err(e),
            };
            continue;
        }

        match &mut block {
            Block::Open(record) => {
                record.body.push('\n');
                record.body.push_str(line);
            }
            Block::Idle => {
                debug!("Ignoring line {} outside any goroutine: {}", line_no, line);
                stats.orphan_lines += 1;
            }
            Block::Discarding => {}
        }
    }

    if let Block::Open(record) = block {
        records.push(record);
    }

    debug!(
        "Parsed {} goroutines from {} lines ({} skipped)",
        records.len(),
        stats.lines,
        stats.skipped_headers
    );

    Ok(StackDump { records, stats })
}

/// Parse a dump held in memory
///
/// **Public** - convenience wrapper for tests and small inputs
pub fn parse_str(text: &str, mode: ParseMode) -> Result<StackDump, ParseError> {
    parse_dump(text.as_bytes(), mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    const TWO_GOROUTINES: &str = "goroutine 5 [running]:\nmain.foo()\n\ngoroutine 6 [chan receive, 4 minutes]:\nmain.bar()\n";

    #[test]
    fn test_two_goroutines() {
        let dump = parse_str(TWO_GOROUTINES, ParseMode::FailFast).unwrap();

        assert_eq!(
            dump.records,
            vec![
                StackTraceRecord {
                    id: 5,
                    running: true,
                    runnable: true,
                    body: "goroutine 5 [running]:\nmain.foo()".to_string(),
                    ..Default::default()
                },
                StackTraceRecord {
                    id: 6,
                    wait_reason: "chan receive".to_string(),
                    stalled_since: Duration::from_secs(240),
                    body: "goroutine 6 [chan receive, 4 minutes]:\nmain.bar()".to_string(),
                    ..Default::default()
                },
            ]
        );
    }

    #[test]
    fn test_trailing_record_without_blank_line() {
        let dump = parse_str("goroutine 1 [running]:\nmain.main()", ParseMode::FailFast).unwrap();
        assert_eq!(dump.len(), 1);
        assert_eq!(dump.records[0].body, "goroutine 1 [running]:\nmain.main()");
    }

    #[test]
    fn test_consecutive_blank_lines() {
        let dump = parse_str(
            "goroutine 1 [running]:\nmain.main()\n\n\n\ngoroutine 2 [select]:\n\n",
            ParseMode::FailFast,
        )
        .unwrap();
        let ids: Vec<u64> = dump.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(dump.records[1].body, "goroutine 2 [select]:");
    }

    #[test]
    fn test_header_closes_previous_block() {
        let dump = parse_str(
            "goroutine 1 [running]:\nmain.main()\ngoroutine 2 [select]:\nmain.loop()\n",
            ParseMode::FailFast,
        )
        .unwrap();
        assert_eq!(dump.len(), 2);
        assert_eq!(dump.records[0].body, "goroutine 1 [running]:\nmain.main()");
    }

    #[test]
    fn test_crlf_input() {
        let dump = parse_str(
            "goroutine 1 [running]:\r\nmain.main()\r\n\r\ngoroutine 2 [select]:\r\n",
            ParseMode::FailFast,
        )
        .unwrap();
        assert_eq!(dump.len(), 2);
        assert_eq!(dump.records[0].body, "goroutine 1 [running]:\nmain.main()");
    }

    #[test]
    fn test_orphan_preamble() {
        let dump = parse_str(
            "panic: boom\n\ngoroutine 1 [running]:\nmain.main()\n",
            ParseMode::FailFast,
        )
        .unwrap();
        assert_eq!(dump.len(), 1);
        assert_eq!(dump.stats.orphan_lines, 1);
        assert_eq!(dump.stats.lines, 4);
    }

    #[test]
    fn test_fail_fast_on_malformed_header() {
        let err = parse_str(
            "goroutine 1 [running]:\nmain.main()\n\ngoroutine 2 running:\nmain.x()\n",
            ParseMode::FailFast,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::MissingBrackets { line_no: 4, .. }));
    }

    #[test]
    fn test_skip_malformed() {
        let dump = parse_str(
            "goroutine 1 [running]:\nmain.main()\n\ngoroutine 2 running:\nmain.x()\n\ngoroutine 3 [select]:\nmain.y()\n",
            ParseMode::SkipMalformed,
        )
        .unwrap();
        let ids: Vec<u64> = dump.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(dump.stats.skipped_headers, 1);
        assert_eq!(dump.stats.orphan_lines, 0);
        assert_eq!(dump.records[1].body, "goroutine 3 [select]:\nmain.y()");
    }

    #[test]
    fn test_empty_input() {
        let dump = parse_str("", ParseMode::FailFast).unwrap();
        assert!(dump.is_empty());
    }
}
