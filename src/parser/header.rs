//! Goroutine header decoding.
//!
//! A header looks like
//!
//! ```text
//! goroutine 9 [syscall, 2 minutes, locked to thread]:
//! ```
//!
//! The id is the second whitespace-separated field. The bracketed state
//! list carries 1 to 3 comma-separated tokens whose meaning depends on
//! how many there are.

use super::schema::StackTraceRecord;
use crate::utils::config::{LOCKED_TO_THREAD, MINUTES_UNIT, RUNNABLE_STATE, RUNNING_STATE};
use crate::utils::error::ParseError;
use std::time::Duration;

/// A line ending with a colon starts a new goroutine block
pub fn is_header(line: &str) -> bool {
    line.ends_with(':')
}

/// Decode a header line into a fresh record whose body is the header itself
///
/// **Public** - used by the dump scanner for every header line
///
/// # Errors
/// * `ParseError::InvalidId` - second field missing, not an unsigned integer,
///   or above `i64::MAX`
/// * `ParseError::MissingBrackets` - no `[...]` state list
/// * `ParseError::UnrecognizedStateList` - more than 3 state tokens
/// * `ParseError::InvalidDuration` - minute count is not an integer
pub fn decode_header(line: &str, line_no: usize) -> Result<StackTraceRecord, ParseError> {
    let id = line
        .split_whitespace()
        .nth(1)
        .and_then(|field| field.parse::<u64>().ok())
        .filter(|id| i64::try_from(*id).is_ok())
        .ok_or_else(|| ParseError::InvalidId {
            line_no,
            line: line.to_string(),
        })?;

    let state_list = state_list(line).ok_or_else(|| ParseError::MissingBrackets {
        line_no,
        line: line.to_string(),
    })?;

    let tokens: Vec<&str> = state_list.split(',').map(str::trim).collect();

    let mut record = StackTraceRecord {
        id,
        body: line.to_string(),
        ..Default::default()
    };

    let stall = |token: &str| {
        parse_minutes(token).ok_or_else(|| ParseError::InvalidDuration {
            line_no,
            text: token.to_string(),
            line: line.to_string(),
        })
    };

    match tokens[..] {
        [state] => match state {
            RUNNING_STATE => {
                record.running = true;
                record.runnable = true;
            }
            RUNNABLE_STATE => record.runnable = true,
            reason => record.wait_reason = reason.to_string(),
        },
        [reason, qualifier] => {
            record.wait_reason = reason.to_string();
            if qualifier.contains(MINUTES_UNIT) {
                record.stalled_since = stall(qualifier)?;
            } else if qualifier.contains(LOCKED_TO_THREAD) {
                record.locked_to_thread = true;
            }
        }
        // The third token is never inspected: any three-token list is
        // treated as locked to a thread.
        [reason, qualifier, _] => {
            record.wait_reason = reason.to_string();
            if qualifier.contains(MINUTES_UNIT) {
                record.stalled_since = stall(qualifier)?;
            }
            record.locked_to_thread = true;
        }
        _ => {
            return Err(ParseError::UnrecognizedStateList {
                line_no,
                tokens: tokens.len(),
                line: line.to_string(),
            })
        }
    }

    Ok(record)
}

/// Text between the first `[` and the first `]`
fn state_list(line: &str) -> Option<&str> {
    let open = line.find('[')?;
    let close = line.find(']')?;
    line.get(open + 1..close)
}

/// Parse `"<n> minutes"` into a duration of n minutes
///
/// Whitespace around the number is ignored. Returns `None` when the text
/// before `minutes` is not an unsigned integer.
pub fn parse_minutes(token: &str) -> Option<Duration> {
    let end = token.find(MINUTES_UNIT)?;
    let minutes = token[..end].trim().parse::<u64>().ok()?;
    Some(Duration::from_secs(minutes.checked_mul(60)?))
}
