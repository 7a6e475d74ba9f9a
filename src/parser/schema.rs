//! Record types produced by the dump parser.
//!
//! One `StackTraceRecord` per goroutine block in the dump. The body is kept
//! verbatim; only the header line is decoded.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

/// A single goroutine from a stack dump
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackTraceRecord {
    /// Goroutine id, taken from the header's second field
    pub id: u64,

    /// Goroutine is currently executing
    pub running: bool,

    /// Goroutine is eligible to execute (always true when `running`)
    pub runnable: bool,

    /// Goroutine is pinned to an OS thread
    pub locked_to_thread: bool,

    /// Why the goroutine is blocked, e.g. "chan receive", "IO wait", "select"
    pub wait_reason: String,

    /// How long the goroutine has been waiting (zero when not reported)
    #[serde(
        rename = "stalled_since_minutes",
        serialize_with = "serialize_minutes",
        deserialize_with = "deserialize_minutes"
    )]
    pub stalled_since: Duration,

    /// Header line plus every following line of the block, newline-joined
    pub body: String,
}

impl StackTraceRecord {
    /// First line of the body
    pub fn header(&self) -> &str {
        self.body.lines().next().unwrap_or("")
    }

    /// Stalled time in whole minutes, fraction truncated
    pub fn stalled_minutes(&self) -> u64 {
        self.stalled_since.as_secs() / 60
    }
}

fn serialize_minutes<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_secs() / 60)
}

fn deserialize_minutes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let minutes = u64::deserialize(deserializer)?;
    minutes
        .checked_mul(60)
        .map(Duration::from_secs)
        .ok_or_else(|| D::Error::custom(format!("stalled_since_minutes {} out of range", minutes)))
}

/// Counters collected while scanning a dump
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Lines read from the source
    pub lines: usize,

    /// Malformed headers dropped in skip mode
    pub skipped_headers: usize,

    /// Non-blank lines that appeared outside any goroutine block
    pub orphan_lines: usize,
}

/// Every goroutine parsed from one input stream, in input order
#[derive(Debug, Clone, Default)]
pub struct StackDump {
    pub records: Vec<StackTraceRecord>,
    pub stats: ParseStats,
}

impl StackDump {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StackTraceRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a StackDump {
    type Item = &'a StackTraceRecord;
    type IntoIter = std::slice::Iter<'a, StackTraceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
