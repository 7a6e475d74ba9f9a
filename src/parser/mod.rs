//! Goroutine dump parsing.
//!
//! This module handles:
//! - Splitting a dump into goroutine blocks
//! - Decoding the bracketed state list of each header
//! - Defining the record types handed to sinks

pub mod goroutine_dump;
pub mod header;
pub mod schema;

// Re-export main types
pub use goroutine_dump::{parse_dump, parse_str, ParseMode};
pub use header::{decode_header, is_header, parse_minutes};
pub use schema::{ParseStats, StackDump, StackTraceRecord};
