//! gosta
//!
//! Parse goroutine stack dumps into structured records and store them
//! in a database for querying.
//!
//! This crate provides the core implementation for the
//! `gosta` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! curl -s 'http://localhost:6060/debug/pprof/goroutine?debug=2' > stacks.txt
//! gosta ingest -f stacks.txt -n stacks.db
//! sqlite3 stacks.db "select waitReason, count(*) from gosta_20240307T090501 group by 1"
//! ```
//!
//! ## Library use
//!
//! ```
//! use gosta::parser::{parse_str, ParseMode};
//!
//! let dump = parse_str("goroutine 5 [running]:\nmain.foo()\n", ParseMode::FailFast).unwrap();
//! assert_eq!(dump.records[0].id, 5);
//! assert!(dump.records[0].running);
//! ```

pub mod aggregator;
pub mod commands;
pub mod parser;
pub mod sink;
pub mod source;
pub mod utils;
