//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while opening or fetching a stack dump
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("Invalid source: {0}")]
    Usage(String),
}

/// Errors that can occur while decoding a stack dump
///
/// Every decoding variant carries the 1-based line number and the
/// offending line so the caller can point at the input.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("line {line_no}: header has no [state] list: {line}")]
    MissingBrackets { line_no: usize, line: String },

    #[error("line {line_no}: header has no goroutine id: {line}")]
    InvalidId { line_no: usize, line: String },

    #[error("line {line_no}: unrecognized state list with {tokens} tokens: {line}")]
    UnrecognizedStateList {
        line_no: usize,
        tokens: usize,
        line: String,
    },

    #[error("line {line_no}: invalid minute count {text:?}: {line}")]
    InvalidDuration {
        line_no: usize,
        text: String,
        line: String,
    },

    #[error("Failed to read stack dump: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// Line number of the offending header, if the error came from decoding
    pub fn line_no(&self) -> Option<usize> {
        match self {
            Self::MissingBrackets { line_no, .. }
            | Self::InvalidId { line_no, .. }
            | Self::UnrecognizedStateList { line_no, .. }
            | Self::InvalidDuration { line_no, .. } => Some(*line_no),
            Self::Io(_) => None,
        }
    }
}

/// Errors that can occur while persisting records
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Unsupported backend: {0}")]
    UnsupportedBackend(String),

    #[error("Invalid table name: {0:?}")]
    InvalidTableName(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to insert goroutine {id}: {source}")]
    Insert {
        id: u64,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Goroutine id {0} does not fit a signed 64-bit column")]
    IdOutOfRange(u64),

    #[error("Duplicate goroutine id {0}")]
    DuplicateId(u64),

    #[error("Destination not created before insert")]
    NoDestination,

    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
