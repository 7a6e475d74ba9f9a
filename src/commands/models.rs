use crate::parser::ParseMode;
use crate::utils::config::{DEFAULT_BACKEND, DEFAULT_DB_NAME};
use std::path::PathBuf;

/// Arguments for the ingest command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct IngestArgs {
    /// Dump file to read (exclusive with `url`)
    pub file: Option<PathBuf>,

    /// URL to fetch the dump from (exclusive with `file`)
    pub url: Option<String>,

    /// Storage backend, one of `SUPPORTED_BACKENDS`
    pub backend: String,

    /// Database file (sqlite3) or output directory (json)
    pub db_name: String,

    /// Database credential
    pub password: Option<String>,

    /// Destination table; generated from the current time when None
    pub table: Option<String>,

    /// Fail-fast or skip-and-continue on malformed headers
    pub mode: ParseMode,

    /// Print a state summary to stdout
    pub print_summary: bool,
}

impl Default for IngestArgs {
    fn default() -> Self {
        Self {
            file: None,
            url: None,
            backend: DEFAULT_BACKEND.to_string(),
            db_name: DEFAULT_DB_NAME.to_string(),
            password: None,
            table: None,
            mode: ParseMode::FailFast,
            print_summary: false,
        }
    }
}

/// Arguments for the inspect command
#[derive(Debug, Clone)]
pub struct InspectArgs {
    pub file: Option<PathBuf>,
    pub url: Option<String>,
    pub mode: ParseMode,

    /// Number of wait reasons to list
    pub top_reasons: usize,
}

impl Default for InspectArgs {
    fn default() -> Self {
        Self {
            file: None,
            url: None,
            mode: ParseMode::FailFast,
            top_reasons: 10,
        }
    }
}
