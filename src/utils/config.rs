//! Configuration and constants for the CLI.

use std::time::Duration;

/// Default timeout for fetching a dump over HTTP
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Version of the JSON document written by the json backend
pub const DUMP_DOCUMENT_VERSION: &str = "1.0.0";

// Destination naming: gosta_20061019T150405
pub const TABLE_PREFIX: &str = "gosta_";
pub const TABLE_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

// Command line defaults
pub const DEFAULT_BACKEND: &str = "sqlite3";
pub const DEFAULT_DB_NAME: &str = "gst";

/// Backends accepted by `--db`
pub const SUPPORTED_BACKENDS: &[&str] = &["sqlite3", "json"];

// Header grammar keywords
pub const RUNNING_STATE: &str = "running";
pub const RUNNABLE_STATE: &str = "runnable";
pub const MINUTES_UNIT: &str = "minutes";
pub const LOCKED_TO_THREAD: &str = "locked to thread";
