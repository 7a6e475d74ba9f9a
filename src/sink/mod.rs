//! Persistence of parsed goroutines.
//!
//! A sink receives a destination name (a table, or a document for the json
//! backend) and then one insert per record, in parser order.

pub mod json;
pub mod sqlite;

pub use json::{read_dump_document, DumpDocument, JsonSink};
pub use sqlite::SqliteSink;

use crate::parser::{StackDump, StackTraceRecord};
use crate::utils::config::{SUPPORTED_BACKENDS, TABLE_PREFIX, TABLE_TIMESTAMP_FORMAT};
use crate::utils::error::SinkError;
use chrono::{DateTime, TimeZone};
use log::{debug, error, info};
use std::time::Duration;

/// Destination for parsed records
pub trait Sink {
    /// Create the table (or document) named `name`
    fn create_destination(&mut self, name: &str) -> Result<(), SinkError>;

    /// Store one record
    fn insert(&mut self, record: &StackTraceRecord) -> Result<(), SinkError>;

    /// Flush anything buffered; records inserted so far become durable
    fn finish(&mut self) -> Result<(), SinkError>;
}

/// Connection settings shared by every backend
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Backend name, one of `SUPPORTED_BACKENDS`
    pub backend: String,

    /// Database file for sqlite3, output directory for json
    pub db_name: String,

    /// Credential for backends that authenticate
    pub password: Option<String>,
}

/// Whether `backend` can be passed to `open_sink`
pub fn is_backend_supported(backend: &str) -> bool {
    SUPPORTED_BACKENDS.contains(&backend)
}

/// Open the sink selected by `config.backend`
///
/// # Errors
/// * `SinkError::UnsupportedBackend` - unknown backend
/// * Backend-specific open failures
pub fn open_sink(config: &SinkConfig) -> Result<Box<dyn Sink>, SinkError> {
    match config.backend.as_str() {
        "sqlite3" => {
            if config.password.is_some() {
                debug!("sqlite3 has no authentication, ignoring password");
            }
            Ok(Box::new(SqliteSink::open(&config.db_name)?))
        }
        "json" => Ok(Box::new(JsonSink::new(&config.db_name))),
        other => Err(SinkError::UnsupportedBackend(other.to_string())),
    }
}

/// Table name for a run started at `now`: `gosta_YYYYMMDDTHHMMSS`
pub fn default_table_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}{}", TABLE_PREFIX, now.format(TABLE_TIMESTAMP_FORMAT))
}

/// Table names are interpolated into DDL, so only plain identifiers pass
pub fn validate_table_name(name: &str) -> Result<(), SinkError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(SinkError::InvalidTableName(name.to_string()))
    }
}

/// Textual interval of whole minutes, e.g. `"4 minutes"`
pub fn format_interval(duration: Duration) -> String {
    format!("{} minutes", duration.as_secs() / 60)
}

/// Write every record of `dump` to `sink` under `name`
///
/// Stops at the first failing insert. Records inserted before the failure
/// are kept.
pub fn persist(sink: &mut dyn Sink, name: &str, dump: &StackDump) -> Result<usize, SinkError> {
    sink.create_destination(name)?;

    info!("Writing {} stack traces to {}...", dump.len(), name);

    for (written, record) in dump.iter().enumerate() {
        if let Err(e) = sink.insert(record) {
            error!("Insert failed after {} records: {}", written, e);
            // Keep what already made it in
            if let Err(finish_err) = sink.finish() {
                error!("Failed to flush partial write: {}", finish_err);
            }
            return Err(e);
        }
    }

    sink.finish()?;
    Ok(dump.len())
}
