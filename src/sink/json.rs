//! JSON document sink.
//!
//! Buffers records and writes `<dir>/<table>.json` on `finish`.

use super::{validate_table_name, Sink};
use crate::parser::StackTraceRecord;
use crate::utils::config::DUMP_DOCUMENT_VERSION;
use crate::utils::error::SinkError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Top-level structure written to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpDocument {
    /// Document version for compatibility checking
    pub version: String,

    /// Destination name the records were stored under
    pub table: String,

    /// When the document was written
    pub generated_at: String,

    pub records: Vec<StackTraceRecord>,
}

pub struct JsonSink {
    dir: PathBuf,
    table: Option<String>,
    records: Vec<StackTraceRecord>,
    seen: HashSet<u64>,
}

impl JsonSink {
    /// Documents are written under `dir`, which is created if missing
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            table: None,
            records: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Path of the document for the current destination
    pub fn output_path(&self) -> Option<PathBuf> {
        self.table
            .as_ref()
            .map(|table| self.dir.join(format!("{}.json", table)))
    }
}

impl Sink for JsonSink {
    fn create_destination(&mut self, name: &str) -> Result<(), SinkError> {
        validate_table_name(name)?;

        let path = self.dir.join(format!("{}.json", name));
        if path.exists() {
            return Err(SinkError::WriteFailed(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} already exists", path.display()),
            )));
        }

        self.table = Some(name.to_string());
        self.records.clear();
        self.seen.clear();
        Ok(())
    }

    fn insert(&mut self, record: &StackTraceRecord) -> Result<(), SinkError> {
        if self.table.is_none() {
            return Err(SinkError::NoDestination);
        }
        // Same key constraint as the sqlite table
        if !self.seen.insert(record.id) {
            return Err(SinkError::DuplicateId(record.id));
        }
        self.records.push(record.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        let Some(path) = self.output_path() else {
            return Ok(());
        };

        let document = DumpDocument {
            version: DUMP_DOCUMENT_VERSION.to_string(),
            table: self.table.take().unwrap_or_default(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            records: std::mem::take(&mut self.records),
        };
        self.seen.clear();

        write_document(&document, &path)
    }
}

/// Write a document as pretty JSON, creating parent directories
fn write_document(document: &DumpDocument, output_path: &Path) -> Result<(), SinkError> {
    info!("Writing {} records to: {}", document.records.len(), output_path.display());

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent)?;
        }
    }

    let writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(writer, document)?;

    Ok(())
}

/// Read a document written by the json sink
pub fn read_dump_document(input_path: impl AsRef<Path>) -> Result<DumpDocument, SinkError> {
    let input_path = input_path.as_ref();

    debug!("Reading dump document from: {}", input_path.display());

    let file = File::open(input_path)?;
    let document: DumpDocument = serde_json::from_reader(file)?;

    debug!(
        "Document loaded: version {}, {} records",
        document.version,
        document.records.len()
    );

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(id: u64) -> StackTraceRecord {
        StackTraceRecord {
            id,
            running: true,
            runnable: true,
            body: format!("goroutine {} [running]:\nmain.main()", id),
            ..Default::default()
        }
    }

    #[test]
    fn test_write_and_read_document() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut sink = JsonSink::new(temp_dir.path().join("nested/out"));

        sink.create_destination("stacks").unwrap();
        sink.insert(&record(1)).unwrap();
        sink.insert(&record(2)).unwrap();
        let path = sink.output_path().unwrap();
        sink.finish().unwrap();

        let document = read_dump_document(&path).unwrap();
        assert_eq!(document.version, DUMP_DOCUMENT_VERSION);
        assert_eq!(document.table, "stacks");
        assert_eq!(document.records, vec![record(1), record(2)]);
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut sink = JsonSink::new(temp_dir.path());

        sink.create_destination("stacks").unwrap();
        sink.insert(&record(4)).unwrap();
        assert!(matches!(
            sink.insert(&record(4)),
            Err(SinkError::DuplicateId(4))
        ));
        let path = sink.output_path().unwrap();
        sink.finish().unwrap();

        let document = read_dump_document(&path).unwrap();
        assert_eq!(document.records, vec![record(4)]);
    }

    #[test]
    fn test_refuses_existing_document() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("stacks.json"), "{}").unwrap();

        let mut sink = JsonSink::new(temp_dir.path());
        assert!(sink.create_destination("stacks").is_err());
    }

    #[test]
    fn test_insert_without_destination() {
        let mut sink = JsonSink::new("unused");
        assert!(matches!(
            sink.insert(&record(1)),
            Err(SinkError::NoDestination)
        ));
    }
}
