//! SQLite sink.
//!
//! Every run gets its own table. All inserts go through one transaction
//! that `finish` commits; a failed insert still commits the rows before it.

use super::{format_interval, validate_table_name, Sink};
use crate::parser::StackTraceRecord;
use crate::utils::error::SinkError;
use log::{debug, info};
use rusqlite::{params, Connection};

const CREATE_TABLE_SQL: &str = "CREATE TABLE {table} (
    id INTEGER PRIMARY KEY NOT NULL,
    running BOOLEAN,
    runnable BOOLEAN,
    lockedToThread BOOLEAN,
    waitReason TEXT,
    stalledSince INTERVAL,
    body TEXT
)";

const INSERT_SQL: &str = "INSERT INTO {table} \
    (id, running, runnable, lockedToThread, waitReason, stalledSince, body) \
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

pub struct SqliteSink {
    conn: Connection,
    table: Option<String>,
    in_transaction: bool,
    inserted: usize,
}

impl SqliteSink {
    /// Open (or create) the database file at `path`
    pub fn open(path: &str) -> Result<Self, SinkError> {
        debug!("Opening SQLite database: {}", path);
        Ok(Self::from_connection(Connection::open(path)?))
    }

    /// Wrap an existing connection, e.g. `Connection::open_in_memory()`
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            table: None,
            in_transaction: false,
            inserted: 0,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Rows inserted since the destination was created
    pub fn inserted(&self) -> usize {
        self.inserted
    }
}

impl Sink for SqliteSink {
    fn create_destination(&mut self, name: &str) -> Result<(), SinkError> {
        validate_table_name(name)?;

        info!("Creating table {} in sqlite3...", name);
        self.conn
            .execute(&CREATE_TABLE_SQL.replace("{table}", name), [])?;

        self.conn.execute_batch("BEGIN TRANSACTION")?;
        self.in_transaction = true;
        self.table = Some(name.to_string());
        self.inserted = 0;
        Ok(())
    }

    fn insert(&mut self, record: &StackTraceRecord) -> Result<(), SinkError> {
        let table = self.table.as_deref().ok_or(SinkError::NoDestination)?;
        let id = i64::try_from(record.id).map_err(|_| SinkError::IdOutOfRange(record.id))?;

        let mut stmt = self
            .conn
            .prepare_cached(&INSERT_SQL.replace("{table}", table))?;

        stmt.execute(params![
            id,
            record.running,
            record.runnable,
            record.locked_to_thread,
            record.wait_reason,
            format_interval(record.stalled_since),
            record.body,
        ])
        .map_err(|source| SinkError::Insert {
            id: record.id,
            source,
        })?;

        self.inserted += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        if self.in_transaction {
            self.conn.execute_batch("COMMIT")?;
            self.in_transaction = false;
            debug!("Committed {} rows", self.inserted);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sink() -> SqliteSink {
        SqliteSink::from_connection(Connection::open_in_memory().unwrap())
    }

    fn record(id: u64) -> StackTraceRecord {
        StackTraceRecord {
            id,
            wait_reason: "chan receive".to_string(),
            stalled_since: Duration::from_secs(4 * 60),
            body: format!("goroutine {} [chan receive, 4 minutes]:\nmain.bar()", id),
            ..Default::default()
        }
    }

    #[test]
    fn test_insert_and_query() {
        let mut sink = sink();
        sink.create_destination("stacks").unwrap();
        sink.insert(&record(6)).unwrap();
        sink.finish().unwrap();

        let (reason, stalled, body): (String, String, String) = sink
            .connection()
            .query_row(
                "SELECT waitReason, stalledSince, body FROM stacks WHERE id = 6",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();

        assert_eq!(reason, "chan receive");
        assert_eq!(stalled, "4 minutes");
        assert_eq!(body, "goroutine 6 [chan receive, 4 minutes]:\nmain.bar()");
    }

    #[test]
    fn test_insert_without_destination() {
        let mut sink = sink();
        assert!(matches!(
            sink.insert(&record(1)),
            Err(SinkError::NoDestination)
        ));
    }

    #[test]
    fn test_duplicate_id_names_the_record() {
        let mut sink = sink();
        sink.create_destination("stacks").unwrap();
        sink.insert(&record(3)).unwrap();

        let err = sink.insert(&record(3)).unwrap_err();
        assert!(matches!(err, SinkError::Insert { id: 3, .. }));
        assert_eq!(sink.inserted(), 1);
    }

    #[test]
    fn test_id_beyond_i64_is_rejected() {
        let mut sink = sink();
        sink.create_destination("stacks").unwrap();

        let err = sink.insert(&record(u64::MAX)).unwrap_err();
        assert!(matches!(err, SinkError::IdOutOfRange(id) if id == u64::MAX));
        sink.finish().unwrap();

        let rows: i64 = sink
            .connection()
            .query_row("SELECT count(*) FROM stacks", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[test]
    fn test_rejects_bad_table_name() {
        let mut sink = sink();
        assert!(matches!(
            sink.create_destination("x; DROP TABLE y"),
            Err(SinkError::InvalidTableName(_))
        ));
    }

    #[test]
    fn test_existing_table_is_an_error() {
        let mut sink = sink();
        sink.create_destination("stacks").unwrap();
        sink.finish().unwrap();
        assert!(matches!(
            sink.create_destination("stacks"),
            Err(SinkError::Database(_))
        ));
    }
}
