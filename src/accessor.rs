//! Table accessor: generic CRUD over tables named at call time.
//!
//! Every operation except [`TableAccessor::open`] and
//! [`TableAccessor::insert_row`] is fail-soft: storage failures are logged
//! through `tracing` and turned into an empty or zero result. Callers that
//! need to tell "no rows" apart from "query failed" must watch the log.
use crate::core::db::{self, Column, Row};
use crate::core::Result;
use crate::kinds;
use rusqlite::types::Value;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Handle bound to one open SQLite connection.
///
/// Not safe for concurrent use; one logical caller drives one accessor.
#[derive(Debug)]
pub struct TableAccessor {
    conn: Connection,
    path: Option<PathBuf>,
}

impl TableAccessor {
    /// Opens the store at `locator`.
    ///
    /// A missing file is not created. Failure returns
    /// [`TrafficError::Connection`](crate::core::TrafficError::Connection)
    /// and no accessor.
    pub fn open(locator: impl AsRef<Path>) -> Result<Self> {
        let locator = locator.as_ref();
        let conn = db::open(locator)?;
        info!("Connected to {}", locator.display());
        Ok(Self::from_connection(conn, locator))
    }

    /// Wraps an already open connection.
    pub fn from_connection(conn: Connection, locator: &Path) -> Self {
        let path = (!db::is_memory_locator(locator)).then(|| locator.to_path_buf());
        TableAccessor { conn, path }
    }

    /// Path of the backing file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Borrows the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Column names of `table` in declared order; empty if the table is
    /// missing or introspection fails.
    pub fn list_columns(&self, table: &str) -> Vec<String> {
        self.describe(table).into_iter().map(|c| c.name).collect()
    }

    /// Full column metadata of `table`; empty on failure.
    pub fn describe(&self, table: &str) -> Vec<Column> {
        db::table_columns(&self.conn, table).unwrap_or_else(|e| {
            error!("Error retrieving column names from {}: {}", table, e);
            Vec::new()
        })
    }

    /// User tables in the store; empty on failure.
    pub fn list_tables(&self) -> Vec<String> {
        db::list_tables(&self.conn).unwrap_or_else(|e| {
            error!("Error listing tables: {}", e);
            Vec::new()
        })
    }

    /// Every row of `table` in storage order; empty on failure.
    pub fn list_rows(&self, table: &str) -> Vec<Row> {
        db::select_all(&self.conn, table).unwrap_or_else(|e| {
            error!("Error retrieving data from {}: {}", table, e);
            Vec::new()
        })
    }

    /// Number of rows in `table`; zero on failure.
    pub fn count_rows(&self, table: &str) -> usize {
        db::count(&self.conn, table).unwrap_or_else(|e| {
            error!("Error counting rows in {}: {}", table, e);
            0
        })
    }

    /// Inserts one row and commits it.
    ///
    /// Values are checked against the known column kinds before the store is
    /// touched; a mismatch is the only error returned. A storage failure
    /// (constraint violation, missing table) is logged and leaves the table
    /// unchanged.
    pub fn insert_row(&self, table: &str, columns: &[&str], values: &[Value]) -> Result<()> {
        if let Err(e) = kinds::validate_row(columns, values) {
            error!("Error adding data to {}: {}", table, e);
            return Err(e);
        }

        if let Err(e) = db::insert(&self.conn, table, columns, values) {
            error!("Error adding data to {}: {}", table, e);
        }
        Ok(())
    }

    /// Applies `set_clause` to rows matching `condition` and commits.
    ///
    /// Both fragments go to SQLite verbatim, unvalidated. Returns the number
    /// of rows changed, zero on failure.
    pub fn update_rows(&self, table: &str, set_clause: &str, condition: &str) -> usize {
        db::update(&self.conn, table, set_clause, condition).unwrap_or_else(|e| {
            error!("Error updating data in {}: {}", table, e);
            0
        })
    }

    /// Removes rows matching `condition` and commits. Returns the number of
    /// rows removed, zero on failure.
    pub fn delete_rows(&self, table: &str, condition: &str) -> usize {
        db::delete(&self.conn, table, condition).unwrap_or_else(|e| {
            error!("Error deleting data from {}: {}", table, e);
            0
        })
    }

    /// Releases the connection. A close failure is logged, not returned.
    pub fn close(self) {
        match self.conn.close() {
            Ok(()) => info!("Closed database connection"),
            Err((_conn, e)) => warn!("Error closing the database connection: {}", e),
        }
    }
}
