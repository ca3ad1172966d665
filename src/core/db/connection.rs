/// Connection Management Module
///
/// Opens SQLite stores for the table accessor and the ingestion routine.
/// CRUD access never creates a store: a missing file is a connection error.
/// Ingestion is the only path that may create one.

use crate::core::{Result, TrafficError};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use tracing::{debug, error};

/// Locator that selects a private in-memory database instead of a file.
pub const MEMORY_LOCATOR: &str = ":memory:";

/// Returns true when `locator` names an in-memory database
pub fn is_memory_locator(locator: &Path) -> bool {
    locator.as_os_str() == MEMORY_LOCATOR
}

/// Opens an existing SQLite store for reading and writing
///
/// # Arguments
///
/// * `locator` - Path to the SQLite database file, or ":memory:" for in-memory database
///
/// # Returns
///
/// The open connection, or `TrafficError::Connection` if the file is missing
/// or cannot be opened.
pub fn open(locator: &Path) -> Result<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    open_with(locator, flags)
}

/// Opens a SQLite store, creating the file if it does not exist yet
pub fn create(locator: &Path) -> Result<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    open_with(locator, flags)
}

fn open_with(locator: &Path, flags: OpenFlags) -> Result<Connection> {
    let opened = if is_memory_locator(locator) {
        Connection::open_in_memory()
    } else {
        Connection::open_with_flags(locator, flags)
    };

    let conn = opened.map_err(|e| {
        error!("Error connecting to database {}: {}", locator.display(), e);
        TrafficError::Connection(e)
    })?;

    // A file that is not a SQLite database opens lazily; reading the schema
    // is where that surfaces.
    conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))
        .map_err(|e| {
            error!("Error initializing database {}: {}", locator.display(), e);
            TrafficError::Connection(e)
        })?;

    debug!("Opened database {}", locator.display());
    Ok(conn)
}
