/// Schema Introspection Module
///
/// Discovers table structure at call time. Nothing is cached: each call
/// re-reads SQLite's catalog, so results always reflect the current store.

use crate::core::{Result, TrafficError};
use rusqlite::{Connection, Row};

/// Represents a database column with its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Declared type name (e.g., "INTEGER", "TEXT", "REAL"); empty when undeclared
    pub type_name: String,
    /// Whether the column rejects NULL values
    pub notnull: bool,
    /// Whether this column is part of the primary key
    pub pk: bool,
    /// Default value expression (if any)
    pub dflt_value: Option<String>,
}

impl Column {
    /// Creates a Column from a `pragma_table_info` result row
    fn from_pragma_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Column {
            name: row.get(1)?,
            type_name: row.get(2)?,
            notnull: row.get(3)?,
            dflt_value: row.get(4)?,
            pk: row.get::<_, i64>(5)? > 0,
        })
    }
}

/// Retrieves the declared columns of `table_name` in declaration order
///
/// The table name is bound as a parameter to the `pragma_table_info`
/// table-valued function, so it is never spliced into SQL text.
///
/// # Errors
///
/// Returns `TrafficError::Schema` if the table does not exist or the
/// catalog query fails.
pub fn table_columns(conn: &Connection, table_name: &str) -> Result<Vec<Column>> {
    let mut stmt = conn
        .prepare(
            "SELECT cid, name, type, \"notnull\", dflt_value, pk
             FROM pragma_table_info(?1)
             ORDER BY cid",
        )
        .map_err(|e| TrafficError::Schema(format!("Failed to prepare introspection: {}", e)))?;

    let columns = stmt
        .query_map([table_name], |row| Column::from_pragma_row(row))
        .map_err(|e| TrafficError::Schema(format!("Introspection of {} failed: {}", table_name, e)))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| TrafficError::Schema(format!("Introspection of {} failed: {}", table_name, e)))?;

    if columns.is_empty() {
        return Err(TrafficError::Schema(format!("no such table: {}", table_name)));
    }

    Ok(columns)
}

/// Retrieves the names of all user-defined tables, sorted by name
pub fn list_tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(
            "SELECT name FROM sqlite_master
             WHERE type='table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )
        .map_err(|e| TrafficError::Schema(format!("Failed to list tables: {}", e)))?;

    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| TrafficError::Schema(format!("Failed to list tables: {}", e)))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| TrafficError::Schema(format!("Failed to list tables: {}", e)))?;

    Ok(names)
}

/// Checks whether a table named `table_name` exists
pub fn table_exists(conn: &Connection, table_name: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name = ?1",
        [table_name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
