/// Query Execution Module
///
/// Builds and runs the statements behind the table accessor. Table and
/// column identifiers are quoted; values are always bound parameters.
/// Update and delete fragments are forwarded verbatim.

use crate::core::{Result, TrafficError};
use rusqlite::{params_from_iter, types::Value, Connection};
use tracing::debug;

/// A table row: one value per column, in the table's column order
pub type Row = Vec<Value>;

/// Quotes an SQL identifier, doubling any embedded double quotes
///
/// SQLite cannot bind identifiers as parameters, so this is what keeps a
/// caller-supplied table or column name from escaping into the statement.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Builds `SELECT * FROM <table>`
pub fn select_all_sql(table: &str) -> String {
    format!("SELECT * FROM {}", quote_identifier(table))
}

/// Builds a parameterized insert for `columns`
pub fn insert_sql(table: &str, columns: &[&str]) -> String {
    let column_list = columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table),
        column_list,
        placeholders
    )
}

/// Builds `UPDATE <table> SET <set_clause> WHERE <condition>`
pub fn update_sql(table: &str, set_clause: &str, condition: &str) -> String {
    format!(
        "UPDATE {} SET {} WHERE {}",
        quote_identifier(table),
        set_clause,
        condition
    )
}

/// Builds `DELETE FROM <table> WHERE <condition>`
pub fn delete_sql(table: &str, condition: &str) -> String {
    format!("DELETE FROM {} WHERE {}", quote_identifier(table), condition)
}

/// Reads every row of `table` in storage order
///
/// # Errors
///
/// Returns `TrafficError::Query` if the table is missing or the read fails.
pub fn select_all(conn: &Connection, table: &str) -> Result<Vec<Row>> {
    let sql = select_all_sql(table);
    debug!("Executing: {}", sql);

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| TrafficError::Query(format!("Failed to prepare statement: {}", e)))?;
    let column_count = stmt.column_count();

    let rows = stmt
        .query_map([], |row| {
            (0..column_count)
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Row>>()
        })
        .map_err(|e| TrafficError::Query(format!("Query execution failed: {}", e)))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| TrafficError::Query(format!("Result processing failed: {}", e)))?;

    Ok(rows)
}

/// Counts the rows of `table`
pub fn count(conn: &Connection, table: &str) -> Result<usize> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
    let n: i64 = conn
        .query_row(&sql, [], |row| row.get(0))
        .map_err(|e| TrafficError::Query(format!("Count failed: {}", e)))?;
    Ok(n as usize)
}

/// Inserts a single row, binding `values` positionally to `columns`
///
/// The connection is in autocommit mode, so the insert is durable once this
/// returns. An empty column list writes nothing and is an error.
pub fn insert(conn: &Connection, table: &str, columns: &[&str], values: &[Value]) -> Result<usize> {
    if columns.is_empty() {
        return Err(TrafficError::Query(format!("Insert into {} names no columns", table)));
    }
    if columns.len() != values.len() {
        return Err(TrafficError::Query(format!(
            "{} columns but {} values",
            columns.len(),
            values.len()
        )));
    }

    let sql = insert_sql(table, columns);
    debug!("Executing: {}", sql);
    conn.execute(&sql, params_from_iter(values.iter()))
        .map_err(|e| TrafficError::Query(format!("Insert failed: {}", e)))
}

/// Applies `set_clause` to rows matching `condition`, returning the number changed
pub fn update(conn: &Connection, table: &str, set_clause: &str, condition: &str) -> Result<usize> {
    let sql = update_sql(table, set_clause, condition);
    debug!("Executing: {}", sql);
    conn.execute(&sql, [])
        .map_err(|e| TrafficError::Query(format!("Update failed: {}", e)))
}

/// Removes rows matching `condition`, returning the number removed
pub fn delete(conn: &Connection, table: &str, condition: &str) -> Result<usize> {
    let sql = delete_sql(table, condition);
    debug!("Executing: {}", sql);
    conn.execute(&sql, [])
        .map_err(|e| TrafficError::Query(format!("Delete failed: {}", e)))
}

/// Formats a SQLite value for display
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(t) => t.clone(),
        Value::Blob(b) => format!("<BLOB: {} bytes>", b.len()),
    }
}

/// Converts a SQLite value to JSON; blobs become arrays of bytes
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Real(f) => serde_json::Value::from(*f),
        Value::Text(t) => serde_json::Value::from(t.as_str()),
        Value::Blob(b) => serde_json::Value::from(b.clone()),
    }
}

/// Parses a literal typed on the command line: integer, then real, else text
///
/// `NULL` (any case) becomes `Value::Null`.
pub fn parse_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() {
            return Value::Real(f);
        }
    }
    Value::Text(raw.to_string())
}
