//! Insert-time value kind checks for the known traffic statistics columns.
//!
//! The mapping is deliberately closed: a column missing from it is accepted
//! with any value. Kinds are never inferred from the live schema.
use crate::core::{Result, TrafficError};
use once_cell::sync::Lazy;
use rusqlite::types::Value;
use std::collections::HashMap;
use std::fmt;

/// Coarse value classification used to validate inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Identifier, year and count columns; only integers are accepted.
    Integer,
    /// Measurement columns; integers and reals are accepted.
    Real,
    /// Name and code columns; only text is accepted.
    Text,
}

impl ColumnKind {
    /// Returns true when `value` is acceptable for this kind
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            ColumnKind::Integer => matches!(value, Value::Integer(_)),
            ColumnKind::Real => matches!(value, Value::Integer(_) | Value::Real(_)),
            ColumnKind::Text => matches!(value, Value::Text(_)),
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Real => "real",
            ColumnKind::Text => "text",
        };
        f.write_str(name)
    }
}

const INTEGER_COLUMNS: &[&str] = &["year", "year_id", "borough_id", "flow_id"];

const REAL_COLUMNS: &[&str] = &[
    "million_vehicle_km",
    "cars",
    "light_commercial_vehicles",
    "heavy_goods_vehicles",
    "motorcycles",
    "buses_and_coaches",
    "all_motor_vehicles",
];

const TEXT_COLUMNS: &[&str] = &["borough_name", "la_code"];

static COLUMN_KINDS: Lazy<HashMap<&'static str, ColumnKind>> = Lazy::new(|| {
    let mut kinds = HashMap::new();
    for (columns, kind) in [
        (INTEGER_COLUMNS, ColumnKind::Integer),
        (REAL_COLUMNS, ColumnKind::Real),
        (TEXT_COLUMNS, ColumnKind::Text),
    ] {
        for column in columns {
            kinds.insert(*column, kind);
        }
    }
    kinds
});

/// Looks up the expected kind of `column`, if it is a known column
pub fn kind_of(column: &str) -> Option<ColumnKind> {
    COLUMN_KINDS.get(column).copied()
}

/// Validates a positional column/value list before it is written
///
/// # Errors
///
/// Returns `TrafficError::Validation` naming the first offending column, or
/// naming the list lengths when `columns` and `values` differ in length.
pub fn validate_row(columns: &[&str], values: &[Value]) -> Result<()> {
    if columns.len() != values.len() {
        return Err(TrafficError::validation(
            columns.join(", "),
            format!("{} values, got {}", columns.len(), values.len()),
        ));
    }

    for (column, value) in columns.iter().zip(values) {
        if let Some(kind) = kind_of(column) {
            if !kind.accepts(value) {
                return Err(TrafficError::validation(*column, kind.to_string()));
            }
        }
    }

    Ok(())
}
