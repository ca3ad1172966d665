//! One-shot ingestion of spreadsheet exports into the store.
//!
//! Each source is a CSV export of one sheet: the national series becomes
//! `uk`, the regional workbook's two sheets become `london_cars` and
//! `london_all`. A table is dropped and rebuilt from its sheet inside a
//! single transaction, so readers see either the old data or the new.
use crate::config::IngestConfig;
use crate::core::db::{self, quote_identifier};
use crate::core::{Result, TrafficError};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Table fed by the national dataset
pub const UK_TABLE: &str = "uk";
/// Table fed by the regional workbook's cars sheet
pub const LONDON_CARS_TABLE: &str = "london_cars";
/// Table fed by the regional workbook's all-vehicles sheet
pub const LONDON_ALL_TABLE: &str = "london_all";

/// Declared type inferred for an ingested column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Real,
    Text,
}

impl SqlType {
    fn as_sql(self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text => "TEXT",
        }
    }

    /// Narrowest type holding every non-empty cell
    fn infer<'a>(cells: impl Iterator<Item = &'a str>) -> Self {
        let mut inferred = None;
        for cell in cells.map(str::trim).filter(|c| !c.is_empty()) {
            let kind = if has_leading_zero(cell) {
                return SqlType::Text;
            } else if cell.parse::<i64>().is_ok() {
                SqlType::Integer
            } else if cell.parse::<f64>().map(f64::is_finite).unwrap_or(false) {
                SqlType::Real
            } else {
                return SqlType::Text;
            };
            inferred = match (inferred, kind) {
                (None, k) => Some(k),
                (Some(SqlType::Integer), SqlType::Integer) => Some(SqlType::Integer),
                _ => Some(SqlType::Real),
            };
        }
        inferred.unwrap_or(SqlType::Text)
    }

    fn convert(self, cell: &str) -> Value {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        match self {
            SqlType::Integer => trimmed.parse().map(Value::Integer).unwrap_or(Value::Null),
            SqlType::Real => trimmed.parse().map(Value::Real).unwrap_or(Value::Null),
            SqlType::Text => Value::Text(cell.to_string()),
        }
    }
}

/// True for zero-padded numerals such as `007`, which only survive as text
fn has_leading_zero(cell: &str) -> bool {
    let digits = cell.strip_prefix(['-', '+']).unwrap_or(cell);
    let mut chars = digits.chars();
    chars.next() == Some('0') && chars.next().map_or(false, |c| c.is_ascii_digit())
}

/// Outcome of loading one table
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub table: String,
    pub columns: Vec<(String, SqlType)>,
    pub rows: usize,
}

/// Turns a sheet header into a snake_case identifier
///
/// "Million vehicle km" becomes `million_vehicle_km`. A header with no
/// alphanumeric characters becomes `column_<n>` (1-based).
pub fn normalize_header(raw: &str, position: usize) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for ch in raw.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    if out.is_empty() {
        format!("column_{}", position + 1)
    } else {
        out
    }
}

fn unique_headers(raw: &csv::StringRecord) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.iter()
        .enumerate()
        .map(|(i, h)| {
            let base = normalize_header(h, i);
            let mut name = base.clone();
            let mut n = 2;
            while !seen.insert(name.clone()) {
                name = format!("{}_{}", base, n);
                n += 1;
            }
            name
        })
        .collect()
}

/// Loads CSV data from `reader` into `table`, replacing any existing table
///
/// # Errors
///
/// Returns `TrafficError::Csv` for malformed input, `TrafficError::Ingest`
/// for a sheet without a header row, and `TrafficError::Database` if the
/// write fails (in which case the previous table is left intact).
pub fn ingest_csv<R: Read>(conn: &Connection, table: &str, reader: R) -> Result<IngestReport> {
    let started_at = Instant::now();
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(TrafficError::Ingest(format!("sheet for {} has no header row", table)));
    }
    let names = unique_headers(&headers);

    let records = csv_reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    // Trailing blank lines in exported sheets come through as empty records
    let records: Vec<_> = records
        .into_iter()
        .filter(|r| r.iter().any(|c| !c.trim().is_empty()))
        .collect();

    let types: Vec<SqlType> = (0..names.len())
        .map(|i| SqlType::infer(records.iter().map(|r| r.get(i).unwrap_or(""))))
        .collect();

    let column_defs = names
        .iter()
        .zip(&types)
        .map(|(name, ty)| format!("{} {}", quote_identifier(name), ty.as_sql()))
        .collect::<Vec<_>>()
        .join(", ");
    let column_refs: Vec<&str> = names.iter().map(String::as_str).collect();

    let tx = conn.unchecked_transaction()?;
    if db::table_exists(&tx, table)? {
        info!("Replacing existing table {}", table);
    }
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {table}; CREATE TABLE {table} ({defs});",
        table = quote_identifier(table),
        defs = column_defs
    ))?;
    {
        let mut stmt = tx.prepare(&db::insert_sql(table, &column_refs))?;
        for record in &records {
            let values = types
                .iter()
                .enumerate()
                .map(|(i, ty)| ty.convert(record.get(i).unwrap_or("")));
            stmt.execute(params_from_iter(values))?;
        }
    }
    tx.commit()?;

    info!(
        "Ingested {} rows into {} in {}ms",
        records.len(),
        table,
        started_at.elapsed().as_millis()
    );

    Ok(IngestReport {
        table: table.to_string(),
        columns: names.into_iter().zip(types).collect(),
        rows: records.len(),
    })
}

/// Loads the CSV file at `path` into `table`
pub fn ingest_file(conn: &Connection, table: &str, path: &Path) -> Result<IngestReport> {
    debug!("Reading {} for table {}", path.display(), table);
    let file = File::open(path).map_err(|e| {
        TrafficError::Ingest(format!("cannot read {}: {}", path.display(), e))
    })?;
    ingest_csv(conn, table, file)
}

/// Loads all three sources named in `sources` into the store at `db_path`
///
/// The store is created if it does not exist.
pub fn ingest_all(db_path: &Path, sources: &IngestConfig) -> Result<Vec<IngestReport>> {
    let conn = db::create(db_path)?;
    let reports = [
        (UK_TABLE, &sources.uk),
        (LONDON_CARS_TABLE, &sources.london_cars),
        (LONDON_ALL_TABLE, &sources.london_all),
    ]
    .into_iter()
    .map(|(table, path)| ingest_file(&conn, table, path))
    .collect::<Result<Vec<_>>>()?;

    conn.close().map_err(|(_, e)| TrafficError::Database(e))?;
    Ok(reports)
}
