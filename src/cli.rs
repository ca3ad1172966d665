use crate::accessor::TableAccessor;
use crate::config::{self, Config};
use crate::core::db::{format_value, parse_value, value_to_json};
use crate::core::{Result, TrafficError};
use crate::ingest;
use rusqlite::types::Value;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

pub const USAGE: &str = "\
Usage: trafficdb [--config PATH] [--db PATH] <command>

Commands:
  tables                               List tables in the store
  columns <table>                      List a table's columns and declared types
  rows <table> [--json]                Print every row of a table
  insert <table> <column=value>...     Insert one row
  update <table> <set-clause> <where>  Update rows matching a condition
  delete <table> <where>               Delete rows matching a condition
  ingest                               Load the configured CSV sheets
  help                                 Show this message";

/// Represents a parsed command line command.
#[derive(Debug, PartialEq)]
pub enum Command {
    Tables,
    Columns(String),
    Rows { table: String, json: bool },
    Insert { table: String, assignments: Vec<(String, String)> },
    Update { table: String, set_clause: String, condition: String },
    Delete { table: String, condition: String },
    Ingest,
    Help,
    Unknown(String),
}

/// Global options plus the command to run.
#[derive(Debug, PartialEq)]
pub struct Invocation {
    pub config: Option<PathBuf>,
    pub db: Option<PathBuf>,
    pub command: Command,
}

/// Parses the arguments that follow the program name.
pub fn parse_args(args: &[String]) -> Invocation {
    let mut config = None;
    let mut db = None;
    let mut rest: Vec<&str> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" if rest.is_empty() => config = iter.next().map(PathBuf::from),
            "--db" if rest.is_empty() => db = iter.next().map(PathBuf::from),
            other => rest.push(other),
        }
    }

    Invocation {
        config,
        db,
        command: parse_command(&rest),
    }
}

fn parse_command(parts: &[&str]) -> Command {
    let unknown = || Command::Unknown(parts.join(" "));
    match parts {
        [] | ["help"] | ["--help"] | ["-h"] => Command::Help,
        ["tables"] => Command::Tables,
        ["columns", table] => Command::Columns(table.to_string()),
        ["rows", table] => Command::Rows {
            table: table.to_string(),
            json: false,
        },
        ["rows", table, "--json"] => Command::Rows {
            table: table.to_string(),
            json: true,
        },
        ["insert", table, pairs @ ..] if !pairs.is_empty() => {
            let assignments: Option<Vec<_>> = pairs
                .iter()
                .map(|p| {
                    p.split_once('=')
                        .filter(|(col, _)| !col.is_empty())
                        .map(|(col, val)| (col.to_string(), val.to_string()))
                })
                .collect();
            match assignments {
                Some(assignments) => Command::Insert {
                    table: table.to_string(),
                    assignments,
                },
                None => unknown(),
            }
        }
        ["update", table, set_clause, condition] => Command::Update {
            table: table.to_string(),
            set_clause: set_clause.to_string(),
            condition: condition.to_string(),
        },
        ["delete", table, condition] => Command::Delete {
            table: table.to_string(),
            condition: condition.to_string(),
        },
        ["ingest"] => Command::Ingest,
        _ => unknown(),
    }
}

fn load_settings(invocation: &Invocation) -> Result<Option<Config>> {
    match &invocation.config {
        Some(path) => config::load_config(path).map(Some),
        None => match config::default_config_path().filter(|p| p.exists()) {
            Some(path) => config::load_config(path).map(Some),
            None => Ok(None),
        },
    }
}

fn database_path(invocation: &Invocation, settings: Option<&Config>) -> Result<PathBuf> {
    invocation
        .db
        .clone()
        .or_else(|| settings.map(|c| c.database.path.clone()))
        .ok_or_else(|| TrafficError::Config("no database given; use --db or a config file".to_string()))
}

/// Executes `invocation`, writing human-readable output to `out`.
///
/// Fail-soft accessor operations still succeed here; only connection,
/// validation, configuration and ingestion errors are returned.
pub fn run<W: Write>(invocation: &Invocation, out: &mut W) -> Result<()> {
    debug!("Running {:?}", invocation.command);

    match &invocation.command {
        Command::Help => {
            writeln!(out, "{}", USAGE)?;
            return Ok(());
        }
        Command::Unknown(input) => {
            return Err(TrafficError::Config(format!("unrecognized command: {}\n\n{}", input, USAGE)));
        }
        _ => {}
    }

    let settings = load_settings(invocation)?;
    let db_path = database_path(invocation, settings.as_ref())?;

    if invocation.command == Command::Ingest {
        let sources = settings
            .as_ref()
            .and_then(|c| c.ingest.as_ref())
            .ok_or_else(|| TrafficError::Config("no [ingest] section in configuration".to_string()))?;
        for report in ingest::ingest_all(&db_path, sources)? {
            writeln!(out, "{}: {} rows", report.table, report.rows)?;
        }
        return Ok(());
    }

    let accessor = TableAccessor::open(&db_path)?;
    let result = run_on(&accessor, &invocation.command, out);
    accessor.close();
    result
}

fn run_on<W: Write>(accessor: &TableAccessor, command: &Command, out: &mut W) -> Result<()> {
    match command {
        Command::Tables => {
            for table in accessor.list_tables() {
                writeln!(out, "{}", table)?;
            }
        }
        Command::Columns(table) => {
            for column in accessor.describe(table) {
                writeln!(out, "{}\t{}", column.name, column.type_name)?;
            }
        }
        Command::Rows { table, json } => {
            let columns = accessor.list_columns(table);
            let rows = accessor.list_rows(table);
            if *json {
                let objects: Vec<serde_json::Value> = rows
                    .iter()
                    .map(|row| {
                        columns
                            .iter()
                            .cloned()
                            .zip(row.iter().map(value_to_json))
                            .collect::<serde_json::Map<_, _>>()
                            .into()
                    })
                    .collect();
                writeln!(out, "{}", serde_json::to_string_pretty(&objects)?)?;
            } else {
                writeln!(out, "{}", columns.join("\t"))?;
                for row in rows {
                    let cells: Vec<String> = row.iter().map(format_value).collect();
                    writeln!(out, "{}", cells.join("\t"))?;
                }
            }
        }
        Command::Insert { table, assignments } => {
            let columns: Vec<&str> = assignments.iter().map(|(c, _)| c.as_str()).collect();
            let values: Vec<Value> = assignments.iter().map(|(_, v)| parse_value(v)).collect();
            accessor.insert_row(table, &columns, &values)?;
        }
        Command::Update {
            table,
            set_clause,
            condition,
        } => {
            let changed = accessor.update_rows(table, set_clause, condition);
            writeln!(out, "{} rows updated", changed)?;
        }
        Command::Delete { table, condition } => {
            let removed = accessor.delete_rows(table, condition);
            writeln!(out, "{} rows deleted", removed)?;
        }
        Command::Ingest | Command::Help | Command::Unknown(_) => {}
    }
    Ok(())
}
