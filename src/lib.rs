// Core infrastructure modules
pub mod core;

// Feature-specific modules
pub mod accessor;
pub mod cli;
pub mod config;
pub mod ingest;
pub mod kinds;

#[cfg(test)]
mod test_utils;

pub use accessor::TableAccessor;
pub use crate::core::db::Row;
pub use crate::core::{Result, TrafficError};
pub use kinds::ColumnKind;
