/// Core Module for trafficdb
///
/// This module contains the storage plumbing shared by the table accessor
/// and the ingestion routine: connection setup, schema introspection,
/// statement building and the crate-wide error type.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{Result, TrafficError};
