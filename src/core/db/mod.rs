/// Database Module
///
/// Fallible building blocks over a single SQLite connection. Everything here
/// returns `Result`; the fail-soft policy lives one level up, in
/// [`crate::accessor::TableAccessor`].
///
/// ## Architecture
///
/// - **Connection Management** (`connection.rs`): opening an existing store, or creating one for ingestion
/// - **Schema Introspection** (`schema.rs`): column metadata and table listing
/// - **Query Execution** (`query.rs`): identifier quoting, statement text, row decoding
pub mod connection;
pub mod query;
pub mod schema;

pub use connection::*;
pub use query::*;
pub use schema::*;
