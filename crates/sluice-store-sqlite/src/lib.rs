//! SQLite backend for sluice.
//!
//! [`SqliteStore`] writes schemaless records into typed tables and reads the
//! resulting schema back, including hints about JSON embedded in text
//! columns. All access is synchronous on the caller's thread.

mod encode;
mod introspect;
mod query;
mod schema;
mod store;
mod write;

pub mod error;

pub use error::{Error, Result};
pub use schema::{RAW_JSON, RECORD_ID, column_docs_table, column_map_table};
pub use store::SqliteStore;
