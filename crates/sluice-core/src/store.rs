//! The `RecordStore` trait and its option/summary types.
//!
//! Implemented by storage backends (e.g. `sluice-store-sqlite`). The CLI
//! depends on this abstraction for loading and introspection.

use crate::{
  record::{ColumnDocs, Records},
  schema::DatabaseSchema,
};

/// Parameters for [`RecordStore::introspect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntrospectOptions {
  /// Maximum number of non-null values sampled per text column.
  pub sample_limit:       usize,
  pub include_row_counts: bool,
}

impl Default for IntrospectOptions {
  fn default() -> Self {
    Self {
      sample_limit:       50,
      include_row_counts: true,
    }
  }
}

/// Outcome of a successful [`RecordStore::write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
  pub table:         String,
  /// Records upserted.
  pub rows:          usize,
  /// Columns in the batch's unified schema.
  pub columns:       usize,
  /// Columns that did not exist in the table before this write.
  pub added_columns: Vec<String>,
  /// Documentation entries upserted.
  pub docs:          usize,
}

/// A relational store that schemaless records can be written into and whose
/// schema can be read back.
///
/// All methods are synchronous and run to completion on the calling thread.
pub trait RecordStore {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create or extend `table` to hold `records` and upsert every record by
  /// its identifier, all inside a single transaction.
  ///
  /// Returns an error without touching the store if `records` is empty.
  fn write(
    &mut self,
    table: &str,
    records: &Records,
    docs: Option<&ColumnDocs>,
  ) -> Result<WriteSummary, Self::Error>;

  /// Describe every user table, sampling text columns for embedded JSON.
  fn introspect(
    &self,
    opts: &IntrospectOptions,
  ) -> Result<DatabaseSchema, Self::Error>;
}
