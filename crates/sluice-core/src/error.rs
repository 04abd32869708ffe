//! Error types for `sluice-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A write was attempted with no records; a table needs at least one
  /// column.
  #[error("record set is empty")]
  EmptyRecords,

  #[error("malformed document: {0}")]
  MalformedDocument(String),

  /// A record key collides with a column the writer manages itself.
  #[error("column name {0:?} is reserved")]
  ReservedColumn(String),

  #[error("invalid table pattern {pattern:?}: {reason}")]
  InvalidPattern { pattern: String, reason: String },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
