//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`].

use std::path::Path;

use rusqlite::Connection;
use sluice_core::{
  record::{ColumnDocs, Records},
  schema::DatabaseSchema,
  store::{IntrospectOptions, RecordStore, WriteSummary},
};

use crate::{Error, Result, introspect, write};

/// A record store backed by a single SQLite database.
///
/// The connection is owned exclusively; one write or introspection runs at a
/// time.
pub struct SqliteStore {
  pub(crate) conn: Connection,
}

impl SqliteStore {
  /// Open (or create) a database at `path`.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::init(Connection::open(path)?)
  }

  /// Open an in-memory database — useful for testing.
  pub fn open_in_memory() -> Result<Self> {
    Self::init(Connection::open_in_memory()?)
  }

  /// Write-ahead logging lets readers proceed while a batch is being
  /// written. In-memory databases report `memory` instead.
  fn init(conn: Connection) -> Result<Self> {
    let mode: String =
      conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
        row.get(0)
      })?;
    conn.pragma_update(None, "foreign_keys", true)?;
    tracing::debug!(journal_mode = %mode, "opened sqlite store");
    Ok(Self { conn })
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  fn write(
    &mut self,
    table: &str,
    records: &Records,
    docs: Option<&ColumnDocs>,
  ) -> Result<WriteSummary> {
    write::write_batch(&mut self.conn, table, records, docs)
  }

  fn introspect(&self, opts: &IntrospectOptions) -> Result<DatabaseSchema> {
    introspect::introspect(&self.conn, opts)
  }
}
