//! The relational writer: create or extend a table for a batch of records
//! and upsert them.

use std::collections::HashSet;

use rusqlite::{Connection, params, params_from_iter, types::Value as SqlValue};
use sluice_core::{
  analyze::{UnifiedSchema, analyze},
  record::{ColumnDocs, Records},
  store::WriteSummary,
};

use crate::{
  Result,
  encode::{raw_json, to_sql},
  schema,
};

/// Write `records` into `table` in a single transaction.
///
/// DDL for the main and auxiliary tables runs before any row is upserted;
/// any failure rolls the whole batch back.
pub fn write_batch(
  conn: &mut Connection,
  table: &str,
  records: &Records,
  docs: Option<&ColumnDocs>,
) -> Result<WriteSummary> {
  if records.is_empty() {
    return Err(sluice_core::Error::EmptyRecords.into());
  }

  let unified = analyze(records.rows());
  if let Some(name) = unified.names().find(|n| schema::is_reserved(n)) {
    return Err(sluice_core::Error::ReservedColumn(name.to_owned()).into());
  }

  let tx = conn.transaction()?;

  let added_columns = ensure_main_table(&tx, table, &unified)?;

  tx.execute(&schema::create_column_map(table), [])?;
  {
    let mut insert = tx.prepare(&schema::insert_column_map(table))?;
    for name in unified.names() {
      insert.execute(params![name, name])?;
    }
  }

  let docs = docs.filter(|d| !d.is_empty());
  if let Some(docs) = docs {
    tx.execute(&schema::create_column_docs(table), [])?;
    let mut upsert = tx.prepare(&schema::upsert_column_doc(table))?;
    for (column, description) in docs.iter() {
      upsert.execute(params![column, description])?;
    }
  }

  {
    let mut upsert = tx.prepare(&schema::upsert_row(table, unified.names()))?;
    for record in records {
      let mut values = Vec::with_capacity(unified.len() + 2);
      values.push(SqlValue::Text(record.id.clone()));
      values.extend(unified.names().map(|name| {
        record.row.get(name).map_or(SqlValue::Null, to_sql)
      }));
      values.push(SqlValue::Text(raw_json(&record.row)?));
      upsert.execute(params_from_iter(values))?;
    }
  }

  tx.commit()?;

  let summary = WriteSummary {
    table: table.to_owned(),
    rows: records.len(),
    columns: unified.len(),
    added_columns,
    docs: docs.map_or(0, ColumnDocs::len),
  };
  tracing::info!(
    table,
    rows = summary.rows,
    columns = summary.columns,
    added = summary.added_columns.len(),
    docs = summary.docs,
    "wrote batch"
  );
  Ok(summary)
}

/// Create the main table, or add the columns it is missing. Returns the
/// names of columns that did not exist before.
fn ensure_main_table(
  conn: &Connection,
  table: &str,
  unified: &UnifiedSchema,
) -> Result<Vec<String>> {
  let existing = existing_columns(conn, table)?;

  if existing.is_empty() {
    conn.execute(&schema::create_main_table(table, unified), [])?;
    tracing::debug!(table, columns = unified.len(), "created table");
    return Ok(unified.names().map(str::to_owned).collect());
  }

  let mut added = Vec::new();
  for col in unified.columns() {
    if existing.contains(&col.name.to_ascii_lowercase()) {
      continue;
    }
    conn.execute(&schema::add_column(table, &col.name, col.affinity), [])?;
    tracing::info!(table, column = %col.name, affinity = %col.affinity, "added column");
    added.push(col.name.clone());
  }
  Ok(added)
}

/// Lower-cased column names of `table`; empty if the table does not exist.
fn existing_columns(conn: &Connection, table: &str) -> Result<HashSet<String>> {
  let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
  let names = stmt
    .query_map(params![table], |row| row.get::<_, String>(0))?
    .map(|name| name.map(|n| n.to_ascii_lowercase()))
    .collect::<rusqlite::Result<HashSet<_>>>()?;
  Ok(names)
}
