//! The schema introspector: describe every user table and sample text
//! columns for embedded JSON.
//!
//! Per-item failures (a row count, a documentation table, a column sample)
//! are logged and degrade to "unknown" rather than aborting the run.

use std::collections::{BTreeMap, HashMap, HashSet};

use rusqlite::{Connection, OptionalExtension as _, params, types::ValueRef};
use sluice_core::{
  schema::{
    ColumnDescriptor, DatabaseSchema, ForeignKey, IndexDescriptor, JsonHint,
    TableDescriptor,
  },
  shape::ShapeSampler,
  store::IntrospectOptions,
};

use crate::{
  Result, SqliteStore,
  schema::{column_docs_table, quote_ident},
};

pub fn introspect(
  conn: &Connection,
  opts: &IntrospectOptions,
) -> Result<DatabaseSchema> {
  let tables = list_tables(conn)?;
  let names: HashSet<&str> = tables.iter().map(|(n, _)| n.as_str()).collect();

  let mut descriptors = Vec::with_capacity(tables.len());
  for (name, create_sql) in &tables {
    let has_docs = names.contains(column_docs_table(name).as_str());
    descriptors.push(describe_table(
      conn,
      name,
      create_sql.clone(),
      has_docs,
      opts,
    )?);
  }

  tracing::debug!(tables = descriptors.len(), "introspected schema");
  Ok(DatabaseSchema { tables: descriptors })
}

/// User tables in name order, excluding SQLite's internal tables.
fn list_tables(conn: &Connection) -> Result<Vec<(String, Option<String>)>> {
  let mut stmt = conn.prepare(
    "SELECT name, sql FROM sqlite_master
     WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
     ORDER BY name",
  )?;
  let tables = stmt
    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(tables)
}

fn describe_table(
  conn: &Connection,
  name: &str,
  create_sql: Option<String>,
  has_docs: bool,
  opts: &IntrospectOptions,
) -> Result<TableDescriptor> {
  let mut columns = read_columns(conn, name)?;

  let mut pk: Vec<&ColumnDescriptor> =
    columns.iter().filter(|c| c.pk_position > 0).collect();
  pk.sort_by_key(|c| c.pk_position);
  let primary_key = pk.into_iter().map(|c| c.name.clone()).collect();

  let foreign_keys = read_foreign_keys(conn, name)?;
  let indexes = read_indexes(conn, name)?;

  if has_docs {
    let docs = read_docs(conn, name).unwrap_or_else(|e| {
      tracing::warn!(table = name, error = %e, "unreadable column docs");
      HashMap::new()
    });
    for col in &mut columns {
      col.doc = docs.get(&col.name).cloned();
    }
  }

  let row_count = if opts.include_row_counts {
    count_rows(conn, name)
      .inspect_err(|e| {
        tracing::warn!(table = name, error = %e, "row count failed");
      })
      .ok()
  } else {
    None
  };

  let mut hints = BTreeMap::new();
  for col in columns.iter().filter(|c| c.is_textual()) {
    match sample_column(conn, name, &col.name, opts.sample_limit) {
      Ok(Some(hint)) => {
        hints.insert(col.name.clone(), hint);
      }
      Ok(None) => {}
      Err(e) => {
        tracing::warn!(table = name, column = %col.name, error = %e, "sampling failed");
      }
    }
  }

  tracing::debug!(table = name, columns = columns.len(), hints = hints.len(), "described table");

  Ok(TableDescriptor {
    name: name.to_owned(),
    create_sql,
    row_count,
    columns,
    primary_key,
    foreign_keys,
    indexes,
    json_hints: (!hints.is_empty()).then_some(hints),
  })
}

fn read_columns(conn: &Connection, table: &str) -> Result<Vec<ColumnDescriptor>> {
  let mut stmt = conn.prepare(
    "SELECT name, type, \"notnull\", dflt_value, pk
     FROM pragma_table_info(?1) ORDER BY cid",
  )?;
  let columns = stmt
    .query_map(params![table], |row| {
      Ok(ColumnDescriptor {
        name:        row.get(0)?,
        decl_type:   row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        notnull:     row.get(2)?,
        default:     row.get(3)?,
        pk_position: row.get(4)?,
        doc:         None,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(columns)
}

fn read_foreign_keys(conn: &Connection, table: &str) -> Result<Vec<ForeignKey>> {
  let mut stmt =
    conn.prepare("SELECT * FROM pragma_foreign_key_list(?1) ORDER BY id, seq")?;
  let fks = stmt
    .query_map(params![table], |row| {
      Ok(ForeignKey {
        id:        row.get(0)?,
        seq:       row.get(1)?,
        table:     row.get(2)?,
        from:      row.get(3)?,
        to:        row.get(4)?,
        on_update: row.get(5)?,
        on_delete: row.get(6)?,
        match_:    row.get(7)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(fks)
}

fn read_indexes(conn: &Connection, table: &str) -> Result<Vec<IndexDescriptor>> {
  let mut list =
    conn.prepare("SELECT name, \"unique\" FROM pragma_index_list(?1) ORDER BY seq")?;
  let entries = list
    .query_map(params![table], |row| {
      Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut info =
    conn.prepare("SELECT name FROM pragma_index_info(?1) ORDER BY seqno")?;
  let mut indexes = Vec::with_capacity(entries.len());
  for (name, unique) in entries {
    // expression members have no column name
    let columns = info
      .query_map(params![name], |row| row.get::<_, Option<String>>(0))?
      .map(|c| c.map(|c| c.unwrap_or_else(|| "<expr>".to_owned())))
      .collect::<rusqlite::Result<Vec<_>>>()?;
    indexes.push(IndexDescriptor { name, unique, columns });
  }
  Ok(indexes)
}

fn read_docs(conn: &Connection, table: &str) -> Result<HashMap<String, String>> {
  let sql = format!(
    "SELECT column_name, COALESCE(description, '') FROM {}",
    quote_ident(&column_docs_table(table))
  );
  let mut stmt = conn.prepare(&sql)?;
  let docs = stmt
    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
    .collect::<rusqlite::Result<HashMap<_, _>>>()?;
  Ok(docs)
}

fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
  let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
  Ok(conn.query_row(&sql, [], |row| row.get(0))?)
}

/// Sample up to `limit` non-null values of `column` in row order and
/// summarize their JSON shape.
fn sample_column(
  conn: &Connection,
  table: &str,
  column: &str,
  limit: usize,
) -> Result<Option<JsonHint>> {
  let (table, column) = (quote_ident(table), quote_ident(column));
  let unordered =
    format!("SELECT {column} FROM {table} WHERE {column} IS NOT NULL");
  // WITHOUT ROWID tables have no rowid but are already scanned in key order
  let mut stmt = match conn.prepare(&format!("{unordered} ORDER BY rowid LIMIT ?1")) {
    Ok(stmt) => stmt,
    Err(_) => conn.prepare(&format!("{unordered} LIMIT ?1"))?,
  };

  let limit = i64::try_from(limit).unwrap_or(i64::MAX);
  let mut sampler = ShapeSampler::new();
  let mut rows = stmt.query(params![limit])?;
  while let Some(row) = rows.next()? {
    match row.get_ref(0)? {
      ValueRef::Text(t) | ValueRef::Blob(t) => sampler.observe_bytes(t),
      ValueRef::Null | ValueRef::Integer(_) | ValueRef::Real(_) => {}
    }
  }
  Ok(sampler.finish())
}

// ─── Documentation bundle ────────────────────────────────────────────────────

impl SqliteStore {
  /// Compact `name: description` listing of a table's documented columns,
  /// ordered by column name.
  ///
  /// Returns `None` if the table has no documentation table.
  pub fn column_docs_bundle(&self, table: &str) -> Result<Option<String>> {
    let docs_table = column_docs_table(table);
    let exists = self
      .conn
      .query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![docs_table],
        |_| Ok(()),
      )
      .optional()?
      .is_some();
    if !exists {
      return Ok(None);
    }

    let mut docs: Vec<(String, String)> =
      read_docs(&self.conn, table)?.into_iter().collect();
    docs.sort();

    let mut out = format!("Table {table} columns:");
    for (name, desc) in docs {
      out.push('\n');
      out.push_str(format!("{name}: {desc}").trim());
    }
    Ok(Some(out))
  }
}
