//! SQL text for the tables the writer manages.
//!
//! Every identifier that comes from user data goes through [`quote_ident`].

use sluice_core::{Affinity, analyze::UnifiedSchema};

/// Primary-key column holding the record identifier.
pub const RECORD_ID: &str = "record_id";

/// Column holding the complete original record as JSON.
pub const RAW_JSON: &str = "raw_json";

const COLUMN_MAP_SUFFIX: &str = "__column_map";
const COLUMN_DOCS_SUFFIX: &str = "__column_docs";

/// Quote `name` as an SQLite identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
  format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn column_map_table(table: &str) -> String {
  format!("{table}{COLUMN_MAP_SUFFIX}")
}

pub fn column_docs_table(table: &str) -> String {
  format!("{table}{COLUMN_DOCS_SUFFIX}")
}

/// Whether `column` collides with a writer-managed column. SQLite compares
/// identifiers case-insensitively.
pub fn is_reserved(column: &str) -> bool {
  column.eq_ignore_ascii_case(RECORD_ID) || column.eq_ignore_ascii_case(RAW_JSON)
}

/// `CREATE TABLE` for the main table: record id, one nullable column per
/// inferred column, then the raw JSON fallback.
pub fn create_main_table(table: &str, schema: &UnifiedSchema) -> String {
  let mut defs = vec![format!("{} TEXT PRIMARY KEY", quote_ident(RECORD_ID))];
  defs.extend(
    schema
      .columns()
      .iter()
      .map(|c| format!("{} {}", quote_ident(&c.name), c.affinity.as_sql())),
  );
  defs.push(format!("{} TEXT", quote_ident(RAW_JSON)));

  format!(
    "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
    quote_ident(table),
    defs.join(",\n    ")
  )
}

pub fn add_column(table: &str, column: &str, affinity: Affinity) -> String {
  format!(
    "ALTER TABLE {} ADD COLUMN {} {}",
    quote_ident(table),
    quote_ident(column),
    affinity.as_sql()
  )
}

/// Original column name to stored name; reserved for renames.
pub fn create_column_map(table: &str) -> String {
  format!(
    "CREATE TABLE IF NOT EXISTS {} (
    original_name TEXT PRIMARY KEY,
    stored_name   TEXT NOT NULL
)",
    quote_ident(&column_map_table(table))
  )
}

pub fn insert_column_map(table: &str) -> String {
  format!(
    "INSERT OR IGNORE INTO {} (original_name, stored_name) VALUES (?1, ?2)",
    quote_ident(&column_map_table(table))
  )
}

pub fn create_column_docs(table: &str) -> String {
  format!(
    "CREATE TABLE IF NOT EXISTS {} (
    column_name TEXT PRIMARY KEY,
    description TEXT
)",
    quote_ident(&column_docs_table(table))
  )
}

pub fn upsert_column_doc(table: &str) -> String {
  format!(
    "INSERT INTO {} (column_name, description) VALUES (?1, ?2)
     ON CONFLICT(column_name) DO UPDATE SET description = excluded.description",
    quote_ident(&column_docs_table(table))
  )
}

/// Upsert keyed by record id. On conflict every listed column and the raw
/// JSON are overwritten; columns not listed keep their stored values.
pub fn upsert_row<'a>(
  table: &str,
  columns: impl IntoIterator<Item = &'a str>,
) -> String {
  let columns: Vec<String> = columns.into_iter().map(quote_ident).collect();
  let record_id = quote_ident(RECORD_ID);
  let raw_json = quote_ident(RAW_JSON);

  let mut names = vec![record_id.clone()];
  names.extend(columns.iter().cloned());
  names.push(raw_json.clone());

  let placeholders: Vec<String> =
    (1..=names.len()).map(|i| format!("?{i}")).collect();

  let mut updates: Vec<String> =
    columns.iter().map(|c| format!("{c} = excluded.{c}")).collect();
  updates.push(format!("{raw_json} = excluded.{raw_json}"));

  format!(
    "INSERT INTO {} ({}) VALUES ({})
     ON CONFLICT({record_id}) DO UPDATE SET {}",
    quote_ident(table),
    names.join(", "),
    placeholders.join(", "),
    updates.join(", ")
  )
}
