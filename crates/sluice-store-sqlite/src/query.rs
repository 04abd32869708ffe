//! Ad-hoc SQL returning JSON rows.

use rusqlite::params_from_iter;
use serde_json::Value as Json;
use sluice_core::record::Row;

use crate::{
  Result, SqliteStore,
  encode::{from_sql, to_sql},
};

impl SqliteStore {
  /// Run one statement with positional `params` and return every row as a
  /// JSON object keyed by result column name.
  ///
  /// Text cells that look like JSON are parsed; cells that fail to parse are
  /// returned as text. When `json_columns` is given, only those columns are
  /// considered for parsing.
  pub fn query(
    &self,
    sql: &str,
    params: &[Json],
    json_columns: Option<&[String]>,
  ) -> Result<Vec<Row>> {
    let mut stmt = self.conn.prepare(sql)?;
    let names: Vec<String> =
      stmt.column_names().into_iter().map(str::to_owned).collect();

    let mut rows = stmt.query(params_from_iter(params.iter().map(to_sql)))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
      let mut obj = Row::new();
      for (i, name) in names.iter().enumerate() {
        let cell = row.get_ref(i)?;
        let parse = json_columns.is_none_or(|cols| cols.contains(name));
        let value = match cell {
          rusqlite::types::ValueRef::Text(t) if parse => {
            let text = String::from_utf8_lossy(t);
            parse_json_like(&text).unwrap_or_else(|| Json::String(text.into_owned()))
          }
          other => from_sql(other),
        };
        obj.insert(name.clone(), value);
      }
      out.push(obj);
    }

    tracing::debug!(rows = out.len(), "query finished");
    Ok(out)
  }
}

/// Parse `text` if, after trimming, it starts like an object or array, is a
/// JSON literal, or is a plain decimal number.
fn parse_json_like(text: &str) -> Option<Json> {
  let s = text.trim();
  let looks_like_json = s.starts_with(['{', '['])
    || matches!(s, "true" | "false" | "null")
    || is_plain_decimal(s);
  if !looks_like_json {
    return None;
  }
  serde_json::from_str(s).ok()
}

/// Digits with at most one `.`, e.g. `42` or `3.5`.
fn is_plain_decimal(s: &str) -> bool {
  s.bytes().any(|b| b.is_ascii_digit())
    && s.bytes().all(|b| b.is_ascii_digit() || b == b'.')
    && s.bytes().filter(|&b| b == b'.').count() <= 1
}
