//! Conversions between JSON cells and SQLite values.
//!
//! Booleans are stored as `0`/`1`, numbers and text pass through, and
//! arrays/objects are stored as compact JSON text.

use rusqlite::types::{Value as SqlValue, ValueRef};
use serde_json::Value as Json;
use sluice_core::{Value, record::Row};

use crate::Result;

pub fn to_sql(cell: &Json) -> SqlValue {
  match Value::from(cell) {
    Value::Null => SqlValue::Null,
    Value::Bool(b) => SqlValue::Integer(i64::from(b)),
    Value::Int(i) => SqlValue::Integer(i),
    Value::Float(f) => SqlValue::Real(f),
    Value::Text(s) | Value::Composite(s) => SqlValue::Text(s),
    Value::Bytes(b) => SqlValue::Blob(b),
  }
}

/// Compact JSON of the whole original record.
pub fn raw_json(row: &Row) -> Result<String> { Ok(serde_json::to_string(row)?) }

/// Read a stored cell back as JSON. Blobs are decoded lossily as text.
pub fn from_sql(cell: ValueRef<'_>) -> Json {
  match cell {
    ValueRef::Null => Json::Null,
    ValueRef::Integer(i) => Json::from(i),
    ValueRef::Real(f) => Json::from(f),
    ValueRef::Text(t) | ValueRef::Blob(t) => {
      Json::String(String::from_utf8_lossy(t).into_owned())
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn booleans_become_integers() {
    assert_eq!(to_sql(&json!(true)), SqlValue::Integer(1));
    assert_eq!(to_sql(&json!(false)), SqlValue::Integer(0));
  }

  #[test]
  fn composites_become_json_text() {
    assert_eq!(
      to_sql(&json!({ "a": [1, null] })),
      SqlValue::Text(r#"{"a":[1,null]}"#.into())
    );
  }

  #[test]
  fn raw_json_keeps_key_order() {
    let Json::Object(row) = json!({ "z": 1, "a": [true] }) else {
      unreachable!()
    };
    assert_eq!(raw_json(&row).unwrap(), r#"{"z":1,"a":[true]}"#);
  }

  #[test]
  fn non_finite_reals_read_back_as_null() {
    assert_eq!(from_sql(ValueRef::Real(f64::NAN)), Json::Null);
    assert_eq!(from_sql(ValueRef::Real(0.5)), json!(0.5));
  }
}
