//! Schema analysis over heterogeneous records.

use std::collections::HashMap;

use crate::{
  affinity::{Affinity, affinity_of},
  record::Row,
  value::Value,
};

/// One inferred column. Every inferred column is nullable.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSchema {
  pub name:     String,
  pub affinity: Affinity,
  /// First non-null value seen for this column, if any.
  pub sample:   Option<serde_json::Value>,
}

/// The unified column set of a batch of records, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnifiedSchema {
  columns: Vec<ColumnSchema>,
  index:   HashMap<String, usize>,
}

impl UnifiedSchema {
  pub fn is_empty(&self) -> bool { self.columns.is_empty() }

  pub fn len(&self) -> usize { self.columns.len() }

  pub fn columns(&self) -> &[ColumnSchema] { &self.columns }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.columns.iter().map(|c| c.name.as_str())
  }

  pub fn get(&self, name: &str) -> Option<&ColumnSchema> {
    self.index.get(name).map(|&i| &self.columns[i])
  }

  pub fn affinity(&self, name: &str) -> Option<Affinity> {
    self.get(name).map(|c| c.affinity)
  }

  /// Fold one record into the schema. Columns absent from `row` are left
  /// untouched.
  pub fn observe(&mut self, row: &Row) {
    for (name, raw) in row {
      let affinity = affinity_of(&Value::from(raw));
      match self.index.get(name) {
        Some(&i) => {
          let col = &mut self.columns[i];
          col.affinity = col.affinity.merge(affinity);
          if col.sample.is_none() && !raw.is_null() {
            col.sample = Some(raw.clone());
          }
        }
        None => {
          self.index.insert(name.clone(), self.columns.len());
          self.columns.push(ColumnSchema {
            name: name.clone(),
            affinity,
            sample: (!raw.is_null()).then(|| raw.clone()),
          });
        }
      }
    }
  }
}

/// Infer the unified schema of `rows`. Zero rows yield an empty schema.
pub fn analyze<'a>(rows: impl IntoIterator<Item = &'a Row>) -> UnifiedSchema {
  let mut schema = UnifiedSchema::default();
  for row in rows {
    schema.observe(row);
  }
  schema
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn row(v: serde_json::Value) -> Row {
    match v {
      serde_json::Value::Object(m) => m,
      _ => panic!("not an object"),
    }
  }

  #[test]
  fn empty_input_gives_empty_schema() {
    let schema = analyze(std::iter::empty::<&Row>());
    assert!(schema.is_empty());
  }

  #[test]
  fn columns_are_unioned_in_first_seen_order() {
    let rows = [
      row(json!({ "id": 7, "tag": "x" })),
      row(json!({ "id": 8, "tag": "y", "extra": [1, 2] })),
    ];
    let schema = analyze(&rows);

    let names: Vec<_> = schema.names().collect();
    assert_eq!(names, ["id", "tag", "extra"]);
    assert_eq!(schema.affinity("id"), Some(Affinity::Integer));
    assert_eq!(schema.affinity("tag"), Some(Affinity::Text));
    assert_eq!(schema.affinity("extra"), Some(Affinity::Text));
  }

  #[test]
  fn affinity_escalates_across_records() {
    let rows = [
      row(json!({ "n": 1 })),
      row(json!({ "n": 2.5 })),
      row(json!({ "m": true })),
      row(json!({ "m": "yes" })),
    ];
    let schema = analyze(&rows);
    assert_eq!(schema.affinity("n"), Some(Affinity::Real));
    assert_eq!(schema.affinity("m"), Some(Affinity::Text));
  }

  #[test]
  fn absent_keys_do_not_escalate() {
    let rows = [
      row(json!({ "a": 1.5, "b": 1 })),
      row(json!({ "a": 2.0 })),
      row(json!({ "c": "t" })),
    ];
    let schema = analyze(&rows);
    assert_eq!(schema.affinity("a"), Some(Affinity::Real));
    assert_eq!(schema.affinity("b"), Some(Affinity::Integer));
  }

  #[test]
  fn analysis_is_order_independent() {
    let rows = [
      row(json!({ "a": 1, "b": "s" })),
      row(json!({ "a": 0.5 })),
      row(json!({ "b": null, "c": {} })),
    ];
    let forward = analyze(&rows);
    let backward = analyze(rows.iter().rev());
    for col in forward.columns() {
      assert_eq!(backward.affinity(&col.name), Some(col.affinity));
    }
    assert_eq!(forward.len(), backward.len());
  }

  #[test]
  fn sample_is_first_non_null_value() {
    let rows = [
      row(json!({ "a": null })),
      row(json!({ "a": "first" })),
      row(json!({ "a": "second", "z": null })),
    ];
    let schema = analyze(&rows);
    assert_eq!(schema.get("a").unwrap().sample, Some(json!("first")));
    assert_eq!(schema.get("z").unwrap().sample, None);
    assert_eq!(schema.affinity("z"), Some(Affinity::Integer));
  }
}
