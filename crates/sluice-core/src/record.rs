//! Records and column documentation as supplied by a record source.
//!
//! The usual source is a JSON document shaped
//! `{ "<record id>": { "<column>": <value>, ... }, ... }` plus an optional
//! documentation document shaped `{ "<column>": "<description>", ... }`.

use serde_json::Value as Json;

use crate::{Error, Result};

/// Column name to raw JSON value, in document order.
pub type Row = serde_json::Map<String, Json>;

/// A single record: its stable identifier and its cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
  pub id:  String,
  pub row: Row,
}

/// An ordered batch of records destined for one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Records {
  records: Vec<Record>,
}

impl Records {
  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  pub fn iter(&self) -> std::slice::Iter<'_, Record> { self.records.iter() }

  pub fn rows(&self) -> impl Iterator<Item = &Row> {
    self.records.iter().map(|r| &r.row)
  }

  /// Build a batch from a parsed document whose top level maps record ids to
  /// objects.
  pub fn from_json(doc: Json) -> Result<Self> {
    let Json::Object(top) = doc else {
      return Err(Error::MalformedDocument(format!(
        "expected an object of records, found {}",
        json_type_name(&doc)
      )));
    };

    top
      .into_iter()
      .map(|(id, row)| match row {
        Json::Object(row) => Ok(Record { id, row }),
        other => Err(Error::MalformedDocument(format!(
          "record {id:?} must be an object, found {}",
          json_type_name(&other)
        ))),
      })
      .collect::<Result<Vec<_>>>()
      .map(|records| Self { records })
  }

  pub fn parse(s: &str) -> Result<Self> {
    Self::from_json(serde_json::from_str(s)?)
  }
}

impl FromIterator<(String, Row)> for Records {
  fn from_iter<I: IntoIterator<Item = (String, Row)>>(iter: I) -> Self {
    Self {
      records: iter
        .into_iter()
        .map(|(id, row)| Record { id, row })
        .collect(),
    }
  }
}

impl<'a> IntoIterator for &'a Records {
  type Item = &'a Record;
  type IntoIter = std::slice::Iter<'a, Record>;

  fn into_iter(self) -> Self::IntoIter { self.records.iter() }
}

/// Free-text description per column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnDocs {
  entries: Vec<(String, String)>,
}

impl ColumnDocs {
  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.entries.iter().map(|(c, d)| (c.as_str(), d.as_str()))
  }

  pub fn get(&self, column: &str) -> Option<&str> {
    self
      .entries
      .iter()
      .find(|(c, _)| c == column)
      .map(|(_, d)| d.as_str())
  }

  /// Normalize a documentation document.
  ///
  /// `null` and `false` become the empty string, strings are kept and any
  /// other value is kept as its JSON text.
  pub fn from_json(doc: Json) -> Result<Self> {
    let entries = match doc {
      Json::Null => Vec::new(),
      Json::Object(map) => map
        .into_iter()
        .map(|(col, v)| {
          let desc = match v {
            Json::Null | Json::Bool(false) => String::new(),
            Json::String(s) => s,
            other => other.to_string(),
          };
          (col, desc)
        })
        .collect(),
      other => {
        return Err(Error::MalformedDocument(format!(
          "expected an object of column descriptions, found {}",
          json_type_name(&other)
        )));
      }
    };
    Ok(Self { entries })
  }

  pub fn parse(s: &str) -> Result<Self> {
    Self::from_json(serde_json::from_str(s)?)
  }
}

impl<C: Into<String>, D: Into<String>> FromIterator<(C, D)> for ColumnDocs {
  fn from_iter<I: IntoIterator<Item = (C, D)>>(iter: I) -> Self {
    Self {
      entries: iter
        .into_iter()
        .map(|(c, d)| (c.into(), d.into()))
        .collect(),
    }
  }
}

fn json_type_name(v: &Json) -> &'static str {
  match v {
    Json::Null => "null",
    Json::Bool(_) => "a boolean",
    Json::Number(_) => "a number",
    Json::String(_) => "a string",
    Json::Array(_) => "an array",
    Json::Object(_) => "an object",
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn parses_records_in_document_order() {
    let records = Records::parse(
      r#"{"b": {"x": 1}, "a": {"y": "two", "x": null}}"#,
    )
    .unwrap();

    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);

    let cols: Vec<_> = records.iter().nth(1).unwrap().row.keys().collect();
    assert_eq!(cols, ["y", "x"]);
  }

  #[test]
  fn rejects_non_object_top_level() {
    let err = Records::from_json(json!([1, 2])).unwrap_err();
    assert!(matches!(err, Error::MalformedDocument(_)));
  }

  #[test]
  fn rejects_non_object_record() {
    let err = Records::from_json(json!({ "r1": 5 })).unwrap_err();
    assert!(
      matches!(err, Error::MalformedDocument(ref m) if m.contains("\"r1\""))
    );
  }

  #[test]
  fn docs_are_normalized() {
    let docs = ColumnDocs::from_json(json!({
      "a": "first",
      "b": null,
      "c": false,
      "d": 3,
    }))
    .unwrap();

    assert_eq!(docs.get("a"), Some("first"));
    assert_eq!(docs.get("b"), Some(""));
    assert_eq!(docs.get("c"), Some(""));
    assert_eq!(docs.get("d"), Some("3"));
    assert_eq!(docs.get("e"), None);
  }

  #[test]
  fn null_docs_document_is_empty() {
    assert!(ColumnDocs::from_json(Json::Null).unwrap().is_empty());
    assert!(ColumnDocs::from_json(json!("nope")).is_err());
  }
}
