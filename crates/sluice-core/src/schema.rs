//! Introspected schema descriptors.
//!
//! These types are the structured interchange form of an introspected
//! database. Field names are part of the contract with consumers parsing the
//! JSON and must not be renamed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::kind::ValueKind;

/// Every user table of a database, in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSchema {
  pub tables: Vec<TableDescriptor>,
}

impl DatabaseSchema {
  pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
    self.tables.iter().find(|t| t.name == name)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
  pub name:         String,
  pub create_sql:   Option<String>,
  /// `None` when counts were not requested or the count query failed.
  pub row_count:    Option<i64>,
  pub columns:      Vec<ColumnDescriptor>,
  /// Primary-key columns ordered by key position.
  pub primary_key:  Vec<String>,
  pub foreign_keys: Vec<ForeignKey>,
  pub indexes:      Vec<IndexDescriptor>,
  /// Embedded-JSON hints keyed by column name; `None` when no column
  /// carried a parseable sample.
  pub json_hints:   Option<BTreeMap<String, JsonHint>>,
}

impl TableDescriptor {
  pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
    self.columns.iter().find(|c| c.name == name)
  }

  pub fn json_hint(&self, column: &str) -> Option<&JsonHint> {
    self.json_hints.as_ref()?.get(column)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
  pub name:        String,
  /// Declared type, empty when the column was declared without one.
  #[serde(rename = "type")]
  pub decl_type:   String,
  pub notnull:     bool,
  /// Default value expression exactly as declared.
  pub default:     Option<String>,
  /// `0` when not part of the primary key, otherwise the 1-based position.
  pub pk_position: i64,
  pub doc:         Option<String>,
}

impl ColumnDescriptor {
  /// Whether the declared type has text affinity or no declared type at
  /// all, i.e. whether the column may hold embedded JSON.
  pub fn is_textual(&self) -> bool {
    let ty = self.decl_type.to_ascii_uppercase();
    ty.trim().is_empty()
      || ty.contains("TEXT")
      || ty.contains("CHAR")
      || ty.contains("CLOB")
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
  pub id:        i64,
  pub seq:       i64,
  pub table:     String,
  pub from:      String,
  /// `None` when the reference targets the parent's primary key implicitly.
  pub to:        Option<String>,
  pub on_update: String,
  pub on_delete: String,
  #[serde(rename = "match")]
  pub match_:    String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
  pub name:    String,
  pub unique:  bool,
  pub columns: Vec<String>,
}

/// Summary of embedded JSON found in a text column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonHint {
  pub detected:        bool,
  /// Top-level object key to its dominant value kind.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub top_level_keys:  Option<BTreeMap<String, ValueKind>>,
  /// Value-kind histogram of array elements.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub list_item_kinds: Option<BTreeMap<ValueKind, usize>>,
}
