//! Terse text rendering of an introspected schema.
//!
//! The output is meant to be pasted into a language-model prompt: one block
//! per table, one line per column, blank lines between tables. Hint keys
//! and list item kinds are listed by name.

use std::collections::HashMap;

use glob::Pattern;

use crate::{
  Error, Result,
  schema::{ColumnDescriptor, DatabaseSchema, JsonHint, TableDescriptor},
};

pub const JSON_NOTE: &str = "Note: JSON columns can be queried via SQLite JSON1 \
                             (e.g., json_extract(col, '$.path')).";

// ─── Options ──────────────────────────────────────────────────────────────────

/// Selection and detail switches for [`format_schema`].
#[derive(Debug, Clone)]
pub struct FormatOptions {
  /// Exact table names or glob patterns; `None` (or empty) keeps every
  /// table.
  pub tables:             Option<Vec<String>>,
  /// Per-table column allow-lists. Tables without an entry keep all their
  /// columns.
  pub columns:            Option<HashMap<String, Vec<String>>>,
  pub include_json_hints: bool,
  pub include_counts:     bool,
}

impl Default for FormatOptions {
  fn default() -> Self {
    Self {
      tables:             None,
      columns:            None,
      include_json_hints: true,
      include_counts:     false,
    }
  }
}

// ─── Rendering ────────────────────────────────────────────────────────────────

/// Render `schema` as text, restricted by `opts`.
///
/// Fails only when a table pattern is not a valid glob.
pub fn format_schema(
  schema: &DatabaseSchema,
  opts: &FormatOptions,
) -> Result<String> {
  let patterns = compile_patterns(opts.tables.as_deref().unwrap_or_default())?;

  let mut lines: Vec<String> = Vec::new();
  let mut any_hint = false;

  for table in &schema.tables {
    if !patterns.is_empty() && !patterns.iter().any(|p| p.matches(&table.name))
    {
      continue;
    }
    let allowed = opts.columns.as_ref().and_then(|c| c.get(&table.name));
    any_hint |= render_table(table, allowed, opts, &mut lines);
  }

  if any_hint {
    lines.push(JSON_NOTE.to_owned());
  }

  Ok(lines.join("\n").trim_end().to_owned())
}

fn compile_patterns(raw: &[String]) -> Result<Vec<Pattern>> {
  raw
    .iter()
    .map(|p| {
      Pattern::new(p).map_err(|e| Error::InvalidPattern {
        pattern: p.clone(),
        reason:  e.to_string(),
      })
    })
    .collect()
}

/// Append one table block; returns whether any emitted column showed a
/// JSON hint.
fn render_table(
  table: &TableDescriptor,
  allowed: Option<&Vec<String>>,
  opts: &FormatOptions,
  lines: &mut Vec<String>,
) -> bool {
  let mut header = format!("Table {}", table.name);
  if opts.include_counts
    && let Some(n) = table.row_count
  {
    header.push_str(&format!(" (rows: {n})"));
  }
  header.push(':');
  lines.push(header);

  let mut any_hint = false;
  for col in &table.columns {
    if allowed.is_some_and(|a| !a.iter().any(|c| c == &col.name)) {
      continue;
    }
    let hint = table
      .json_hint(&col.name)
      .filter(|h| opts.include_json_hints && h.detected);
    any_hint |= hint.is_some();
    lines.push(column_line(col, hint));
  }

  if !table.foreign_keys.is_empty() {
    lines.push("  Foreign keys:".to_owned());
    for fk in &table.foreign_keys {
      let target = match &fk.to {
        Some(to) => format!("{}.{to}", fk.table),
        None => fk.table.clone(),
      };
      lines.push(format!(
        "    - {} -> {target} (on_update={}, on_delete={})",
        fk.from, fk.on_update, fk.on_delete
      ));
    }
  }

  if !table.indexes.is_empty() {
    lines.push("  Indexes:".to_owned());
    for idx in &table.indexes {
      let unique = if idx.unique { " UNIQUE" } else { "" };
      lines.push(format!(
        "    -{unique} {} ({})",
        idx.name,
        idx.columns.join(", ")
      ));
    }
  }

  lines.push(String::new());
  any_hint
}

fn column_line(col: &ColumnDescriptor, hint: Option<&JsonHint>) -> String {
  let mut line = format!("  - {}", col.name);
  let ty = col.decl_type.trim();
  if !ty.is_empty() {
    line.push(' ');
    line.push_str(ty);
  }
  if col.pk_position > 0 {
    line.push_str(" PRIMARY KEY");
    if col.pk_position > 1 {
      line.push_str(&format!(" (pos {})", col.pk_position));
    }
  }
  if col.notnull {
    line.push_str(" NOT NULL");
  }
  if let Some(default) = &col.default {
    line.push_str(&format!(" DEFAULT {default}"));
  }
  if let Some(doc) = col.doc.as_deref().filter(|d| !d.is_empty()) {
    line.push_str(&format!("  // {doc}"));
  }
  if let Some(summary) = hint.and_then(hint_summary) {
    line.push_str(&format!("  (JSON: {summary})"));
  }
  line
}

fn hint_summary(hint: &JsonHint) -> Option<String> {
  let mut extras = Vec::new();
  if let Some(keys) = hint.top_level_keys.as_ref().filter(|k| !k.is_empty()) {
    let body: Vec<_> = keys.iter().map(|(k, v)| format!("{k}:{v}")).collect();
    extras.push(format!("keys[{}]", body.join(", ")));
  }
  if let Some(kinds) = hint.list_item_kinds.as_ref().filter(|k| !k.is_empty())
  {
    let mut named: Vec<_> =
      kinds.iter().map(|(k, n)| (k.to_string(), n)).collect();
    named.sort();
    let body: Vec<_> =
      named.iter().map(|(k, n)| format!("{k}:{n}")).collect();
    extras.push(format!("list[{}]", body.join(", ")));
  }
  (!extras.is_empty()).then(|| extras.join(", "))
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use super::*;
  use crate::{
    kind::ValueKind,
    schema::{ForeignKey, IndexDescriptor},
  };

  fn col(name: &str, ty: &str) -> ColumnDescriptor {
    ColumnDescriptor {
      name: name.into(),
      decl_type: ty.into(),
      ..Default::default()
    }
  }

  fn table(name: &str, columns: Vec<ColumnDescriptor>) -> TableDescriptor {
    TableDescriptor {
      name: name.into(),
      columns,
      ..Default::default()
    }
  }

  fn keys_hint(key: &str, kind: ValueKind) -> JsonHint {
    JsonHint {
      detected:        true,
      top_level_keys:  Some(BTreeMap::from([(key.to_string(), kind)])),
      list_item_kinds: None,
    }
  }

  fn two_tables() -> DatabaseSchema {
    DatabaseSchema {
      tables: vec![
        table("t1", vec![col("a", "INTEGER"), col("b", "TEXT")]),
        table("t2", vec![col("c", "REAL")]),
      ],
    }
  }

  #[test]
  fn renders_every_table_by_default() {
    let text = format_schema(&two_tables(), &FormatOptions::default()).unwrap();
    assert_eq!(
      text,
      "Table t1:\n  - a INTEGER\n  - b TEXT\n\nTable t2:\n  - c REAL"
    );
  }

  #[test]
  fn table_and_column_filters_restrict_output() {
    let opts = FormatOptions {
      tables: Some(vec!["t1".into()]),
      columns: Some(HashMap::from([("t1".to_string(), vec!["a".to_string()])])),
      ..Default::default()
    };
    let text = format_schema(&two_tables(), &opts).unwrap();
    assert_eq!(text, "Table t1:\n  - a INTEGER");
    assert_eq!(text.matches("Table ").count(), 1);
  }

  #[test]
  fn column_filter_keeps_descriptor_order() {
    let opts = FormatOptions {
      columns: Some(HashMap::from([(
        "t1".to_string(),
        vec!["b".to_string(), "a".to_string()],
      )])),
      tables: Some(vec!["t1".into()]),
      ..Default::default()
    };
    let text = format_schema(&two_tables(), &opts).unwrap();
    assert_eq!(text, "Table t1:\n  - a INTEGER\n  - b TEXT");
  }

  #[test]
  fn glob_patterns_select_tables() {
    let schema = DatabaseSchema {
      tables: vec![
        table("jobs", vec![]),
        table("jobs_archive", vec![]),
        table("queue", vec![]),
      ],
    };
    let opts = FormatOptions {
      tables: Some(vec!["jobs*".into()]),
      ..Default::default()
    };
    let text = format_schema(&schema, &opts).unwrap();
    assert!(text.contains("Table jobs:"));
    assert!(text.contains("Table jobs_archive:"));
    assert!(!text.contains("queue"));
  }

  #[test]
  fn invalid_pattern_is_reported() {
    let opts = FormatOptions {
      tables: Some(vec!["[".into()]),
      ..Default::default()
    };
    let err = format_schema(&two_tables(), &opts).unwrap_err();
    assert!(matches!(err, Error::InvalidPattern { .. }));
  }

  #[test]
  fn column_attributes_are_rendered() {
    let mut id = col("id", "INTEGER");
    id.pk_position = 1;
    id.notnull = true;
    let mut other = col("k2", "TEXT");
    other.pk_position = 2;
    let mut status = col("status", "TEXT");
    status.default = Some("'new'".into());
    status.doc = Some("lifecycle state".into());
    let mut empty_doc = col("note", "");
    empty_doc.doc = Some(String::new());

    let schema = DatabaseSchema {
      tables: vec![table("t", vec![id, other, status, empty_doc])],
    };
    let text = format_schema(&schema, &FormatOptions::default()).unwrap();
    assert_eq!(
      text,
      "Table t:\n\
       \x20 - id INTEGER PRIMARY KEY NOT NULL\n\
       \x20 - k2 TEXT PRIMARY KEY (pos 2)\n\
       \x20 - status TEXT DEFAULT 'new'  // lifecycle state\n\
       \x20 - note"
    );
  }

  #[test]
  fn row_counts_only_when_requested() {
    let mut schema = two_tables();
    schema.tables[0].row_count = Some(12);

    let plain = format_schema(&schema, &FormatOptions::default()).unwrap();
    assert!(plain.starts_with("Table t1:\n"));

    let opts = FormatOptions { include_counts: true, ..Default::default() };
    let counted = format_schema(&schema, &opts).unwrap();
    assert!(counted.starts_with("Table t1 (rows: 12):\n"));
    assert!(counted.contains("Table t2:\n"));
  }

  #[test]
  fn foreign_keys_and_indexes() {
    let mut t = table("child", vec![col("parent_id", "INTEGER")]);
    t.foreign_keys.push(ForeignKey {
      table: "parent".into(),
      from: "parent_id".into(),
      to: Some("id".into()),
      on_update: "NO ACTION".into(),
      on_delete: "CASCADE".into(),
      match_: "NONE".into(),
      ..Default::default()
    });
    t.indexes.push(IndexDescriptor {
      name:    "child_parent_idx".into(),
      unique:  false,
      columns: vec!["parent_id".into()],
    });
    t.indexes.push(IndexDescriptor {
      name:    "child_uq".into(),
      unique:  true,
      columns: vec!["parent_id".into(), "rowid".into()],
    });

    let text = format_schema(
      &DatabaseSchema { tables: vec![t] },
      &FormatOptions::default(),
    )
    .unwrap();
    assert!(text.contains(
      "  Foreign keys:\n    - parent_id -> parent.id (on_update=NO ACTION, \
       on_delete=CASCADE)"
    ));
    assert!(text.contains(
      "  Indexes:\n    - child_parent_idx (parent_id)\n    - UNIQUE child_uq \
       (parent_id, rowid)"
    ));
  }

  #[test]
  fn json_hints_and_trailing_note() {
    let mut t = table("t", vec![col("payload", "TEXT"), col("tags", "TEXT")]);
    t.json_hints = Some(BTreeMap::from([
      ("payload".to_string(), keys_hint("k", ValueKind::Integer)),
      (
        "tags".to_string(),
        JsonHint {
          detected:        true,
          top_level_keys:  None,
          list_item_kinds: Some(BTreeMap::from([
            (ValueKind::String, 4),
            (ValueKind::Null, 1),
          ])),
        },
      ),
    ]));
    let schema = DatabaseSchema { tables: vec![t] };

    let text = format_schema(&schema, &FormatOptions::default()).unwrap();
    assert!(text.contains("  - payload TEXT  (JSON: keys[k:integer])"));
    assert!(text.contains("  - tags TEXT  (JSON: list[null:1, string:4])"));
    assert!(text.ends_with(&format!("\n\n{JSON_NOTE}")));

    let opts = FormatOptions {
      include_json_hints: false,
      ..Default::default()
    };
    let bare = format_schema(&schema, &opts).unwrap();
    assert!(!bare.contains("JSON"));
  }

  #[test]
  fn list_kinds_are_listed_by_name() {
    let mut t = table("t", vec![col("items", "TEXT")]);
    t.json_hints = Some(BTreeMap::from([(
      "items".to_string(),
      JsonHint {
        detected:        true,
        top_level_keys:  None,
        list_item_kinds: Some(BTreeMap::from([
          (ValueKind::Boolean, 2),
          (ValueKind::Integer, 5),
          (ValueKind::Array, 1),
        ])),
      },
    )]));
    let schema = DatabaseSchema { tables: vec![t] };

    let text = format_schema(&schema, &FormatOptions::default()).unwrap();
    assert!(text.contains("(JSON: list[array:1, boolean:2, integer:5])"));
  }

  #[test]
  fn note_requires_a_rendered_hinted_column() {
    let mut t = table("t", vec![col("a", "TEXT"), col("payload", "TEXT")]);
    t.json_hints = Some(BTreeMap::from([(
      "payload".to_string(),
      keys_hint("k", ValueKind::String),
    )]));
    let schema = DatabaseSchema { tables: vec![t] };

    let opts = FormatOptions {
      columns: Some(HashMap::from([("t".to_string(), vec!["a".to_string()])])),
      ..Default::default()
    };
    let text = format_schema(&schema, &opts).unwrap();
    assert_eq!(text, "Table t:\n  - a TEXT");
  }
}
