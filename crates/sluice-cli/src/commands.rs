//! Subcommand implementations.

use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context as _, Result, bail};
use sluice_core::{
  format::{FormatOptions, format_schema},
  record::{ColumnDocs, Records},
  store::{IntrospectOptions, RecordStore},
};
use sluice_store_sqlite::SqliteStore;

use crate::{DocsArgs, LoadArgs, PromptArgs, QueryArgs, SchemaArgs, settings::Settings};

fn open(db: &Path) -> Result<SqliteStore> {
  SqliteStore::open(db).with_context(|| format!("failed to open database {}", db.display()))
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
  let raw = fs::read_to_string(path)
    .with_context(|| format!("reading {}", path.display()))?;
  serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

// ─── load ─────────────────────────────────────────────────────────────────────

pub fn load(db: &Path, args: &LoadArgs) -> Result<()> {
  let records = Records::from_json(read_json(&args.records)?)
    .with_context(|| format!("loading records from {}", args.records.display()))?;

  let docs = match &args.docs {
    Some(path) if path.exists() => Some(
      ColumnDocs::from_json(read_json(path)?)
        .with_context(|| format!("loading docs from {}", path.display()))?,
    ),
    Some(path) => {
      tracing::info!(path = %path.display(), "docs file not found; skipping");
      None
    }
    None => None,
  };

  let mut store = open(db)?;
  let summary = store
    .write(&args.table, &records, docs.as_ref())
    .with_context(|| format!("writing table {}", args.table))?;

  if let Some(docs) = &docs {
    let undocumented: Vec<_> = records
      .rows()
      .flat_map(|row| row.keys())
      .filter(|col| docs.get(col).is_none())
      .collect::<std::collections::BTreeSet<_>>()
      .into_iter()
      .collect();
    if !undocumented.is_empty() {
      tracing::info!(count = undocumented.len(), columns = ?undocumented, "columns without docs");
    }
  }

  println!(
    "Loaded {} records ({} columns) into {}:{}",
    summary.rows,
    summary.columns,
    db.display(),
    summary.table
  );
  Ok(())
}

// ─── schema ───────────────────────────────────────────────────────────────────

pub fn schema(db: &Path, settings: &Settings, args: &SchemaArgs) -> Result<()> {
  let store = open(db)?;
  let opts = IntrospectOptions {
    sample_limit:       args.sample_limit.unwrap_or(settings.sample_limit),
    include_row_counts: settings.include_counts && !args.no_counts,
  };
  let schema = store.introspect(&opts).context("introspecting database")?;

  if let Some(path) = &args.json_out {
    let json = serde_json::to_string_pretty(&schema)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    eprintln!("Wrote {}", path.display());
  }

  let text = format_schema(
    &schema,
    &FormatOptions {
      include_counts: opts.include_row_counts,
      ..Default::default()
    },
  )?;
  match &args.txt_out {
    Some(path) => {
      fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
      eprintln!("Wrote {}", path.display());
    }
    None => println!("{text}"),
  }
  Ok(())
}

// ─── prompt ───────────────────────────────────────────────────────────────────

pub fn prompt(db: &Path, settings: &Settings, args: &PromptArgs) -> Result<()> {
  let store = open(db)?;
  let schema = store
    .introspect(&IntrospectOptions {
      sample_limit:       args.sample_limit.unwrap_or(settings.sample_limit),
      include_row_counts: args.counts,
    })
    .context("introspecting database")?;

  let opts = FormatOptions {
    tables:             (!args.tables.is_empty()).then(|| args.tables.clone()),
    columns:            parse_column_filters(&args.columns)?,
    include_json_hints: !args.no_json_hints,
    include_counts:     args.counts,
  };
  println!("{}", format_schema(&schema, &opts)?);
  Ok(())
}

/// Parse repeated `TABLE=COL,COL` arguments; repeats for a table accumulate.
fn parse_column_filters(
  raw: &[String],
) -> Result<Option<HashMap<String, Vec<String>>>> {
  if raw.is_empty() {
    return Ok(None);
  }
  let mut filters: HashMap<String, Vec<String>> = HashMap::new();
  for item in raw {
    let Some((table, cols)) = item.split_once('=') else {
      bail!("invalid column filter {item:?}; expected TABLE=COL,COL");
    };
    filters.entry(table.trim().to_owned()).or_default().extend(
      cols
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_owned),
    );
  }
  Ok(Some(filters))
}

// ─── query ────────────────────────────────────────────────────────────────────

pub fn query(db: &Path, args: &QueryArgs) -> Result<()> {
  let store = open(db)?;
  let sql = with_limit(&args.sql, args.limit);
  let json_cols = (!args.json_cols.is_empty()).then_some(args.json_cols.as_slice());

  let rows = store.query(&sql, &[], json_cols).context("running query")?;
  let out = if args.pretty {
    serde_json::to_string_pretty(&rows)?
  } else {
    serde_json::to_string(&rows)?
  };
  println!("{out}");
  Ok(())
}

fn with_limit(sql: &str, limit: Option<u64>) -> String {
  match limit {
    Some(n) if !sql.to_ascii_lowercase().contains("limit") => {
      format!("{} LIMIT {n};", sql.trim().trim_end_matches(';'))
    }
    _ => sql.to_owned(),
  }
}

// ─── docs ─────────────────────────────────────────────────────────────────────

pub fn docs(db: &Path, args: &DocsArgs) -> Result<()> {
  let store = open(db)?;
  match store.column_docs_bundle(&args.table)? {
    Some(bundle) => println!("{bundle}"),
    None => bail!("table {} has no column documentation", args.table),
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn limit_is_appended_once() {
    assert_eq!(with_limit("SELECT 1;", Some(5)), "SELECT 1 LIMIT 5;");
    assert_eq!(with_limit("select 1 limit 2", Some(5)), "select 1 limit 2");
    assert_eq!(with_limit("SELECT 1", None), "SELECT 1");
  }

  #[test]
  fn column_filters_accumulate_per_table() {
    let filters = parse_column_filters(&[
      "t=a, b".to_string(),
      "t=c".to_string(),
      "u=".to_string(),
    ])
    .unwrap()
    .unwrap();
    assert_eq!(filters["t"], ["a", "b", "c"]);
    assert!(filters["u"].is_empty());
  }

  #[test]
  fn malformed_column_filter_is_an_error() {
    assert!(parse_column_filters(&["nocolumns".to_string()]).is_err());
    assert!(parse_column_filters(&[]).unwrap().is_none());
  }
}
