//! `sluice`: load schemaless JSON into SQLite and describe the result.
//!
//! # Usage
//!
//! ```text
//! sluice load   --db data.db --table queuedata --records queuedata.json --docs annotated.json
//! sluice schema --db data.db --json-out schema.json
//! sluice prompt --db data.db --table 'queue*' --columns queuedata=record_id,tags --counts
//! sluice query  --db data.db --sql 'SELECT * FROM queuedata' --limit 5 --pretty
//! sluice docs   --db data.db --table queuedata
//! ```

mod commands;
mod settings;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(author, version, about = "Load schemaless JSON into SQLite and describe the schema")]
struct Cli {
  /// Path to a TOML settings file (db_path, sample_limit, include_counts).
  #[arg(short, long, value_name = "FILE", default_value = "sluice.toml")]
  config: PathBuf,

  /// SQLite database file; overrides `db_path` from settings.
  #[arg(long, global = true, env = "SLUICE_DB")]
  db: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Infer a schema from a records document and upsert it into a table.
  Load(LoadArgs),
  /// Introspect the database and print or save the full schema.
  Schema(SchemaArgs),
  /// Print a compact schema restricted to selected tables and columns.
  Prompt(PromptArgs),
  /// Run one SQL statement and print rows as JSON.
  Query(QueryArgs),
  /// Print the documented columns of a table.
  Docs(DocsArgs),
}

#[derive(Args, Debug)]
pub struct LoadArgs {
  /// Target table name.
  #[arg(long)]
  pub table:   String,
  /// JSON document of the form `{ "<id>": { "<column>": value, ... }, ... }`.
  #[arg(long, value_name = "FILE")]
  pub records: PathBuf,
  /// JSON document of the form `{ "<column>": "description", ... }`; skipped
  /// when the file does not exist.
  #[arg(long, value_name = "FILE")]
  pub docs:    Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SchemaArgs {
  /// Write the schema as JSON to this file.
  #[arg(long, value_name = "FILE")]
  pub json_out:     Option<PathBuf>,
  /// Write the text rendering to this file instead of stdout.
  #[arg(long, value_name = "FILE")]
  pub txt_out:      Option<PathBuf>,
  /// Values sampled per text column for JSON detection.
  #[arg(long)]
  pub sample_limit: Option<usize>,
  /// Skip per-table row counts.
  #[arg(long)]
  pub no_counts:    bool,
}

#[derive(Args, Debug)]
pub struct PromptArgs {
  /// Table name or glob pattern; repeatable. Defaults to every table.
  #[arg(long = "table", value_name = "PATTERN")]
  pub tables:        Vec<String>,
  /// Column allow-list as `TABLE=COL,COL`; repeatable.
  #[arg(long = "columns", value_name = "TABLE=COLS")]
  pub columns:       Vec<String>,
  /// Omit embedded-JSON hints.
  #[arg(long)]
  pub no_json_hints: bool,
  /// Show row counts in table headers.
  #[arg(long)]
  pub counts:        bool,
  /// Values sampled per text column for JSON detection.
  #[arg(long)]
  pub sample_limit:  Option<usize>,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
  /// SQL statement to run.
  #[arg(long)]
  pub sql:       String,
  /// Only parse JSON in these columns; repeatable. Defaults to auto-detect.
  #[arg(long = "json-col", value_name = "COLUMN")]
  pub json_cols: Vec<String>,
  /// Append `LIMIT n` when the statement has no limit of its own.
  #[arg(long)]
  pub limit:     Option<u64>,
  /// Pretty-print the JSON output.
  #[arg(long)]
  pub pretty:    bool,
}

#[derive(Args, Debug)]
pub struct DocsArgs {
  #[arg(long)]
  pub table: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<()> {
  // Logs go to stderr; stdout carries schema text and JSON.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  let db = cli
    .db
    .or_else(|| settings.db_path.clone())
    .context("no database given; pass --db or set db_path")?;

  match cli.command {
    Command::Load(args) => commands::load(&db, &args),
    Command::Schema(args) => commands::schema(&db, &settings, &args),
    Command::Prompt(args) => commands::prompt(&db, &settings, &args),
    Command::Query(args) => commands::query(&db, &args),
    Command::Docs(args) => commands::docs(&db, &args),
  }
}
