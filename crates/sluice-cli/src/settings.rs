//! Layered settings: an optional TOML file overridden by `SLUICE_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub db_path:        Option<PathBuf>,
  pub sample_limit:   usize,
  pub include_counts: bool,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      db_path:        None,
      sample_limit:   50,
      include_counts: true,
    }
  }
}

impl Settings {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let raw = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("SLUICE"))
      .build()
      .with_context(|| format!("failed to read settings from {}", path.display()))?;

    raw
      .try_deserialize()
      .context("failed to deserialise settings")
  }
}
