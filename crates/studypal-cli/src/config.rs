//! CLI configuration, loaded from an optional TOML file and `STUDYPAL_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use studypal_core::config::EngineConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
  /// SQLite file holding all StudyPal data. A leading `~` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// Email to sign in with when `--email` is not given.
  #[serde(default)]
  pub email:      Option<String>,
  #[serde(default)]
  pub engine:     EngineConfig,
}

fn default_store_path() -> PathBuf { PathBuf::from("~/.studypal/studypal.db") }

impl CliConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> { Self::load_with(path, environment()) }

  fn load_with(path: &Path, env: config::Environment) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(env)
      .build()
      .context("failed to read config file")?;

    let mut cfg: CliConfig = settings
      .try_deserialize()
      .context("failed to deserialise CliConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }
}

/// `STUDYPAL_STORE_PATH` sets `store_path`; `__` descends into tables, as in
/// `STUDYPAL_ENGINE__SEED_SAMPLE_DATA`.
fn environment() -> config::Environment {
  config::Environment::with_prefix("STUDYPAL")
    .prefix_separator("_")
    .separator("__")
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
