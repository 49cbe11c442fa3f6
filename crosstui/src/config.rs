//! Settings, resolved as defaults → `~/.crosstui/config.toml` → CLI flags.
//!
//! Every field in the file is optional. A missing file means all defaults; a
//! file that exists but doesn't parse is an error.

use crossword_engine::EngineConfig;
use log::LevelFilter;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_MESSAGE_DURATION_MS: u64 = 3000;
pub const DEFAULT_LOG_FILE: &str = "crosstui.log";
pub const DEFAULT_TOPIC: &str = "shopping";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub engine: EngineConfig,
  #[serde(default)]
  pub ui: UiConfig,
  #[serde(default)]
  pub source: SourceConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct UiConfig {
  pub message_duration_ms: Option<u64>,
  pub log_file: Option<PathBuf>,
  pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SourceConfig {
  /// Directory of daily puzzles, laid out as `<dir>/<topic>/<YYYY-MM-DD>.json`.
  pub puzzle_dir: Option<PathBuf>,
  pub topic: Option<String>,
}

impl UiConfig {
  pub fn message_duration(&self) -> Duration {
    Duration::from_millis(
      self
        .message_duration_ms
        .unwrap_or(DEFAULT_MESSAGE_DURATION_MS),
    )
  }

  pub fn log_file(&self) -> PathBuf {
    self
      .log_file
      .clone()
      .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
  }

  /// The configured level, or `Info` if it is missing or not a level name.
  pub fn log_level(&self) -> LevelFilter {
    self
      .log_level
      .as_deref()
      .and_then(|level| level.parse().ok())
      .unwrap_or(LevelFilter::Info)
  }
}

impl SourceConfig {
  pub fn puzzle_dir(&self) -> PathBuf {
    self
      .puzzle_dir
      .clone()
      .or_else(|| dirs::data_dir().map(|d| d.join("crosstui").join("puzzles")))
      .unwrap_or_else(|| PathBuf::from("puzzles"))
  }

  pub fn topic(&self) -> &str {
    self.topic.as_deref().unwrap_or(DEFAULT_TOPIC)
  }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("config I/O error: {0}")]
  Io(#[from] std::io::Error),
  #[error("config parse error: {0}")]
  Parse(#[from] toml::de::Error),
}

/// Returns the path to `~/.crosstui/config.toml`.
pub fn config_path() -> Option<PathBuf> {
  dirs::home_dir().map(|h| h.join(".crosstui").join("config.toml"))
}

/// Loads the config from `path`, or from the default location if `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
  let path = match path.map(Path::to_path_buf).or_else(config_path) {
    Some(p) => p,
    None => return Ok(Config::default()),
  };

  if !path.exists() {
    return Ok(Config::default());
  }

  let contents = fs::read_to_string(&path)?;
  parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<Config, ConfigError> {
  Ok(toml::from_str(contents)?)
}
