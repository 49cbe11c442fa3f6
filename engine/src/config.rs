use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_DOUBLE_CLICK_WINDOW_MS: u64 = 300;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Tunable behavior of an [Engine](crate::Engine).
///
/// Deserializes from a sparse table: any missing field takes its default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
  /// Two selections of the same square closer together than this count as a
  /// double click, which toggles the direction.
  pub double_click_window_ms: u64,
  /// When a keystroke delivers more than one character, keep the last one
  /// (typing over a filled square replaces it). When false, keep the first.
  pub overwrite_on_type: bool,
  /// Move to the next square of the selected word after a letter is entered.
  pub auto_advance: bool,
  /// How often the timer display is refreshed while the puzzle is being solved.
  pub tick_interval_ms: u64,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      double_click_window_ms: DEFAULT_DOUBLE_CLICK_WINDOW_MS,
      overwrite_on_type: true,
      auto_advance: true,
      tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
    }
  }
}

impl EngineConfig {
  pub fn double_click_window(&self) -> Duration {
    Duration::from_millis(self.double_click_window_ms)
  }

  pub fn tick_interval(&self) -> Duration {
    // A zero interval would make the tick fire on every poll.
    Duration::from_millis(self.tick_interval_ms.max(1))
  }

  /// Reduces raw keyboard input to the single character that goes in a square.
  /// Returns `None` for input with no characters.
  pub fn pick_char(&self, input: &str) -> Option<char> {
    let c = if self.overwrite_on_type {
      input.chars().last()
    } else {
      input.chars().next()
    }?;
    Some(crate::document::normalize(c))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sparse_config_takes_defaults() {
    let config: EngineConfig = serde_json::from_str(r#"{ "auto_advance": false }"#).unwrap();
    assert!(!config.auto_advance);
    assert_eq!(config.double_click_window(), Duration::from_millis(300));
    assert_eq!(config.tick_interval(), Duration::from_secs(1));
  }

  #[test]
  fn pick_char_overwrites_by_default() {
    let config = EngineConfig::default();
    assert_eq!(config.pick_char("ab"), Some('B'));
    assert_eq!(config.pick_char("q"), Some('Q'));
    assert_eq!(config.pick_char(""), None);

    let keep_first = EngineConfig {
      overwrite_on_type: false,
      ..EngineConfig::default()
    };
    assert_eq!(keep_first.pick_char("ab"), Some('A'));
  }
}
