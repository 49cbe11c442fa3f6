use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use chrono::NaiveDate;
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossword_engine::Engine;
use crossword_engine::source::{self, DatedDirectory, PuzzleSource};
use log::{LevelFilter, error, info};
use simplelog::{ConfigBuilder, WriteLogger};

use crate::app::App;
use crate::config::{SourceConfig, UiConfig, load_config};

mod app;
mod config;
mod ui;

/// Solve crosswords in the terminal.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
  /// A puzzle file to play, either `.puz` or JSON. Without one, today's puzzle is
  /// picked from the puzzle directory.
  path: Option<PathBuf>,

  /// Topic of the daily puzzle
  #[arg(short, long)]
  topic: Option<String>,

  /// Play the daily puzzle for this date (YYYY-MM-DD) instead of today's
  #[arg(short, long)]
  date: Option<NaiveDate>,

  /// Directory of daily puzzles
  #[arg(long)]
  dir: Option<PathBuf>,

  /// Log level for the log file (error, warn, info, debug, trace)
  #[arg(long)]
  log_level: Option<LevelFilter>,

  /// Config file to use instead of ~/.crosstui/config.toml
  #[arg(short, long)]
  config: Option<PathBuf>,
}

fn main() -> io::Result<()> {
  let args = Args::parse();

  let config = load_config(args.config.as_deref()).unwrap_or_else(|e| {
    eprintln!("{e}");
    process::exit(1);
  });
  init_logging(&config.ui, args.log_level);

  let source = puzzle_source(&args, &config.source);
  let mut engine = Engine::new(config.engine);
  if let Err(e) = engine.load_from(source.as_ref()) {
    error!("failed to load puzzle: {e}");
    eprintln!("Failed to load puzzle: {e}");
    process::exit(2);
  }
  let app = App::new(engine, config.ui.message_duration());

  let terminal = ratatui::init();
  let result = with_mouse_capture(&mut io::stdout(), || app.run(terminal));
  ratatui::restore();
  result
}

/// Runs `f` with mouse reporting turned on, and turns it off again however `f`
/// ends. The first error wins.
fn with_mouse_capture<W: Write>(
  out: &mut W,
  f: impl FnOnce() -> io::Result<()>,
) -> io::Result<()> {
  crossterm::execute!(out, EnableMouseCapture)?;
  let result = f();
  let disabled = crossterm::execute!(out, DisableMouseCapture);
  result.and(disabled)
}

/// Logs go to a file, since the terminal belongs to the UI.
fn init_logging(ui: &UiConfig, level: Option<LevelFilter>) {
  let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
  let level = level.unwrap_or_else(|| ui.log_level());

  if let Some(log_file) = open_log_file(&ui.log_file()) {
    let _ = WriteLogger::init(level, log_config, log_file);
  }
}

/// Creates the log file, or says on stderr why there will be no log. This runs
/// before the terminal is taken over, so the message stays visible.
fn open_log_file(path: &Path) -> Option<File> {
  match File::create(path) {
    Ok(file) => Some(file),
    Err(e) => {
      eprintln!("Logging disabled: can't create {}: {e}", path.display());
      None
    }
  }
}

fn puzzle_source(args: &Args, config: &SourceConfig) -> Box<dyn PuzzleSource> {
  if let Some(path) = &args.path {
    info!("playing {}", path.display());
    return source::from_path(path);
  }

  let dir = args.dir.clone().unwrap_or_else(|| config.puzzle_dir());
  let topic = args.topic.as_deref().unwrap_or(config.topic());
  let daily = match args.date {
    Some(date) => DatedDirectory::new(dir, topic, date),
    None => DatedDirectory::today(dir, topic),
  };
  info!("playing the {} puzzle for {}", daily.topic(), daily.date());
  Box::new(daily)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_daily_puzzle_flags() {
    let args = Args::parse_from([
      "crosstui",
      "--topic",
      "science",
      "--date",
      "2024-03-09",
      "--log-level",
      "debug",
    ]);
    assert_eq!(args.path, None);
    assert_eq!(args.topic.as_deref(), Some("science"));
    assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 3, 9));
    assert_eq!(args.log_level, Some(LevelFilter::Debug));
  }

  #[test]
  fn mouse_capture_is_released_when_the_app_fails() {
    let mut out = Vec::new();
    let result = with_mouse_capture(&mut out, || Err(io::Error::other("draw failed")));

    assert_eq!(result.unwrap_err().to_string(), "draw failed");
    let written = String::from_utf8_lossy(&out);
    assert!(written.contains("?1000h"));
    assert!(written.contains("?1000l"));
  }

  #[test]
  fn missing_log_directory_means_no_log_file() {
    let path = std::env::temp_dir()
      .join("crosstui-no-such-dir")
      .join("nested")
      .join("crosstui.log");
    assert!(open_log_file(&path).is_none());
  }

  #[test]
  fn parses_a_puzzle_path() {
    let args = Args::parse_from(["crosstui", "puzzles/monday.puz"]);
    assert_eq!(args.path, Some(PathBuf::from("puzzles/monday.puz")));
  }
}
