use super::{JsonFile, PuzzleSource};
use crate::{PuzzleDocument, SourceError};
use chrono::{Local, NaiveDate};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A directory of daily puzzles, laid out as `<dir>/<topic>/<YYYY-MM-DD>.json`.
///
/// Loads the puzzle for `date`, or if there is none, the latest one before it.
#[derive(Debug, Clone)]
pub struct DatedDirectory {
  dir: PathBuf,
  topic: String,
  date: NaiveDate,
}

impl DatedDirectory {
  pub fn new(dir: impl Into<PathBuf>, topic: impl Into<String>, date: NaiveDate) -> Self {
    Self {
      dir: dir.into(),
      topic: topic.into(),
      date,
    }
  }

  /// Today's puzzle, by the local calendar.
  pub fn today(dir: impl Into<PathBuf>, topic: impl Into<String>) -> Self {
    Self::new(dir, topic, Local::now().date_naive())
  }

  pub fn topic(&self) -> &str {
    &self.topic
  }

  pub fn date(&self) -> NaiveDate {
    self.date
  }

  fn topic_dir(&self) -> PathBuf {
    self.dir.join(&self.topic)
  }

  /// The path of the puzzle to load: the requested date if it exists, otherwise
  /// the most recent earlier one.
  fn resolve(&self) -> Result<PathBuf, SourceError> {
    let topic_dir = self.topic_dir();
    let exact = topic_dir.join(format!("{}.json", self.date.format(DATE_FORMAT)));
    if exact.is_file() {
      return Ok(exact);
    }
    debug!("no puzzle at {}, looking for an earlier one", exact.display());

    let not_found = || SourceError::NoPuzzleFound {
      topic: self.topic.clone(),
      date: self.date,
    };
    if !topic_dir.is_dir() {
      return Err(not_found());
    }

    let mut best: Option<(NaiveDate, PathBuf)> = None;
    for entry in fs::read_dir(&topic_dir)? {
      let path = entry?.path();
      let Some(date) = puzzle_date(&path) else {
        continue;
      };
      if date < self.date && best.as_ref().is_none_or(|(d, _)| date > *d) {
        best = Some((date, path));
      }
    }

    best.map(|(_, path)| path).ok_or_else(not_found)
  }
}

/// The date in a file name like `2024-05-01.json`.
fn puzzle_date(path: &Path) -> Option<NaiveDate> {
  if path.extension()? != "json" {
    return None;
  }
  let stem = path.file_stem()?.to_str()?;
  NaiveDate::parse_from_str(stem, DATE_FORMAT).ok()
}

impl PuzzleSource for DatedDirectory {
  fn load(&self) -> Result<PuzzleDocument, SourceError> {
    let path = self.resolve()?;
    info!("{} puzzle for {}: {}", self.topic, self.date, path.display());
    JsonFile::new(path).load()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::source::tests::{SMALL_JSON, scratch_dir};

  fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
  }

  #[test]
  fn prefers_exact_date_then_falls_back() {
    let dir = scratch_dir("dated");
    let topic = dir.join("shopping");
    fs::create_dir_all(&topic).unwrap();
    for day in ["2024-05-01", "2024-05-03", "2024-05-09"] {
      let json = SMALL_JSON.replace("Small", day);
      fs::write(topic.join(format!("{day}.json")), json).unwrap();
    }
    fs::write(topic.join("notes.txt"), "not a puzzle").unwrap();

    let exact = DatedDirectory::new(&dir, "shopping", date("2024-05-03"));
    assert_eq!(exact.load().unwrap().title(), Some("2024-05-03"));

    let fallback = DatedDirectory::new(&dir, "shopping", date("2024-05-08"));
    assert_eq!(fallback.load().unwrap().title(), Some("2024-05-03"));

    let too_early = DatedDirectory::new(&dir, "shopping", date("2024-04-30"));
    assert!(matches!(
      too_early.load(),
      Err(SourceError::NoPuzzleFound { .. })
    ));

    let unknown_topic = DatedDirectory::new(&dir, "history", date("2024-05-03"));
    assert!(matches!(
      unknown_topic.load(),
      Err(SourceError::NoPuzzleFound { .. })
    ));
  }
}
