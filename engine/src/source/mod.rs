//! Loaders that turn files into [PuzzleDocument]s.
//!
//! The engine itself never reads files. Anything implementing [PuzzleSource] can
//! supply its puzzle, and a failed load leaves the engine as it was.

use crate::{PuzzleDocument, SourceError};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

mod checksum;
mod dated;
mod puz;

pub use dated::DatedDirectory;
pub use puz::{ChecksumKind, ChecksumMismatch, PuzFile};

/// Somewhere a puzzle can be loaded from.
pub trait PuzzleSource {
  /// Produces a complete, valid document, or an error; never a partial document.
  fn load(&self) -> Result<PuzzleDocument, SourceError>;
}

/// A JSON document on disk, in the shape [PuzzleDocument::from_json] accepts.
#[derive(Debug, Clone)]
pub struct JsonFile {
  path: PathBuf,
}

impl JsonFile {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl PuzzleSource for JsonFile {
  fn load(&self) -> Result<PuzzleDocument, SourceError> {
    let json = fs::read_to_string(&self.path)?;
    let doc = PuzzleDocument::from_json(&json)?;
    info!("loaded JSON puzzle from {}", self.path.display());
    Ok(doc)
  }
}

/// Picks a loader from the file extension: `.puz` files are parsed as such,
/// anything else is read as JSON.
pub fn from_path(path: impl Into<PathBuf>) -> Box<dyn PuzzleSource> {
  let path = path.into();
  let is_puz = path
    .extension()
    .is_some_and(|ext| ext.eq_ignore_ascii_case("puz"));
  if is_puz {
    Box::new(PuzFile::new(path))
  } else {
    Box::new(JsonFile::new(path))
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};

  /// A fresh scratch directory under the system temp dir.
  pub(crate) fn scratch_dir(name: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!(
      "crossword-engine-{}-{}-{}",
      name,
      std::process::id(),
      n
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
  }

  pub(crate) const SMALL_JSON: &str = r#"{
    "title": "Small",
    "acrossClues": { "1": "Opening pair" },
    "downClues": { "2": "Column" },
    "answers": [["A", "B", null], [null, "C", null], [null, "D", null]]
  }"#;

  #[test]
  fn json_file_loads() {
    let dir = scratch_dir("json");
    let path = dir.join("small.json");
    fs::write(&path, SMALL_JSON).unwrap();

    let doc = from_path(&path).load().unwrap();
    assert_eq!(doc.title(), Some("Small"));
    assert_eq!(doc.clue_position(2), Some((0, 1)));
  }

  #[test]
  fn missing_file_is_an_io_error() {
    let dir = scratch_dir("missing");
    let result = JsonFile::new(dir.join("nope.json")).load();
    assert!(matches!(result, Err(SourceError::Io(_))));
  }

  #[test]
  fn malformed_json_is_a_document_error() {
    let dir = scratch_dir("malformed");
    let path = dir.join("bad.json");
    fs::write(&path, r#"{ "answers": [["A"], ["B"]] }"#).unwrap();

    let result = JsonFile::new(&path).load();
    assert!(matches!(result, Err(SourceError::Document(_))));
  }
}
