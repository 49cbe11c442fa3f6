//! The errors that may be produced by functions in this crate.
//!
//! [EngineError] covers caller mistakes (a cell operation on a blocked square,
//! or any operation before a puzzle is loaded). [DocumentError] means a document
//! is not a valid puzzle. [SourceError] covers everything that can go wrong while
//! a loader turns bytes on disk into a document.

use crate::{Direction, Pos};

/// A precondition of an [Engine](crate::Engine) operation was violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
  /// No puzzle has been loaded yet.
  #[error("no puzzle is loaded")]
  NotLoaded,
  /// The position lies outside the grid.
  #[error("position {pos:?} is outside the {size}x{size} grid")]
  OutOfBounds { pos: Pos, size: usize },
  /// The operation needs an open square, but the square at this position is blocked.
  #[error("square {0:?} is blocked")]
  BlockedCell(Pos),
  /// The puzzle has no clue with this number and direction.
  #[error("there is no {number} {direction} clue")]
  UnknownClue { number: u32, direction: Direction },
}

/// A puzzle document does not describe a valid puzzle.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
  /// The document has no rows at all.
  #[error("the answer grid is empty")]
  Empty,
  /// Row `row` has `len` squares but the grid has `size` rows.
  #[error("row {row} has {len} squares, expected {size}")]
  NotSquare { row: usize, len: usize, size: usize },
  /// An answer was not exactly one letter.
  #[error("answer at {pos:?} is {answer:?}, expected a single character")]
  BadAnswer { pos: Pos, answer: String },
  /// A clue anchor points outside the grid.
  #[error("clue {number} is anchored at {pos:?}, outside the grid")]
  AnchorOutOfBounds { number: u32, pos: Pos },
  /// A clue anchor points at a blocked square.
  #[error("clue {number} is anchored at blocked square {pos:?}")]
  AnchorBlocked { number: u32, pos: Pos },
  /// A word starts at `pos` but no clue number is anchored there.
  #[error("the {direction} word starting at {pos:?} has no clue number")]
  UnnumberedWord { pos: Pos, direction: Direction },
  /// The grid has no open squares, so there is nothing to solve.
  #[error("the grid has no open squares")]
  NoOpenSquares,
  #[error("malformed JSON document: {0}")]
  Json(#[from] serde_json::Error),
}

/// A loader could not produce a puzzle document.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
  #[error(transparent)]
  Io(#[from] std::io::Error),
  #[error(transparent)]
  Document(#[from] DocumentError),
  /// Unexpectedly reached the end of a `.puz` file at the given byte index.
  #[error("unexpected end of file at byte {0:#x}")]
  Eof(usize),
  /// Something went wrong while parsing a `.puz` file.
  #[error("parse error: {0}")]
  Parse(String),
  /// A string in a `.puz` file was not valid ISO-8859-1.
  #[error("encoding error: {0}")]
  Encoding(String),
  /// The `.puz` file is marked as scrambled, which this crate doesn't support.
  #[error("scrambled puzzles are not supported")]
  Scrambled,
  /// No dated puzzle exists for the topic on or before the requested date.
  #[error("no puzzle for topic {topic:?} on or before {date}")]
  NoPuzzleFound { topic: String, date: chrono::NaiveDate },
}
