//! This crate is the interaction engine behind a crossword app. It provides no UI
//! itself, but see `crosstui` for an example of how you can drive it from a terminal.
//!
//! The engine consumes an already-parsed [PuzzleDocument] and exposes an [Engine]
//! that understands words as runs of open squares, moves a [Cursor] around the grid,
//! checks the entered letters against the answers, and times the solve.
//!
//! Documents can come from anywhere; the [source] module has loaders for JSON
//! documents and for `.puz` files.

use Direction::{Across, Down};
use std::fmt::Display;
use std::ops::Not;

mod check;
pub mod clock;
mod config;
mod cursor;
mod document;
mod engine;
mod error;
mod grid;
pub mod source;
mod timer;
mod word;

pub use check::{CheckResult, check};
pub use config::EngineConfig;
pub use cursor::{Arrow, Cursor};
pub use document::{Cell, ClueRef, PuzzleDocument};
pub use engine::{Engine, EngineEvent, SquareStyle};
pub use error::{DocumentError, EngineError, SourceError};
pub use grid::{Grid, Square};
pub use timer::{SessionTimer, TimerState, format_clock, format_completion};
pub use word::{Word, locate};

/// A position in a grid: (row, column)
pub type Pos = (usize, usize);

/// The two crossword directions: `Across` and `Down`
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, PartialOrd, Ord)]
pub enum Direction {
  Across,
  Down,
}

impl Not for Direction {
  type Output = Self;
  fn not(self) -> Self {
    match self {
      Across => Down,
      Down => Across,
    }
  }
}

impl Display for Direction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Across => write!(f, "Across"),
      Down => write!(f, "Down"),
    }
  }
}

/// Iterator over all the positions in a square grid, from left to right and top to bottom.
pub(crate) struct GridPosIter {
  pos: Pos,
  size: usize,
}

impl GridPosIter {
  pub(crate) fn new(size: usize) -> Self {
    Self { pos: (0, 0), size }
  }
}

impl Iterator for GridPosIter {
  type Item = Pos;
  fn next(&mut self) -> Option<Self::Item> {
    let (row, col) = self.pos;

    if self.size == 0 || row == self.size {
      return None;
    }

    if col == self.size - 1 {
      self.pos = (row + 1, 0);
    } else {
      self.pos = (row, col + 1);
    }

    Some((row, col))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn direction_not() {
    assert_eq!(!Across, Down);
    assert_eq!(!Down, Across);
  }

  #[test]
  fn positions_are_row_major() {
    let positions: Vec<Pos> = GridPosIter::new(2).collect();
    assert_eq!(positions, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    assert_eq!(GridPosIter::new(0).count(), 0);
  }
}
