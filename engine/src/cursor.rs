use crate::Direction::{Across, Down};
use crate::{Direction, Grid, Pos, PuzzleDocument, Square, Word, locate};
use log::debug;

/// An arrow key.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Arrow {
  Up,
  Down,
  Left,
  Right,
}

impl Arrow {
  /// Up and down move along a column, so they select the down direction.
  fn direction(self) -> Direction {
    match self {
      Arrow::Up | Arrow::Down => Down,
      Arrow::Left | Arrow::Right => Across,
    }
  }

  /// The neighboring position in this direction, clamped to the grid.
  fn step(self, (row, col): Pos, size: usize) -> Pos {
    let last = size.saturating_sub(1);
    match self {
      Arrow::Up => (row.saturating_sub(1), col),
      Arrow::Down => ((row + 1).min(last), col),
      Arrow::Left => (row, col.saturating_sub(1)),
      Arrow::Right => (row, (col + 1).min(last)),
    }
  }
}

/// The user's focus: the highlighted square, the direction they are entering,
/// and the word that direction selects through the square.
///
/// Whenever `word` is set, `pos` is one of its squares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
  pos: Option<Pos>,
  direction: Direction,
  word: Option<Word>,
}

impl Default for Cursor {
  fn default() -> Self {
    Self::new()
  }
}

impl Cursor {
  /// A cursor that is on no square yet and points across.
  pub fn new() -> Self {
    Self {
      pos: None,
      direction: Across,
      word: None,
    }
  }

  /// The currently-highlighted square.
  pub fn pos(&self) -> Option<Pos> {
    self.pos
  }

  pub fn direction(&self) -> Direction {
    self.direction
  }

  /// The word being entered, if the current square is part of one.
  pub fn word(&self) -> Option<&Word> {
    self.word.as_ref()
  }

  /// Moves the cursor to `pos` and selects the word through it.
  ///
  /// Selecting the current square again with `double_click` set swaps the
  /// direction first. If there is no word in the current direction, the other
  /// direction is tried and adopted when it has one; if neither has one, no
  /// word is selected.
  pub fn select(&mut self, doc: &PuzzleDocument, pos: Pos, double_click: bool) {
    debug_assert!(doc.is_open(pos));

    if double_click && self.pos == Some(pos) {
      self.direction = !self.direction;
    }

    self.word = match locate(doc, pos, self.direction) {
      Some(word) => Some(word),
      None => {
        let word = locate(doc, pos, !self.direction);
        if word.is_some() {
          self.direction = !self.direction;
        }
        word
      }
    };
    self.pos = Some(pos);

    debug!(
      "selected {:?} {} (word: {:?})",
      pos,
      self.direction,
      self.word.as_ref().map(Word::squares)
    );
  }

  /// Writes `letter` into `pos`, or empties it if `letter` is `None`. When a letter
  /// is written and `advance` is set, the cursor moves on to the next square of the
  /// selected word, if `pos` is in it and is not its last square.
  pub fn enter_letter(
    &mut self,
    doc: &PuzzleDocument,
    grid: &mut Grid,
    pos: Pos,
    letter: Option<char>,
    advance: bool,
  ) {
    debug_assert!(doc.is_open(pos));

    let Some(c) = letter else {
      grid.set(pos, Square::Empty);
      return;
    };
    grid.set(pos, Square::Letter(c));

    if advance {
      if let Some(next) = self.word.as_ref().and_then(|word| word.after(pos)) {
        debug!("advancing from {pos:?} to {next:?}");
        self.pos = Some(next);
      }
    }
  }

  /// Empties `pos` and backs up: to the previous square of the selected word if
  /// `pos` is in it past the first square, otherwise to the square just before `pos`
  /// in the current direction if that one is open. If neither exists, the cursor
  /// stays on `pos`.
  pub fn backspace(&mut self, doc: &PuzzleDocument, grid: &mut Grid, pos: Pos) {
    debug_assert!(doc.is_open(pos));
    grid.set(pos, Square::Empty);

    if let Some(prev) = self.word.as_ref().and_then(|word| word.before(pos)) {
      debug!("backing up from {pos:?} to {prev:?} within the word");
      self.pos = Some(prev);
      return;
    }

    let prev = doc
      .step_back(pos, self.direction)
      .filter(|&p| doc.is_open(p));
    match prev {
      Some(prev) => {
        debug!("backing up from {pos:?} to {prev:?}");
        self.select(doc, prev, false);
      }
      None if self.pos != Some(pos) => self.select(doc, pos, false),
      None => {}
    }
  }

  /// Selects the word numbered at `pos` in `direction`, as when a clue is picked
  /// from a list. Falls back to the other direction like [select](Self::select).
  pub fn select_word(&mut self, doc: &PuzzleDocument, pos: Pos, direction: Direction) {
    self.direction = direction;
    self.select(doc, pos, false);
  }

  /// Handles an arrow key pressed on `pos`. The direction always follows the
  /// arrow; the cursor moves one square unless that would leave the grid or land
  /// on a black square.
  pub fn arrow(&mut self, doc: &PuzzleDocument, pos: Pos, arrow: Arrow) {
    self.direction = arrow.direction();

    let dest = arrow.step(pos, doc.size());
    if dest == pos {
      debug!("{arrow:?} from {pos:?} is at the edge");
      self.stay(doc, pos);
      return;
    }
    if !doc.is_open(dest) {
      debug!("{arrow:?} from {pos:?} is blocked by {dest:?}");
      self.stay(doc, pos);
      return;
    }

    self.select(doc, dest, false);
  }

  /// Keeps the cursor on `pos` and selects the word through it in the current
  /// direction only, so the highlighted word always matches `direction`.
  fn stay(&mut self, doc: &PuzzleDocument, pos: Pos) {
    self.pos = Some(pos);
    self.word = locate(doc, pos, self.direction);
  }
}
