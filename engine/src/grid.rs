use crate::{GridPosIter, Pos};
use std::fmt::{Debug, Display};

/// A square in the user's grid.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Square {
  /// A black square where nothing can be entered.
  Black,
  /// A square where a letter could be entered, but that is currently empty.
  Empty,
  /// A square with a letter written in it.
  Letter(char),
}

impl Square {
  /// Whether this is [Square::Black].
  pub fn is_black(&self) -> bool {
    *self == Self::Black
  }

  pub fn is_empty(&self) -> bool {
    *self == Self::Empty
  }

  pub fn letter(&self) -> Option<char> {
    match self {
      Self::Letter(c) => Some(*c),
      _ => None,
    }
  }
}

impl Debug for Square {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Black => write!(f, "■"),
      Self::Empty => write!(f, " "),
      Self::Letter(c) => write!(f, "{}", c),
    }
  }
}

impl Display for Square {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:?}", self)
  }
}

/// The letters the user has entered so far. Has the same shape as the
/// [PuzzleDocument](crate::PuzzleDocument) it was made from, and its black
/// squares never change.
#[derive(Clone, Eq, PartialEq)]
pub struct Grid(Vec<Vec<Square>>);

impl Grid {
  /// Creates a `size` x `size` grid, asking `f` for the square at each position.
  pub(crate) fn from_fn(size: usize, mut f: impl FnMut(Pos) -> Square) -> Self {
    let mut grid = Vec::with_capacity(size);
    for row in 0..size {
      grid.push((0..size).map(|col| f((row, col))).collect::<Vec<Square>>());
    }
    Self(grid)
  }

  /// The side length of this grid.
  pub fn size(&self) -> usize {
    self.0.len()
  }

  /// An iterator over all the positions of this grid, from left to right and top to bottom.
  pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
    GridPosIter::new(self.size())
  }

  /// Returns the [Square] at the given [Pos].
  pub fn get(&self, (r, c): Pos) -> Square {
    self.0[r][c]
  }

  /// Writes a square. Black squares are fixed, so writing over one is a bug.
  pub(crate) fn set(&mut self, pos: Pos, square: Square) {
    debug_assert!(!self.get(pos).is_black(), "writing to black square {pos:?}");
    let (r, c) = pos;
    self.0[r][c] = square;
  }

  /// Whether every white square has a letter in it.
  pub fn is_filled(&self) -> bool {
    !self.0.iter().flatten().any(|sq| sq.is_empty())
  }

  /// Empties every white square.
  pub(crate) fn clear(&mut self) {
    for sq in self.0.iter_mut().flatten() {
      if !sq.is_black() {
        *sq = Square::Empty;
      }
    }
  }
}

impl Debug for Grid {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for row in &self.0 {
      for sq in row {
        write!(f, "{}", sq)?;
      }
      writeln!(f)?;
    }
    Ok(())
  }
}

impl Display for Grid {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "\n{:?}", self)
  }
}

#[cfg(test)]
mod tests {
  use crate::document::tests::doc;

  #[test]
  fn blank_grid_display() {
    let doc = doc(&["AB.C", "DE.F", "G.HI", "JKLM"]);
    let grid = doc.blank_grid();

    #[rustfmt::skip]
    assert_eq!(
      grid.to_string(),
      concat!(
        "\n",
        "  ■ \n",
        "  ■ \n",
        " ■  \n",
        "    \n",
      )
    );
    assert!(!grid.is_filled());
  }

  #[test]
  fn answer_grid_is_filled() {
    let doc = doc(&["AB.", ".C.", ".D."]);
    let mut grid = doc.answer_grid();

    assert!(grid.is_filled());
    assert_eq!(grid.get((2, 1)).letter(), Some('D'));

    grid.clear();
    assert_eq!(grid, doc.blank_grid());
  }
}
