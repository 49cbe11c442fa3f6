use crate::{Direction, Pos, PuzzleDocument};

/// A maximal run of two or more open squares in one row (across) or column (down),
/// in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
  direction: Direction,
  squares: Vec<Pos>,
}

impl Word {
  pub fn direction(&self) -> Direction {
    self.direction
  }

  pub fn squares(&self) -> &[Pos] {
    &self.squares
  }

  /// The first square of the word, where its clue number sits.
  pub fn start(&self) -> Pos {
    self.squares[0]
  }

  pub fn len(&self) -> usize {
    self.squares.len()
  }

  /// Always false: a word has at least two squares.
  pub fn is_empty(&self) -> bool {
    self.squares.is_empty()
  }

  pub fn contains(&self, pos: Pos) -> bool {
    self.squares.contains(&pos)
  }

  /// Index of `pos` within the word.
  pub fn index_of(&self, pos: Pos) -> Option<usize> {
    self.squares.iter().position(|&p| p == pos)
  }

  /// The square after `pos` in this word, if `pos` is in the word and not its last square.
  pub fn after(&self, pos: Pos) -> Option<Pos> {
    let i = self.index_of(pos)?;
    self.squares.get(i + 1).copied()
  }

  /// The square before `pos` in this word, if `pos` is in the word and not its first square.
  pub fn before(&self, pos: Pos) -> Option<Pos> {
    let i = self.index_of(pos)?;
    i.checked_sub(1).map(|i| self.squares[i])
  }
}

/// Finds the word through `pos` in the given direction.
///
/// Returns `None` when the open run through `pos` is a single square, since a
/// lone square is not a word.
///
/// # Panics
///
/// If `pos` is not an open square of `doc`.
pub fn locate(doc: &PuzzleDocument, pos: Pos, direction: Direction) -> Option<Word> {
  assert!(doc.is_open(pos), "locate called on {pos:?}, which is not open");

  let mut start = pos;
  while let Some(prev) = doc.step_back(start, direction) {
    if !doc.is_open(prev) {
      break;
    }
    start = prev;
  }

  let mut end = pos;
  while let Some(next) = doc.step_forward(end, direction) {
    if !doc.is_open(next) {
      break;
    }
    end = next;
  }

  if start == end {
    return None;
  }

  let mut squares = vec![start];
  let mut current = start;
  while current != end {
    // Every square between start and end was just scanned, so it's in bounds.
    current = doc.step_forward(current, direction)?;
    squares.push(current);
  }

  Some(Word { direction, squares })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Direction::{Across, Down};
  use crate::document::tests::doc;

  #[test]
  fn locates_words_in_small_grid() {
    let doc = doc(&["AB.", ".C.", ".D."]);

    let across = locate(&doc, (0, 0), Across).unwrap();
    assert_eq!(across.squares(), &[(0, 0), (0, 1)]);
    assert_eq!(across.direction(), Across);

    assert_eq!(locate(&doc, (0, 0), Down), None);

    let down = locate(&doc, (0, 1), Down).unwrap();
    assert_eq!(down.squares(), &[(0, 1), (1, 1), (2, 1)]);
    assert_eq!(down.start(), (0, 1));

    assert_eq!(locate(&doc, (1, 1), Across), None);
  }

  #[test]
  fn relocating_from_any_square_gives_the_same_word() {
    let doc = doc(&["AB.CD", "EFGHI", "J.K.L", "MNOPQ", "RS.TU"]);

    for pos in doc.open_positions().collect::<Vec<_>>() {
      for direction in [Across, Down] {
        if let Some(word) = locate(&doc, pos, direction) {
          assert!(word.len() >= 2);
          assert!(word.contains(pos));
          for &other in word.squares() {
            assert_eq!(locate(&doc, other, direction).as_ref(), Some(&word));
          }
          // Maximal: nothing open just outside either end.
          let last = word.squares()[word.len() - 1];
          assert!(doc.step_back(word.start(), direction).is_none_or(|p| !doc.is_open(p)));
          assert!(doc.step_forward(last, direction).is_none_or(|p| !doc.is_open(p)));
        }
      }
    }
  }

  #[test]
  fn before_and_after() {
    let doc = doc(&["ABC", "...", "..."]);
    let word = locate(&doc, (0, 1), Across).unwrap();

    assert_eq!(word.before((0, 0)), None);
    assert_eq!(word.before((0, 2)), Some((0, 1)));
    assert_eq!(word.after((0, 1)), Some((0, 2)));
    assert_eq!(word.after((0, 2)), None);
    assert_eq!(word.after((1, 1)), None);
  }

  #[test]
  #[should_panic]
  fn locate_on_blocked_square_panics() {
    let doc = doc(&["AB.", ".C.", ".D."]);
    locate(&doc, (0, 2), Across);
  }
}
