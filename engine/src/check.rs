use crate::{Grid, PuzzleDocument};

/// How much of the grid is right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckResult {
  /// Open squares whose entered letter matches the answer.
  pub correct: usize,
  /// All open squares.
  pub total: usize,
  /// Whether every open square is correct.
  pub solved: bool,
}

/// Compares the user's grid with the answers. Has no side effects.
pub fn check(grid: &Grid, doc: &PuzzleDocument) -> CheckResult {
  let mut correct = 0;
  let mut total = 0;

  for pos in doc.open_positions() {
    total += 1;
    if grid.get(pos).letter() == doc.answer(pos) {
      correct += 1;
    }
  }

  CheckResult {
    correct,
    total,
    solved: total > 0 && correct == total,
  }
}
