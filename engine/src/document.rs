use crate::Direction::{Across, Down};
use crate::{Direction, DocumentError, Grid, GridPosIter, Pos, Square};
use serde::Deserialize;
use std::collections::BTreeMap;

/// What a square of the answer grid holds.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Cell {
  /// A black square where nothing can be entered.
  Blocked,
  /// A square that accepts a letter; holds the (uppercase) answer.
  Open(char),
}

impl Cell {
  pub fn is_open(&self) -> bool {
    matches!(self, Self::Open(_))
  }

  pub fn is_blocked(&self) -> bool {
    *self == Self::Blocked
  }

  pub fn answer(&self) -> Option<char> {
    match self {
      Self::Open(c) => Some(*c),
      Self::Blocked => None,
    }
  }
}

/// A clue as seen from the grid: its number, its direction and its text.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ClueRef<'a> {
  pub number: u32,
  pub direction: Direction,
  pub text: &'a str,
}

/// The immutable description of a puzzle: the shape of the grid, which squares are
/// blocked, the answers, the clues and where each numbered word starts.
///
/// A `PuzzleDocument` is always valid. Every constructor checks that the grid is
/// square and non-empty, that clue anchors sit on open squares, and that every
/// word in the grid has a clue number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleDocument {
  size: usize,
  cells: Vec<Vec<Cell>>,
  across_clues: BTreeMap<u32, String>,
  down_clues: BTreeMap<u32, String>,
  /// Mapping from clue numbers to the square where that numbered word starts.
  clue_positions: BTreeMap<u32, Pos>,
  title: Option<String>,
  author: Option<String>,
  difficulty: Option<String>,
  notes: Option<String>,
}

/// The JSON shape served by the puzzle API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
  #[serde(default)]
  title: Option<String>,
  #[serde(default)]
  author: Option<String>,
  #[serde(default)]
  difficulty: Option<serde_json::Value>,
  #[serde(default)]
  notes: Option<String>,
  #[serde(default)]
  across_clues: BTreeMap<u32, String>,
  #[serde(default)]
  down_clues: BTreeMap<u32, String>,
  answers: Vec<Vec<Option<String>>>,
  #[serde(default)]
  clue_positions: Option<BTreeMap<u32, RawPos>>,
}

#[derive(Debug, Deserialize)]
struct RawPos {
  row: usize,
  col: usize,
}

impl PuzzleDocument {
  /// Builds a document from an answer grid (`None` for blocked squares) and clues.
  ///
  /// When `clue_positions` is `None` the anchors are computed with the usual
  /// numbering: scanning left to right and top to bottom, every square that starts
  /// an across or down word gets the next number.
  pub fn new(
    answers: Vec<Vec<Option<char>>>,
    across_clues: BTreeMap<u32, String>,
    down_clues: BTreeMap<u32, String>,
    clue_positions: Option<BTreeMap<u32, Pos>>,
  ) -> Result<Self, DocumentError> {
    let size = answers.len();
    if size == 0 {
      return Err(DocumentError::Empty);
    }

    let mut cells = Vec::with_capacity(size);
    for (row, line) in answers.into_iter().enumerate() {
      if line.len() != size {
        return Err(DocumentError::NotSquare {
          row,
          len: line.len(),
          size,
        });
      }
      cells.push(
        line
          .into_iter()
          .map(|answer| match answer {
            Some(c) => Cell::Open(normalize(c)),
            None => Cell::Blocked,
          })
          .collect::<Vec<Cell>>(),
      );
    }

    let mut doc = Self {
      size,
      cells,
      across_clues,
      down_clues,
      clue_positions: BTreeMap::new(),
      title: None,
      author: None,
      difficulty: None,
      notes: None,
    };

    if doc.open_positions().next().is_none() {
      return Err(DocumentError::NoOpenSquares);
    }

    doc.clue_positions = match clue_positions {
      Some(positions) => positions,
      None => doc.number_squares(),
    };
    doc.validate_anchors()?;

    Ok(doc)
  }

  /// Parses a document from the JSON served by the puzzle API:
  ///
  /// ```json
  /// {
  ///   "title": "Shopping",
  ///   "acrossClues": { "1": "..." },
  ///   "downClues": { "2": "..." },
  ///   "answers": [["A", "B", null], ...],
  ///   "cluePositions": { "1": { "row": 0, "col": 0 } }
  /// }
  /// ```
  pub fn from_json(json: &str) -> Result<Self, DocumentError> {
    let raw: RawDocument = serde_json::from_str(json)?;

    let mut answers = Vec::with_capacity(raw.answers.len());
    for (row, line) in raw.answers.into_iter().enumerate() {
      let mut parsed = Vec::with_capacity(line.len());
      for (col, answer) in line.into_iter().enumerate() {
        parsed.push(match answer {
          None => None,
          Some(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
              (Some(c), None) => Some(c),
              _ => {
                return Err(DocumentError::BadAnswer {
                  pos: (row, col),
                  answer: s,
                });
              }
            }
          }
        });
      }
      answers.push(parsed);
    }

    let clue_positions = raw.clue_positions.map(|positions| {
      positions
        .into_iter()
        .map(|(number, RawPos { row, col })| (number, (row, col)))
        .collect()
    });

    let mut doc = Self::new(answers, raw.across_clues, raw.down_clues, clue_positions)?;
    doc.title = raw.title;
    doc.author = raw.author;
    doc.notes = raw.notes;
    doc.difficulty = raw.difficulty.map(|value| match value {
      serde_json::Value::String(s) => s,
      other => other.to_string(),
    });
    Ok(doc)
  }

  /// Replaces the clue texts, keeping the anchors.
  pub(crate) fn with_clues(
    mut self,
    across_clues: BTreeMap<u32, String>,
    down_clues: BTreeMap<u32, String>,
  ) -> Self {
    self.across_clues = across_clues;
    self.down_clues = down_clues;
    self
  }

  pub fn with_title(mut self, title: impl Into<String>) -> Self {
    self.title = Some(title.into());
    self
  }

  pub fn with_author(mut self, author: impl Into<String>) -> Self {
    self.author = Some(author.into());
    self
  }

  pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
    self.notes = Some(notes.into());
    self
  }

  /// The side length of the (square) grid.
  pub fn size(&self) -> usize {
    self.size
  }

  /// Returns the [Cell] at the given position, or `None` if it is outside the grid.
  pub fn get(&self, (r, c): Pos) -> Option<Cell> {
    self.cells.get(r).and_then(|row| row.get(c)).copied()
  }

  pub fn in_bounds(&self, (r, c): Pos) -> bool {
    r < self.size && c < self.size
  }

  /// Whether the position is inside the grid and not blocked.
  pub fn is_open(&self, pos: Pos) -> bool {
    self.get(pos).is_some_and(|cell| cell.is_open())
  }

  pub fn answer(&self, pos: Pos) -> Option<char> {
    self.get(pos).and_then(|cell| cell.answer())
  }

  /// An iterator over all the positions of the grid, from left to right and top to bottom.
  pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
    GridPosIter::new(self.size)
  }

  /// An iterator over the positions of all open squares.
  pub fn open_positions(&self) -> impl Iterator<Item = Pos> + '_ {
    self.positions().filter(|&pos| self.is_open(pos))
  }

  /// A grid of the answers, the way the user grid would look once solved.
  pub fn answer_grid(&self) -> Grid {
    Grid::from_fn(self.size, |pos| match self.get(pos) {
      Some(Cell::Open(c)) => Square::Letter(c),
      _ => Square::Black,
    })
  }

  /// An empty user grid of the same shape as this document.
  pub fn blank_grid(&self) -> Grid {
    Grid::from_fn(self.size, |pos| {
      if self.is_open(pos) {
        Square::Empty
      } else {
        Square::Black
      }
    })
  }

  /// The position one step before `pos` along `direction`, if it is inside the grid.
  pub(crate) fn step_back(&self, (row, col): Pos, direction: Direction) -> Option<Pos> {
    match direction {
      Across if col > 0 => Some((row, col - 1)),
      Down if row > 0 => Some((row - 1, col)),
      _ => None,
    }
  }

  /// The position one step after `pos` along `direction`, if it is inside the grid.
  pub(crate) fn step_forward(&self, (row, col): Pos, direction: Direction) -> Option<Pos> {
    let next = match direction {
      Across => (row, col + 1),
      Down => (row + 1, col),
    };
    self.in_bounds(next).then_some(next)
  }

  /// Whether the given position is the start of a word in `direction`: an open
  /// square with a blocked square or the edge before it and an open square after it.
  pub fn starts(&self, pos: Pos, direction: Direction) -> bool {
    if !self.is_open(pos) {
      return false;
    }

    let before_closed = self
      .step_back(pos, direction)
      .is_none_or(|p| !self.is_open(p));
    let after_open = self
      .step_forward(pos, direction)
      .is_some_and(|p| self.is_open(p));

    before_closed && after_open
  }

  /// The clue number anchored at `pos`, if any.
  pub fn clue_number_at(&self, pos: Pos) -> Option<u32> {
    self
      .clue_positions
      .iter()
      .find(|&(_, &anchor)| anchor == pos)
      .map(|(&number, _)| number)
  }

  /// The square where the word numbered `number` starts.
  pub fn clue_position(&self, number: u32) -> Option<Pos> {
    self.clue_positions.get(&number).copied()
  }

  pub fn clue_positions(&self) -> &BTreeMap<u32, Pos> {
    &self.clue_positions
  }

  /// Looks up the clue text for a numbered word, e.g. `clue(12, Down)`.
  pub fn clue(&self, number: u32, direction: Direction) -> Option<ClueRef<'_>> {
    let clues = match direction {
      Across => &self.across_clues,
      Down => &self.down_clues,
    };
    clues.get(&number).map(|text| ClueRef {
      number,
      direction,
      text,
    })
  }

  /// All clues for one direction, ordered by number.
  pub fn clues(&self, direction: Direction) -> impl Iterator<Item = ClueRef<'_>> {
    let clues = match direction {
      Across => &self.across_clues,
      Down => &self.down_clues,
    };
    clues.iter().map(move |(&number, text)| ClueRef {
      number,
      direction,
      text,
    })
  }

  pub fn title(&self) -> Option<&str> {
    self.title.as_deref()
  }

  pub fn author(&self) -> Option<&str> {
    self.author.as_deref()
  }

  pub fn difficulty(&self) -> Option<&str> {
    self.difficulty.as_deref()
  }

  pub fn notes(&self) -> Option<&str> {
    self.notes.as_deref()
  }

  fn number_squares(&self) -> BTreeMap<u32, Pos> {
    let mut clue_number = 1;
    let mut numbered_squares = BTreeMap::new();

    for pos in self.positions() {
      if self.starts(pos, Across) || self.starts(pos, Down) {
        numbered_squares.insert(clue_number, pos);
        clue_number += 1;
      }
    }

    numbered_squares
  }

  fn validate_anchors(&self) -> Result<(), DocumentError> {
    for (&number, &pos) in &self.clue_positions {
      match self.get(pos) {
        None => return Err(DocumentError::AnchorOutOfBounds { number, pos }),
        Some(Cell::Blocked) => return Err(DocumentError::AnchorBlocked { number, pos }),
        Some(Cell::Open(_)) => {}
      }
    }

    for pos in self.positions() {
      for direction in [Across, Down] {
        if self.starts(pos, direction) && self.clue_number_at(pos).is_none() {
          return Err(DocumentError::UnnumberedWord { pos, direction });
        }
      }
    }

    Ok(())
  }
}

/// Answers and entries are compared in uppercase.
pub(crate) fn normalize(c: char) -> char {
  c.to_uppercase().next().unwrap_or(c)
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;

  /// Builds a document from rows like `"AB."`, where `.` is a blocked square.
  pub(crate) fn doc(rows: &[&str]) -> PuzzleDocument {
    let answers = rows
      .iter()
      .map(|row| {
        row
          .chars()
          .map(|c| if c == '.' { None } else { Some(c) })
          .collect()
      })
      .collect();
    PuzzleDocument::new(answers, BTreeMap::new(), BTreeMap::new(), None).unwrap()
  }

  #[test]
  fn numbering_matches_word_starts() {
    let doc = doc(&["AB.", ".C.", ".D."]);

    assert_eq!(doc.clue_number_at((0, 0)), Some(1));
    assert_eq!(doc.clue_number_at((0, 1)), Some(2));
    assert_eq!(doc.clue_number_at((1, 1)), None);
    assert_eq!(doc.clue_positions().len(), 2);
  }

  #[test]
  fn grid_starts() {
    let doc = doc(&["AB.C", "DE.F", "G.HI", "JKLM"]);

    let across_starts = [(0, 0), (1, 0), (2, 2), (3, 0)];
    let down_starts = [(0, 0), (0, 1), (0, 3), (2, 2)];

    for pos in doc.positions() {
      assert_eq!(doc.starts(pos, Across), across_starts.contains(&pos), "{pos:?}");
      assert_eq!(doc.starts(pos, Down), down_starts.contains(&pos), "{pos:?}");
    }
  }

  #[test]
  fn parses_api_json() {
    let json = r#"{
      "title": "Shopping",
      "difficulty": 2,
      "acrossClues": { "1": "First two" },
      "downClues": { "2": "Column" },
      "answers": [["a", "B", null], [null, "C", null], [null, "D", null]],
      "cluePositions": { "1": { "row": 0, "col": 0 }, "2": { "row": 0, "col": 1 } }
    }"#;
    let doc = PuzzleDocument::from_json(json).unwrap();

    assert_eq!(doc.size(), 3);
    assert_eq!(doc.get((0, 0)), Some(Cell::Open('A')));
    assert_eq!(doc.get((0, 2)), Some(Cell::Blocked));
    assert_eq!(doc.get((3, 0)), None);
    assert_eq!(doc.title(), Some("Shopping"));
    assert_eq!(doc.difficulty(), Some("2"));
    assert_eq!(doc.clue(1, Across).map(|c| c.text), Some("First two"));
    assert_eq!(doc.clue(2, Down).map(|c| c.text), Some("Column"));
    assert_eq!(doc.clue(2, Across), None);
  }

  #[test]
  fn rejects_invalid_documents() {
    let not_square = r#"{ "answers": [["A", "B"], ["C"]] }"#;
    assert!(matches!(
      PuzzleDocument::from_json(not_square),
      Err(DocumentError::NotSquare { row: 1, len: 1, size: 2 })
    ));

    let bad_answer = r#"{ "answers": [["AB", "C"], ["D", "E"]] }"#;
    assert!(matches!(
      PuzzleDocument::from_json(bad_answer),
      Err(DocumentError::BadAnswer { pos: (0, 0), .. })
    ));

    let empty = r#"{ "answers": [] }"#;
    assert!(matches!(
      PuzzleDocument::from_json(empty),
      Err(DocumentError::Empty)
    ));

    let all_blocked = r#"{ "answers": [[null]] }"#;
    assert!(matches!(
      PuzzleDocument::from_json(all_blocked),
      Err(DocumentError::NoOpenSquares)
    ));

    let blocked_anchor = r#"{
      "answers": [["A", null], ["B", null]],
      "cluePositions": { "1": { "row": 0, "col": 1 } }
    }"#;
    assert!(matches!(
      PuzzleDocument::from_json(blocked_anchor),
      Err(DocumentError::AnchorBlocked { number: 1, pos: (0, 1) })
    ));

    let unnumbered = r#"{
      "answers": [["A", "B"], [null, null]],
      "cluePositions": {}
    }"#;
    assert!(matches!(
      PuzzleDocument::from_json(unnumbered),
      Err(DocumentError::UnnumberedWord { pos: (0, 0), direction: Across })
    ));

    assert!(matches!(
      PuzzleDocument::from_json("{ not json"),
      Err(DocumentError::Json(_))
    ));
  }
}
