use super::PuzzleSource;
use super::checksum::Checksum;
use crate::Direction::{Across, Down};
use crate::{PuzzleDocument, SourceError};
use encoding::DecoderTrap::Strict;
use encoding::Encoding;
use encoding::all::ISO_8859_1;
use log::{info, warn};
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::fs;
use std::path::{Path, PathBuf};

const MAGIC: &[u8] = b"ACROSS&DOWN\0";
/// The CIB checksum covers the header from the width byte up to the solution.
const CIB_RANGE: std::ops::Range<usize> = 0x2C..0x34;

/// A `.puz` file, a de facto standard format for crossword puzzles.
///
/// There is no official spec for the format but parsing follows
/// <https://gist.github.com/sliminality/dab21fa834eae0a70193c7cd69c356d5>.
#[derive(Debug, Clone)]
pub struct PuzFile {
  path: PathBuf,
}

impl PuzFile {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Parses the bytes of a `.puz` file. Checksum mismatches don't stop the parse;
  /// they are returned next to the document.
  pub fn parse(data: &[u8]) -> Result<(PuzzleDocument, Vec<ChecksumMismatch>), SourceError> {
    let mut reader = Reader::new(data);

    let overall_checksum = reader.short()?;
    reader.expect(MAGIC)?;
    let cib_checksum = reader.short()?;
    let masked_checksums = reader.take(8)?;
    // Version string, reserved 1C, scrambled checksum, then twelve unlisted bytes.
    reader.take(4 + 2 + 2 + 12)?;

    let width = reader.byte()? as usize;
    let height = reader.byte()? as usize;
    let num_clues = reader.short()? as usize;
    // Unknown bitmask
    reader.short()?;
    if reader.short()? != 0 {
      return Err(SourceError::Scrambled);
    }

    let solution = reader.take(width * height)?;
    let solve_state = reader.take(width * height)?;
    let title = reader.nul_terminated()?;
    let author = reader.nul_terminated()?;
    let copyright = reader.nul_terminated()?;
    let clues = (0..num_clues)
      .map(|_| reader.nul_terminated())
      .collect::<Result<Vec<&[u8]>, _>>()?;
    // Some older files stop right after the clues.
    let notes = if reader.at_end() {
      &[][..]
    } else {
      reader.nul_terminated()?
    };

    let mut mismatches = vec![];
    let mut compare = |kind, expected: u16, actual: u16| {
      if expected != actual {
        mismatches.push(ChecksumMismatch {
          kind,
          expected,
          actual,
        });
      }
    };

    let cib = Checksum::default().region(&data[CIB_RANGE]);
    compare(ChecksumKind::Cib, cib.0, cib_checksum);

    let text = |c: Checksum| {
      let mut c = c
        .metadata(title)
        .metadata(author)
        .metadata(copyright);
      for clue in &clues {
        c = c.clue(clue);
      }
      c.metadata(notes)
    };

    let overall = text(Checksum(cib_checksum).region(solution).region(solve_state));
    compare(ChecksumKind::Overall, overall.0, overall_checksum);

    let solution_sum = Checksum::default().region(solution);
    let grid_sum = Checksum::default().region(solve_state);
    let partial_board = text(Checksum::default());
    let stored_cib = Checksum(cib_checksum);
    let expected_masked = [
      0x49 ^ stored_cib.low(),
      0x43 ^ solution_sum.low(),
      0x48 ^ grid_sum.low(),
      0x45 ^ partial_board.low(),
      0x41 ^ stored_cib.high(),
      0x54 ^ solution_sum.high(),
      0x45 ^ grid_sum.high(),
      0x44 ^ partial_board.high(),
    ];
    for (i, (&expected, &actual)) in expected_masked.iter().zip(masked_checksums).enumerate() {
      compare(ChecksumKind::Masked(i), expected.into(), actual.into());
    }

    let answers = solution
      .chunks(width.max(1))
      .map(|row| {
        row
          .iter()
          .map(|&b| if b == b'.' { None } else { Some(char::from(b)) })
          .collect()
      })
      .collect::<Vec<Vec<Option<char>>>>();
    let doc = PuzzleDocument::new(answers, BTreeMap::new(), BTreeMap::new(), None)?;

    let clues = clues
      .into_iter()
      .map(decode)
      .collect::<Result<Vec<String>, _>>()?;
    let (across, down) = allocate_clues(&doc, clues)?;

    let mut doc = doc.with_clues(across, down);
    let title = decode(title)?;
    if !title.is_empty() {
      doc = doc.with_title(title);
    }
    let author = decode(author)?;
    if !author.is_empty() {
      doc = doc.with_author(author);
    }
    let notes = decode(notes)?;
    if !notes.is_empty() {
      doc = doc.with_notes(notes);
    }

    Ok((doc, mismatches))
  }
}

impl PuzzleSource for PuzFile {
  fn load(&self) -> Result<PuzzleDocument, SourceError> {
    let data = fs::read(&self.path)?;
    let (doc, mismatches) = Self::parse(&data)?;
    for mismatch in &mismatches {
      warn!("{}: {}", self.path.display(), mismatch);
    }
    info!("loaded .puz puzzle from {}", self.path.display());
    Ok(doc)
  }
}

/// Hands out the clues in file order: by number, and for each number the across
/// clue before the down clue.
fn allocate_clues(
  doc: &PuzzleDocument,
  clues: Vec<String>,
) -> Result<(BTreeMap<u32, String>, BTreeMap<u32, String>), SourceError> {
  let mut across = BTreeMap::new();
  let mut down = BTreeMap::new();
  let mut clue_iter = clues.into_iter();

  for (&number, &pos) in doc.clue_positions() {
    for (direction, clues) in [(Across, &mut across), (Down, &mut down)] {
      if doc.starts(pos, direction) {
        let clue = clue_iter.next().ok_or_else(|| {
          SourceError::Parse(format!("no clue left for {number} {direction}"))
        })?;
        clues.insert(number, clue);
      }
    }
  }

  if clue_iter.next().is_some() {
    return Err(SourceError::Parse("more clues than words".into()));
  }
  Ok((across, down))
}

/// Turns an ISO-8859-1-encoded string into a standard String.
fn decode(bytes: &[u8]) -> Result<String, SourceError> {
  ISO_8859_1
    .decode(bytes, Strict)
    .map_err(|e| SourceError::Encoding(format!("failed decoding {bytes:?} as ISO-8859-1: {e}")))
}

/// Reads the file front to back.
struct Reader<'a> {
  data: &'a [u8],
  offset: usize,
}

impl<'a> Reader<'a> {
  fn new(data: &'a [u8]) -> Self {
    Self { data, offset: 0 }
  }

  fn at_end(&self) -> bool {
    self.offset >= self.data.len()
  }

  /// The next `n` bytes.
  fn take(&mut self, n: usize) -> Result<&'a [u8], SourceError> {
    let end = self.offset + n;
    let bytes = self
      .data
      .get(self.offset..end)
      .ok_or(SourceError::Eof(self.data.len()))?;
    self.offset = end;
    Ok(bytes)
  }

  fn byte(&mut self) -> Result<u8, SourceError> {
    Ok(self.take(1)?[0])
  }

  /// The next two bytes as a little-endian `u16`.
  fn short(&mut self) -> Result<u16, SourceError> {
    let bytes = self.take(2)?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
  }

  fn expect(&mut self, expected: &[u8]) -> Result<(), SourceError> {
    let at = self.offset;
    let bytes = self.take(expected.len())?;
    if bytes != expected {
      return Err(SourceError::Parse(format!(
        "expected {:?} at {:#x} but got {:?}",
        String::from_utf8_lossy(expected),
        at,
        String::from_utf8_lossy(bytes)
      )));
    }
    Ok(())
  }

  /// A C-style string, without its NUL.
  fn nul_terminated(&mut self) -> Result<&'a [u8], SourceError> {
    let rest = &self.data[self.offset.min(self.data.len())..];
    let len = rest
      .iter()
      .position(|&b| b == 0)
      .ok_or(SourceError::Eof(self.data.len()))?;
    self.offset += len + 1;
    Ok(&rest[..len])
  }
}

/// Which checksum in a `.puz` file failed to match.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ChecksumKind {
  Cib,
  Overall,
  /// One of the eight masked checksum bytes.
  Masked(usize),
}

/// A checksum stored in a `.puz` file did not match the contents. May indicate a
/// corrupted file, or a bug in this crate.
#[derive(Clone, Eq, PartialEq)]
pub struct ChecksumMismatch {
  pub kind: ChecksumKind,
  pub expected: u16,
  pub actual: u16,
}

impl Display for ChecksumMismatch {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "mismatch on checksum {:?}: expected {:#x} but got {:#x}",
      self.kind, self.expected, self.actual
    )
  }
}

impl Debug for ChecksumMismatch {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Writes a `.puz` file with correct checksums for a square puzzle given as
  /// rows like `"AB."`.
  fn build(rows: &[&str], clues: &[&str], title: &str) -> Vec<u8> {
    let size = rows.len() as u8;
    let solution: Vec<u8> = rows.iter().flat_map(|r| r.bytes()).collect();
    let state: Vec<u8> = solution
      .iter()
      .map(|&b| if b == b'.' { b'.' } else { b'-' })
      .collect();

    let mut data = vec![0, 0];
    data.extend_from_slice(MAGIC);
    data.extend_from_slice(&[0; 2 + 8]);
    data.extend_from_slice(b"1.3\0");
    data.extend_from_slice(&[0; 2 + 2 + 12]);
    data.extend_from_slice(&[size, size]);
    data.extend_from_slice(&(clues.len() as u16).to_le_bytes());
    data.extend_from_slice(&[1, 0, 0, 0]);
    data.extend_from_slice(&solution);
    data.extend_from_slice(&state);
    for s in [title, "Author", ""].iter().chain(clues).chain([&""]) {
      data.extend_from_slice(s.as_bytes());
      data.push(0);
    }

    let cib = Checksum::default().region(&data[CIB_RANGE]);
    let mut text = Checksum::default()
      .metadata(title.as_bytes())
      .metadata(b"Author")
      .metadata(b"");
    for clue in clues {
      text = text.clue(clue.as_bytes());
    }
    text = text.metadata(b"");

    let mut overall = cib.region(&solution).region(&state);
    overall = overall.metadata(title.as_bytes()).metadata(b"Author").metadata(b"");
    for clue in clues {
      overall = overall.clue(clue.as_bytes());
    }

    let sol = Checksum::default().region(&solution);
    let grid = Checksum::default().region(&state);
    let masked = [
      0x49 ^ cib.low(),
      0x43 ^ sol.low(),
      0x48 ^ grid.low(),
      0x45 ^ text.low(),
      0x41 ^ cib.high(),
      0x54 ^ sol.high(),
      0x45 ^ grid.high(),
      0x44 ^ text.high(),
    ];

    data[0..2].copy_from_slice(&overall.0.to_le_bytes());
    data[0x0E..0x10].copy_from_slice(&cib.0.to_le_bytes());
    data[0x10..0x18].copy_from_slice(&masked);
    data
  }

  fn small() -> Vec<u8> {
    build(&["AB.", ".C.", ".D."], &["Opening pair", "Column"], "Small")
  }

  #[test]
  fn parses_a_valid_file() {
    let (doc, mismatches) = PuzFile::parse(&small()).unwrap();

    assert!(mismatches.is_empty(), "{mismatches:?}");
    assert_eq!(doc.size(), 3);
    assert_eq!(doc.title(), Some("Small"));
    assert_eq!(doc.author(), Some("Author"));
    assert_eq!(doc.answer((2, 1)), Some('D'));
    assert_eq!(doc.answer((0, 2)), None);
    assert_eq!(doc.clue(1, Across).map(|c| c.text), Some("Opening pair"));
    assert_eq!(doc.clue(2, Down).map(|c| c.text), Some("Column"));
  }

  #[test]
  fn reports_checksum_mismatches() {
    let mut data = small();
    data[0] ^= 0xFF;

    let (doc, mismatches) = PuzFile::parse(&data).unwrap();
    assert_eq!(doc.size(), 3);
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].kind, ChecksumKind::Overall);
  }

  #[test]
  fn rejects_scrambled_and_truncated_files() {
    let mut scrambled = small();
    scrambled[0x32] = 4;
    assert!(matches!(
      PuzFile::parse(&scrambled),
      Err(SourceError::Scrambled)
    ));

    let full = small();
    let truncated = &full[..0x40];
    assert!(matches!(PuzFile::parse(truncated), Err(SourceError::Eof(_))));

    let mut bad_magic = small();
    bad_magic[2] = b'X';
    assert!(matches!(
      PuzFile::parse(&bad_magic),
      Err(SourceError::Parse(_))
    ));
  }

  #[test]
  fn wrong_clue_count_is_a_parse_error() {
    let data = build(&["AB.", ".C.", ".D."], &["Only one"], "Short");
    assert!(matches!(PuzFile::parse(&data), Err(SourceError::Parse(_))));
  }
}
