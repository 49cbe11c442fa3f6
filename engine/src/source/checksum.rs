//! The rotating checksum used throughout `.puz` files. See
//! <https://gist.github.com/sliminality/dab21fa834eae0a70193c7cd69c356d5#checksums>

/// A running checksum. Each region is folded into the value so far.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Checksum(pub(crate) u16);

impl Checksum {
  #[must_use]
  pub(crate) fn region(self, bytes: &[u8]) -> Self {
    let mut sum = self.0;
    for &byte in bytes {
      sum = sum.rotate_right(1).wrapping_add(byte as u16);
    }
    Self(sum)
  }

  /// Title, author, copyright and notes count only when non-empty, and then
  /// include their terminating NUL.
  #[must_use]
  pub(crate) fn metadata(self, s: &[u8]) -> Self {
    if s.is_empty() {
      return self;
    }
    self.region(s).region(&[0])
  }

  /// Clues never include their NUL.
  #[must_use]
  pub(crate) fn clue(self, s: &[u8]) -> Self {
    self.region(s)
  }

  pub(crate) fn low(self) -> u8 {
    (self.0 & 0xFF) as u8
  }

  pub(crate) fn high(self) -> u8 {
    (self.0 >> 8) as u8
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rotates_then_adds() {
    assert_eq!(Checksum(0).region(b"A").0, 0x41);
    // 0x41 is odd, so it rotates to 0x8020 before adding.
    assert_eq!(Checksum(0).region(b"AB").0, 0x8020 + 0x42);
    assert_eq!(Checksum(7).metadata(b""), Checksum(7));
    assert_eq!(Checksum(0).metadata(b"A"), Checksum(0).region(b"A\0"));
  }
}
