//! Time sources. The engine never calls [Instant::now] directly; it asks a [Clock],
//! so that timing and double-click detection can be driven by hand in tests.

use std::cell::Cell;
use std::fmt::Debug;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub trait Clock: Debug {
  fn now(&self) -> Instant;
}

/// The real monotonic clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> Instant {
    Instant::now()
  }
}

/// A clock that only moves when told to. Clones share the same time, so a test
/// can keep one handle and give another to an [Engine](crate::Engine).
#[derive(Debug, Clone)]
pub struct ManualClock {
  origin: Instant,
  offset: Rc<Cell<Duration>>,
}

impl ManualClock {
  pub fn new() -> Self {
    Self {
      origin: Instant::now(),
      offset: Rc::new(Cell::new(Duration::ZERO)),
    }
  }

  pub fn advance(&self, by: Duration) {
    self.offset.set(self.offset.get() + by);
  }

  pub fn advance_ms(&self, ms: u64) {
    self.advance(Duration::from_millis(ms));
  }
}

impl Default for ManualClock {
  fn default() -> Self {
    Self::new()
  }
}

impl Clock for ManualClock {
  fn now(&self) -> Instant {
    self.origin + self.offset.get()
  }
}
