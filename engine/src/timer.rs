use log::{debug, info, warn};
use std::time::{Duration, Instant};

/// Where a [SessionTimer] is in its life.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TimerState {
  NotStarted,
  Running,
  /// Frozen at the solve time. Only [SessionTimer::reset] leaves this state.
  Stopped,
}

/// The recurring display refresh. Exists only while the timer runs.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Tick {
  next: Instant,
  interval: Duration,
}

/// Measures how long the user takes to solve the puzzle.
///
/// `NotStarted -> Running -> Stopped`, and `reset` goes back to `NotStarted` from
/// anywhere. A stopped timer never resumes.
#[derive(Debug, Clone)]
pub struct SessionTimer {
  state: TimerState,
  started_at: Option<Instant>,
  elapsed: Duration,
  tick: Option<Tick>,
  interval: Duration,
}

impl SessionTimer {
  pub fn new(tick_interval: Duration) -> Self {
    Self {
      state: TimerState::NotStarted,
      started_at: None,
      elapsed: Duration::ZERO,
      tick: None,
      interval: tick_interval.max(Duration::from_millis(1)),
    }
  }

  pub fn state(&self) -> TimerState {
    self.state
  }

  pub fn is_running(&self) -> bool {
    self.state == TimerState::Running
  }

  /// Starts timing at `now`. Returns false, doing nothing, unless the timer is `NotStarted`.
  pub fn start(&mut self, now: Instant) -> bool {
    if self.state != TimerState::NotStarted {
      warn!("timer start ignored in state {:?}", self.state);
      return false;
    }

    self.state = TimerState::Running;
    self.started_at = Some(now);
    self.elapsed = Duration::ZERO;
    self.tick = Some(Tick {
      next: now + self.interval,
      interval: self.interval,
    });
    debug!("timer started");
    true
  }

  /// Freezes the elapsed time at `now` and cancels the tick. Returns the final
  /// elapsed time, or `None` if the timer was not running.
  pub fn stop(&mut self, now: Instant) -> Option<Duration> {
    if self.state != TimerState::Running {
      warn!("timer stop ignored in state {:?}", self.state);
      return None;
    }

    self.elapsed = self.elapsed(now);
    self.state = TimerState::Stopped;
    self.cancel_tick();
    info!("timer stopped at {}", format_clock(self.elapsed));
    Some(self.elapsed)
  }

  /// Back to `NotStarted` with nothing on the clock.
  pub fn reset(&mut self) {
    self.state = TimerState::NotStarted;
    self.started_at = None;
    self.elapsed = Duration::ZERO;
    self.cancel_tick();
  }

  /// Time on the clock at `now`: zero before starting, live while running,
  /// frozen once stopped.
  pub fn elapsed(&self, now: Instant) -> Duration {
    match (self.state, self.started_at) {
      (TimerState::Running, Some(started_at)) => now.saturating_duration_since(started_at),
      _ => self.elapsed,
    }
  }

  /// The clock as `MM:SS`.
  pub fn display(&self, now: Instant) -> String {
    format_clock(self.elapsed(now))
  }

  /// How long until the next tick is due, or `None` if there is no tick
  /// because the timer is not running.
  pub fn tick_timeout(&self, now: Instant) -> Option<Duration> {
    self
      .tick
      .as_ref()
      .map(|tick| tick.next.saturating_duration_since(now))
  }

  /// Fires the tick if it is due at `now`. Missed ticks are coalesced into one.
  pub fn poll_tick(&mut self, now: Instant) -> bool {
    let Some(tick) = self.tick.as_mut() else {
      return false;
    };
    if now < tick.next {
      return false;
    }
    // The next deadline stays on the original grid of ticks, strictly after `now`.
    let behind = now.duration_since(tick.next).as_nanos();
    let into_interval = behind % tick.interval.as_nanos();
    tick.next = now + tick.interval - Duration::from_nanos(into_interval as u64);
    true
  }

  fn cancel_tick(&mut self) {
    if self.tick.take().is_some() {
      debug!("timer tick cancelled");
    }
  }
}

/// Formats a duration as `MM:SS`, both fields zero-padded. Minutes are not capped at 59.
pub fn format_clock(elapsed: Duration) -> String {
  let secs = elapsed.as_secs();
  format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Formats a duration as `M:SS`, the way a finishing time is announced.
pub fn format_completion(elapsed: Duration) -> String {
  let secs = elapsed.as_secs();
  format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::clock::{Clock, ManualClock};

  fn timer() -> SessionTimer {
    SessionTimer::new(Duration::from_secs(1))
  }

  #[test]
  fn lifecycle() {
    let clock = ManualClock::new();
    let mut timer = timer();
    assert_eq!(timer.state(), TimerState::NotStarted);
    assert_eq!(timer.elapsed(clock.now()), Duration::ZERO);

    assert!(timer.start(clock.now()));
    assert!(!timer.start(clock.now()));
    clock.advance_ms(65_400);
    assert_eq!(timer.display(clock.now()), "01:05");

    assert_eq!(timer.stop(clock.now()), Some(Duration::from_millis(65_400)));
    assert_eq!(timer.state(), TimerState::Stopped);

    // Frozen.
    clock.advance_ms(10_000);
    assert_eq!(timer.display(clock.now()), "01:05");
    assert_eq!(timer.stop(clock.now()), None);
    assert!(!timer.start(clock.now()));

    timer.reset();
    assert_eq!(timer.state(), TimerState::NotStarted);
    assert_eq!(timer.elapsed(clock.now()), Duration::ZERO);
  }

  #[test]
  fn tick_fires_each_interval_until_stopped() {
    let clock = ManualClock::new();
    let mut timer = timer();
    assert_eq!(timer.tick_timeout(clock.now()), None);
    assert!(!timer.poll_tick(clock.now()));

    timer.start(clock.now());
    assert_eq!(timer.tick_timeout(clock.now()), Some(Duration::from_secs(1)));
    assert!(!timer.poll_tick(clock.now()));

    clock.advance_ms(1000);
    assert!(timer.poll_tick(clock.now()));
    assert!(!timer.poll_tick(clock.now()));

    // Several missed ticks collapse into one.
    clock.advance_ms(3500);
    assert!(timer.poll_tick(clock.now()));
    assert!(!timer.poll_tick(clock.now()));
    assert_eq!(timer.tick_timeout(clock.now()), Some(Duration::from_millis(500)));

    timer.stop(clock.now());
    clock.advance_ms(5000);
    assert_eq!(timer.tick_timeout(clock.now()), None);
    assert!(!timer.poll_tick(clock.now()));
  }

  #[test]
  fn catching_up_after_a_long_gap_is_one_step() {
    let clock = ManualClock::new();
    let mut timer = SessionTimer::new(Duration::from_millis(1));
    timer.start(clock.now());

    // Thirty days of missed 1 ms ticks.
    clock.advance(Duration::from_secs(30 * 24 * 3600) + Duration::from_micros(400));
    assert!(timer.poll_tick(clock.now()));
    assert!(!timer.poll_tick(clock.now()));
    assert_eq!(timer.tick_timeout(clock.now()), Some(Duration::from_micros(600)));
  }

  #[test]
  fn zero_interval_is_raised_to_a_millisecond() {
    let clock = ManualClock::new();
    let mut timer = SessionTimer::new(Duration::ZERO);
    timer.start(clock.now());
    assert_eq!(timer.tick_timeout(clock.now()), Some(Duration::from_millis(1)));
  }

  #[test]
  fn reset_cancels_the_tick() {
    let clock = ManualClock::new();
    let mut timer = timer();
    timer.start(clock.now());
    timer.reset();

    clock.advance_ms(2000);
    assert!(!timer.poll_tick(clock.now()));
    assert_eq!(timer.tick_timeout(clock.now()), None);
  }

  #[test]
  fn formatting() {
    assert_eq!(format_clock(Duration::from_secs(0)), "00:00");
    assert_eq!(format_clock(Duration::from_millis(59_999)), "00:59");
    assert_eq!(format_clock(Duration::from_secs(61 * 60 + 7)), "61:07");
    assert_eq!(format_completion(Duration::from_secs(125)), "2:05");
  }
}
