use crate::clock::{Clock, SystemClock};
use crate::source::PuzzleSource;
use crate::{
  Arrow, CheckResult, ClueRef, Cursor, Direction, EngineConfig, EngineError, Grid, Pos,
  PuzzleDocument, SessionTimer, SourceError, TimerState, check, format_clock,
};
use log::{info, warn};
use std::time::{Duration, Instant};

/// Something the view layer may want to tell the user about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
  /// A puzzle was loaded and the timer started.
  PuzzleReady { size: usize, open_squares: usize },
  /// The answers were checked.
  AnswerChecked(CheckResult),
  /// The check found every square correct; the timer stopped at `elapsed`.
  PuzzleSolved { result: CheckResult, elapsed: Duration },
  SolutionRevealed,
  PuzzleReset,
}

/// Indicates how a particular square should look. For instance, [Standard](Self::Standard)
/// might map to white, [Cursor](Self::Cursor) to red, and [Word](Self::Word) to yellow.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SquareStyle {
  /// A black square.
  Blocked,
  /// Default styling
  Standard,
  /// The cursor is positioned on this square.
  Cursor,
  /// The cursor is not on this square, but the selected word includes this square.
  Word,
}

/// Everything that belongs to one loaded puzzle.
#[derive(Debug)]
struct Session {
  doc: PuzzleDocument,
  grid: Grid,
  cursor: Cursor,
  timer: SessionTimer,
  /// Set by the first check that finds the puzzle solved; further checks return it.
  solved: Option<CheckResult>,
  last_click: Option<(Pos, Instant)>,
}

/// The object a crossword UI drives. Feed it user input (clicks, letters, arrows,
/// backspace and the check/reveal/reset buttons), then render from its snapshots
/// ([grid](Self::grid), [cursor](Self::cursor), [square_style](Self::square_style),
/// [timer_display](Self::timer_display)) and react to the [EngineEvent]s it queues.
///
/// Operations on squares return [EngineError] when no puzzle is loaded, or when the
/// square is outside the grid or black.
#[derive(Debug)]
pub struct Engine {
  config: EngineConfig,
  clock: Box<dyn Clock>,
  session: Option<Session>,
  events: Vec<EngineEvent>,
}

impl Engine {
  /// Creates an engine with nothing loaded, timed by the system clock.
  pub fn new(config: EngineConfig) -> Self {
    Self::with_clock(config, SystemClock)
  }

  pub fn with_clock(config: EngineConfig, clock: impl Clock + 'static) -> Self {
    Self {
      config,
      clock: Box::new(clock),
      session: None,
      events: Vec::new(),
    }
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  /// Starts a session on `doc`: an empty grid, a fresh cursor, and a running timer.
  /// Replaces any puzzle that was loaded before.
  pub fn load_puzzle(&mut self, doc: PuzzleDocument) {
    let now = self.clock.now();
    let mut timer = SessionTimer::new(self.config.tick_interval());
    timer.start(now);

    let size = doc.size();
    let open_squares = doc.open_positions().count();
    info!(
      "puzzle ready: {:?}, {size}x{size} with {open_squares} open squares",
      doc.title().unwrap_or("untitled")
    );

    self.session = Some(Session {
      grid: doc.blank_grid(),
      doc,
      cursor: Cursor::new(),
      timer,
      solved: None,
      last_click: None,
    });
    self.events.push(EngineEvent::PuzzleReady { size, open_squares });
  }

  /// Loads a puzzle from `source`. On failure nothing changes: a loaded puzzle
  /// stays loaded, and an empty engine stays empty.
  pub fn load_from(&mut self, source: &dyn PuzzleSource) -> Result<(), SourceError> {
    match source.load() {
      Ok(doc) => {
        self.load_puzzle(doc);
        Ok(())
      }
      Err(e) => {
        warn!("no valid puzzle available: {e}");
        Err(e)
      }
    }
  }

  pub fn is_loaded(&self) -> bool {
    self.session.is_some()
  }

  pub fn document(&self) -> Option<&PuzzleDocument> {
    self.session.as_ref().map(|s| &s.doc)
  }

  /// The letters entered so far.
  pub fn grid(&self) -> Option<&Grid> {
    self.session.as_ref().map(|s| &s.grid)
  }

  pub fn cursor(&self) -> Option<&Cursor> {
    self.session.as_ref().map(|s| &s.cursor)
  }

  /// Whether a check has found the puzzle solved.
  pub fn is_solved(&self) -> bool {
    self.session.as_ref().is_some_and(|s| s.solved.is_some())
  }

  /// Selects `pos`, toggling the direction if `double_click` is set and `pos`
  /// is already selected.
  pub fn select_cell(&mut self, pos: Pos, double_click: bool) -> Result<(), EngineError> {
    let session = self.open_session(pos)?;
    session.cursor.select(&session.doc, pos, double_click);
    Ok(())
  }

  /// Selects `pos` in response to a click. Clicking the same square twice within
  /// the double-click window toggles the direction.
  pub fn click_cell(&mut self, pos: Pos) -> Result<(), EngineError> {
    let now = self.clock.now();
    let window = self.config.double_click_window();
    let session = self.open_session(pos)?;

    let double_click = session
      .last_click
      .is_some_and(|(last_pos, at)| last_pos == pos && now.saturating_duration_since(at) < window);
    session.last_click = Some((pos, now));
    session.cursor.select(&session.doc, pos, double_click);
    Ok(())
  }

  /// Selects the word of a clue, as when the clue is clicked in a list: the cursor
  /// goes to the clue's first square, pointing in the clue's direction.
  pub fn select_clue(&mut self, number: u32, direction: Direction) -> Result<(), EngineError> {
    let session = self.session.as_mut().ok_or(EngineError::NotLoaded)?;
    let pos = session
      .doc
      .clue(number, direction)
      .and_then(|_| session.doc.clue_position(number))
      .ok_or_else(|| {
        warn!("rejected selection of clue {number} {direction}: no such clue");
        EngineError::UnknownClue { number, direction }
      })?;
    session.cursor.select_word(&session.doc, pos, direction);
    Ok(())
  }

  /// Writes typed input into `pos`. Input with several characters is reduced to one
  /// according to [EngineConfig::overwrite_on_type]; empty input empties the square.
  pub fn enter_letter(&mut self, pos: Pos, input: &str) -> Result<(), EngineError> {
    let letter = self.config.pick_char(input);
    let advance = self.config.auto_advance;
    let session = self.open_session(pos)?;
    session
      .cursor
      .enter_letter(&session.doc, &mut session.grid, pos, letter, advance);
    Ok(())
  }

  pub fn backspace(&mut self, pos: Pos) -> Result<(), EngineError> {
    let session = self.open_session(pos)?;
    session.cursor.backspace(&session.doc, &mut session.grid, pos);
    Ok(())
  }

  pub fn navigate_arrow(&mut self, pos: Pos, arrow: Arrow) -> Result<(), EngineError> {
    let session = self.open_session(pos)?;
    session.cursor.arrow(&session.doc, pos, arrow);
    Ok(())
  }

  /// Checks the grid against the answers. The first time the puzzle is found
  /// solved the timer stops; after that, checking is locked and returns the
  /// solving result without touching anything.
  pub fn check_answers(&mut self) -> Result<CheckResult, EngineError> {
    let now = self.clock.now();
    let session = self.session.as_mut().ok_or(EngineError::NotLoaded)?;

    if let Some(result) = session.solved {
      return Ok(result);
    }

    let result = check(&session.grid, &session.doc);
    info!("checked answers: {}/{}", result.correct, result.total);
    self.events.push(EngineEvent::AnswerChecked(result));

    if result.solved {
      session.solved = Some(result);
      let elapsed = session
        .timer
        .stop(now)
        .unwrap_or_else(|| session.timer.elapsed(now));
      info!("puzzle solved in {}", format_clock(elapsed));
      self.events.push(EngineEvent::PuzzleSolved { result, elapsed });
    }

    Ok(result)
  }

  /// Fills in every answer. The timer and the solved lock are left alone.
  pub fn reveal_solution(&mut self) -> Result<(), EngineError> {
    let session = self.session.as_mut().ok_or(EngineError::NotLoaded)?;
    session.grid = session.doc.answer_grid();
    info!("solution revealed");
    self.events.push(EngineEvent::SolutionRevealed);
    Ok(())
  }

  /// Clears the grid and the cursor, unlocks checking and restarts the timer from zero.
  pub fn reset(&mut self) -> Result<(), EngineError> {
    let now = self.clock.now();
    let session = self.session.as_mut().ok_or(EngineError::NotLoaded)?;

    session.grid.clear();
    session.cursor = Cursor::new();
    session.solved = None;
    session.last_click = None;
    session.timer.reset();
    session.timer.start(now);

    info!("puzzle reset");
    self.events.push(EngineEvent::PuzzleReset);
    Ok(())
  }

  /// Determines how a particular square should be styled.
  /// See [SquareStyle].
  pub fn square_style(&self, pos: Pos) -> SquareStyle {
    let Some(session) = &self.session else {
      return SquareStyle::Standard;
    };
    if !session.doc.is_open(pos) {
      return SquareStyle::Blocked;
    }
    if session.cursor.pos() == Some(pos) {
      return SquareStyle::Cursor;
    }
    if session.cursor.word().is_some_and(|word| word.contains(pos)) {
      return SquareStyle::Word;
    }
    SquareStyle::Standard
  }

  /// The clue for the selected word.
  pub fn current_clue(&self) -> Option<ClueRef<'_>> {
    let session = self.session.as_ref()?;
    let word = session.cursor.word()?;
    let number = session.doc.clue_number_at(word.start())?;
    session.doc.clue(number, word.direction())
  }

  pub fn timer_state(&self) -> TimerState {
    self
      .session
      .as_ref()
      .map_or(TimerState::NotStarted, |s| s.timer.state())
  }

  pub fn elapsed(&self) -> Duration {
    let now = self.clock.now();
    self
      .session
      .as_ref()
      .map_or(Duration::ZERO, |s| s.timer.elapsed(now))
  }

  /// The timer as `MM:SS`: live while solving, frozen once solved.
  pub fn timer_display(&self) -> String {
    format_clock(self.elapsed())
  }

  /// Fires the display tick if it is due, returning the new timer display.
  /// Never fires once the timer has stopped.
  pub fn poll_tick(&mut self) -> Option<String> {
    let now = self.clock.now();
    let session = self.session.as_mut()?;
    session
      .timer
      .poll_tick(now)
      .then(|| session.timer.display(now))
  }

  /// How long until the next display tick, or `None` if the timer is not running.
  pub fn tick_timeout(&self) -> Option<Duration> {
    let now = self.clock.now();
    self.session.as_ref()?.timer.tick_timeout(now)
  }

  /// Takes the events queued since the last call, oldest first.
  pub fn drain_events(&mut self) -> Vec<EngineEvent> {
    std::mem::take(&mut self.events)
  }

  /// The loaded session, provided `pos` is an open square in it.
  fn open_session(&mut self, pos: Pos) -> Result<&mut Session, EngineError> {
    let session = self.session.as_mut().ok_or(EngineError::NotLoaded)?;
    let size = session.doc.size();
    if !session.doc.in_bounds(pos) {
      warn!("rejected operation on {pos:?}: outside the grid");
      return Err(EngineError::OutOfBounds { pos, size });
    }
    if !session.doc.is_open(pos) {
      warn!("rejected operation on {pos:?}: blocked");
      return Err(EngineError::BlockedCell(pos));
    }
    Ok(session)
  }
}
