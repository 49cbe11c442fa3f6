use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
  self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
  MouseEventKind,
};
use crossword_engine::{Arrow, Engine, EngineError, EngineEvent, Pos, format_completion};
use log::{debug, warn};
use ratatui::{DefaultTerminal, Frame, layout::Rect};

use crate::ui;

/// A transient line of text under the grid.
#[derive(Debug)]
pub struct Message {
  pub text: String,
  pub expires_at: Instant,
}

#[derive(Debug)]
pub struct App {
  pub engine: Engine,
  pub message: Option<Message>,
  /// Shown over the grid once the puzzle is solved, until dismissed.
  pub banner: Option<String>,
  message_duration: Duration,
  /// The area of the last frame, for turning mouse clicks into squares.
  area: Rect,
  running: bool,
}

impl App {
  pub fn new(mut engine: Engine, message_duration: Duration) -> Self {
    // Start on the first open square, like a solver picking up a pencil.
    let first = engine
      .document()
      .and_then(|doc| doc.open_positions().next());
    if let Some(pos) = first {
      report(engine.select_cell(pos, false));
    }

    Self {
      engine,
      message: None,
      banner: None,
      message_duration,
      area: Rect::default(),
      running: true,
    }
  }

  pub fn run(mut self, mut terminal: DefaultTerminal) -> io::Result<()> {
    self.running = true;
    while self.running {
      self.handle_engine_events();
      terminal.draw(|frame| self.draw(frame))?;

      // Only wake up on a timer while there's a tick or a message to expire.
      match self.poll_timeout() {
        Some(timeout) => {
          if event::poll(timeout)? {
            self.handle_crossterm_event(event::read()?);
          }
        }
        None => self.handle_crossterm_event(event::read()?),
      }

      if let Some(display) = self.engine.poll_tick() {
        debug!("tick {display}");
      }
      self.expire_message(Instant::now());
    }
    Ok(())
  }

  fn draw(&mut self, frame: &mut Frame) {
    self.area = frame.area();
    frame.render_widget(&*self, frame.area());
  }

  fn poll_timeout(&self) -> Option<Duration> {
    let message = self
      .message
      .as_ref()
      .map(|m| m.expires_at.saturating_duration_since(Instant::now()));
    match (self.engine.tick_timeout(), message) {
      (Some(a), Some(b)) => Some(a.min(b)),
      (a, b) => a.or(b),
    }
  }

  fn handle_crossterm_event(&mut self, event: Event) {
    match event {
      // it's important to check KeyEventKind::Press to avoid handling key release events
      Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
      Event::Mouse(mouse) => self.on_mouse_event(mouse),
      _ => {}
    }
  }

  /// Handles the key events and updates the state of [`App`].
  pub fn on_key_event(&mut self, key: KeyEvent) {
    match (key.modifiers, key.code) {
      (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
      (_, KeyCode::Esc) => {
        if self.banner.take().is_none() {
          self.quit();
        }
      }
      (KeyModifiers::CONTROL, KeyCode::Char('s')) => report(self.engine.reveal_solution()),
      (KeyModifiers::CONTROL, KeyCode::Char('r')) => {
        report(self.engine.reset());
        self.select_first_square();
      }
      (_, KeyCode::Enter) => report(self.engine.check_answers().map(|_| ())),
      (_, code) => {
        let Some(pos) = self.cursor_pos() else {
          return;
        };
        let result = match code {
          KeyCode::Char(' ') | KeyCode::Tab => self.engine.select_cell(pos, true),
          KeyCode::Char(c) if c.is_alphanumeric() => {
            self.engine.enter_letter(pos, c.encode_utf8(&mut [0; 4]))
          }
          KeyCode::Backspace => self.engine.backspace(pos),
          KeyCode::Delete => self.engine.enter_letter(pos, ""),
          KeyCode::Up => self.engine.navigate_arrow(pos, Arrow::Up),
          KeyCode::Down => self.engine.navigate_arrow(pos, Arrow::Down),
          KeyCode::Left => self.engine.navigate_arrow(pos, Arrow::Left),
          KeyCode::Right => self.engine.navigate_arrow(pos, Arrow::Right),
          _ => Ok(()),
        };
        report(result);
      }
    }
  }

  pub fn on_mouse_event(&mut self, mouse: MouseEvent) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
      return;
    }
    let Some(doc) = self.engine.document() else {
      return;
    };
    if let Some(pos) = ui::square_at(self.area, doc.size(), mouse.column, mouse.row) {
      if doc.is_open(pos) {
        report(self.engine.click_cell(pos));
      }
    } else if let Some((number, direction)) =
      ui::clue_at(self.area, doc, mouse.column, mouse.row)
    {
      report(self.engine.select_clue(number, direction));
    }
  }

  /// Turns engine events into messages for the user.
  fn handle_engine_events(&mut self) {
    for event in self.engine.drain_events() {
      match event {
        EngineEvent::PuzzleReady { .. } => {}
        EngineEvent::AnswerChecked(result) if !result.solved => self.show_message(format!(
          "Correct: {}/{}. Keep trying!",
          result.correct, result.total
        )),
        EngineEvent::AnswerChecked(_) => {}
        EngineEvent::PuzzleSolved { elapsed, .. } => {
          self.banner = Some(format!(
            "You completed the crossword in {}!",
            format_completion(elapsed)
          ));
        }
        EngineEvent::SolutionRevealed => self.show_message("Solution shown!".into()),
        EngineEvent::PuzzleReset => {
          self.banner = None;
          self.show_message("Puzzle reset!".into());
        }
      }
    }
  }

  fn show_message(&mut self, text: String) {
    self.message = Some(Message {
      text,
      expires_at: Instant::now() + self.message_duration,
    });
  }

  fn expire_message(&mut self, now: Instant) {
    if self.message.as_ref().is_some_and(|m| m.expires_at <= now) {
      self.message = None;
    }
  }

  fn cursor_pos(&self) -> Option<Pos> {
    self.engine.cursor().and_then(|cursor| cursor.pos())
  }

  fn select_first_square(&mut self) {
    let first = self
      .engine
      .document()
      .and_then(|doc| doc.open_positions().next());
    if let Some(pos) = first {
      report(self.engine.select_cell(pos, false));
    }
  }

  /// Set running to false to quit the application.
  fn quit(&mut self) {
    self.running = false;
  }
}

/// The app only calls the engine on open squares of a loaded puzzle, so an
/// error here is a bug worth logging, not worth crashing the terminal for.
fn report(result: Result<(), EngineError>) {
  if let Err(e) = result {
    warn!("engine rejected input: {e}");
  }
}
