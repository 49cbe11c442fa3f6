use crossword_engine::Direction::{Across, Down};
use crossword_engine::{Direction, Pos, PuzzleDocument, SquareStyle};
use ratatui::{
  buffer::Buffer,
  layout::{Constraint, Flex, Layout, Rect},
  style::{Color, Modifier, Style, Stylize},
  text::Line,
  widgets::{Block, Clear, Padding, Paragraph, Widget, Wrap},
};
use ratatui_macros::{horizontal, line, vertical};

use crate::app::App;

/// Horizontal distance between the left edges of neighboring squares. The last
/// column is left blank as a gap.
const SQUARE_WIDTH: u16 = 6;
/// Vertical distance between the top edges of neighboring squares, including a
/// blank row.
const SQUARE_HEIGHT: u16 = 3;
const CLUE_WIDTH: u16 = 45;

fn square_style(style: SquareStyle) -> Style {
  let base_style = match style {
    SquareStyle::Blocked => return Style::new().bg(Color::Black),
    SquareStyle::Standard => Style::new().bg(Color::White),
    SquareStyle::Cursor => Style::new().bg(Color::LightRed),
    SquareStyle::Word => Style::new().bg(Color::LightYellow),
  };
  base_style.fg(Color::Black).add_modifier(Modifier::BOLD)
}

/// The areas of the screen: title, grid, clues and status.
struct Areas {
  title: Rect,
  puzzle: Rect,
  clues: Rect,
  status: Rect,
}

fn areas(area: Rect) -> Areas {
  let [title, main, status] = vertical![==2, *=1, ==2].areas(area);
  let [puzzle, clues] = horizontal![*=1, ==CLUE_WIDTH].areas(main);
  Areas {
    title,
    puzzle,
    clues,
    status,
  }
}

/// Where the grid sits inside the puzzle area.
fn grid_area(puzzle_area: Rect, size: usize) -> Rect {
  let size = u16::try_from(size).unwrap_or(u16::MAX);
  center(
    puzzle_area,
    Constraint::Length(size.saturating_mul(SQUARE_WIDTH)),
    Constraint::Length(size.saturating_mul(SQUARE_HEIGHT)),
  )
}

/// The drawn part of the square at `(row, col)`, without its gap.
fn square_rect(grid_area: Rect, (row, col): Pos) -> Rect {
  Rect {
    x: grid_area.x + col as u16 * SQUARE_WIDTH,
    y: grid_area.y + row as u16 * SQUARE_HEIGHT,
    width: SQUARE_WIDTH - 1,
    height: SQUARE_HEIGHT - 1,
  }
  .intersection(grid_area)
}

/// Finds the square under a terminal cell, for mouse clicks. Clicks on the gaps
/// between squares hit nothing.
pub fn square_at(area: Rect, size: usize, column: u16, row: u16) -> Option<Pos> {
  let grid = grid_area(areas(area).puzzle, size);
  if column < grid.x || row < grid.y || column >= grid.right() || row >= grid.bottom() {
    return None;
  }

  let (dx, dy) = (column - grid.x, row - grid.y);
  if dx % SQUARE_WIDTH == SQUARE_WIDTH - 1 || dy % SQUARE_HEIGHT == SQUARE_HEIGHT - 1 {
    return None;
  }
  let pos = ((dy / SQUARE_HEIGHT) as usize, (dx / SQUARE_WIDTH) as usize);
  (pos.0 < size && pos.1 < size).then_some(pos)
}

/// The Across and Down clue lists inside the clue column, with the current clue
/// panel above them.
fn clue_areas(clues: Rect) -> (Rect, [(Direction, Rect); 2]) {
  let [current, across, down] = vertical![==6, *=1, *=1].areas(clues);
  (current, [(Across, across), (Down, down)])
}

/// Finds the clue listed under a terminal cell, for mouse clicks. Each clue takes
/// one line of its list.
pub fn clue_at(
  area: Rect,
  doc: &PuzzleDocument,
  column: u16,
  row: u16,
) -> Option<(u32, Direction)> {
  let (_, lists) = clue_areas(areas(area).clues);
  lists.into_iter().find_map(|(direction, list)| {
    let inner = Block::bordered().inner(list);
    let inside =
      column >= inner.x && column < inner.right() && row >= inner.y && row < inner.bottom();
    if !inside {
      return None;
    }
    doc
      .clues(direction)
      .nth(usize::from(row - inner.y))
      .map(|clue| (clue.number, direction))
  })
}

impl App {
  fn render_grid(&self, doc: &PuzzleDocument, area: Rect, buf: &mut Buffer) {
    let Some(grid) = self.engine.grid() else {
      return;
    };
    let grid_area = grid_area(area, doc.size());

    for pos in doc.positions() {
      let rect = square_rect(grid_area, pos);
      if rect.is_empty() {
        continue;
      }
      let style = square_style(self.engine.square_style(pos));
      Block::new().style(style).render(rect, buf);

      if let Some(number) = doc.clue_number_at(pos) {
        Line::from(number.to_string())
          .style(style.remove_modifier(Modifier::BOLD))
          .render(Rect { height: 1, ..rect }, buf);
      }
      if let Some(letter) = grid.get(pos).letter() {
        let letter_area = Rect {
          y: rect.y + 1,
          height: 1,
          ..rect
        }
        .intersection(rect);
        Line::from(letter.to_string())
          .style(style)
          .centered()
          .render(letter_area, buf);
      }
    }
  }

  fn render_clues(&self, doc: &PuzzleDocument, area: Rect, buf: &mut Buffer) {
    let (current_area, lists) = clue_areas(area);

    let current = self.engine.current_clue();
    let current_text = current
      .map(|clue| format!("{} {}: {}", clue.number, clue.direction, clue.text))
      .unwrap_or_default();
    Paragraph::new(current_text)
      .wrap(Wrap { trim: true })
      .block(
        Block::bordered()
          .title(Line::from("Current clue").centered())
          .padding(Padding::horizontal(1)),
      )
      .render(current_area, buf);

    let current_id = current.map(|clue| (clue.number, clue.direction));
    for (direction, clue_area) in lists {
      render_clue_list(doc, direction, current_id, clue_area, buf);
    }
  }

  fn render_status(&self, area: Rect, buf: &mut Buffer) {
    let [status_area, help_area] = vertical![==1, ==1].areas(area);

    let message = self
      .message
      .as_ref()
      .map(|m| m.text.as_str())
      .unwrap_or_default();
    line![
      self.engine.timer_display().bold(),
      "   ",
      message.italic().cyan(),
    ]
    .centered()
    .render(status_area, buf);

    Line::from(
      "Enter: check  Ctrl+S: show solution  Ctrl+R: reset  Space: direction  Esc: quit",
    )
    .dim()
    .centered()
    .render(help_area, buf);
  }

  fn render_banner(&self, text: &str, area: Rect, buf: &mut Buffer) {
    let popup = center(area, Constraint::Length(50), Constraint::Length(6));
    Clear.render(popup, buf);
    Paragraph::new(vec![Line::from(text.to_string()), Line::from("Esc to close".dim())])
      .centered()
      .wrap(Wrap { trim: true })
      .block(
        Block::bordered()
          .title(Line::from("Congratulations!".bold().green()).centered())
          .padding(Padding::uniform(1)),
      )
      .render(popup, buf);
  }
}

fn render_clue_list(
  doc: &PuzzleDocument,
  direction: Direction,
  current: Option<(u32, Direction)>,
  area: Rect,
  buf: &mut Buffer,
) {
  let lines = doc
    .clues(direction)
    .map(|clue| {
      let line = Line::from(format!("{}. {}", clue.number, clue.text));
      if current == Some((clue.number, direction)) {
        line.reversed()
      } else {
        line
      }
    })
    .collect::<Vec<Line>>();

  // One line per clue, so a click can be mapped back to its clue.
  Paragraph::new(lines)
    .block(Block::bordered().title(Line::from(direction.to_string()).centered()))
    .render(area, buf);
}

impl Widget for &App {
  fn render(self, area: Rect, buf: &mut Buffer) {
    let areas = areas(area);
    let Some(doc) = self.engine.document() else {
      return;
    };

    let mut title = line!["Ratatui Crossword".bold().blue()];
    if let Some(name) = doc.title() {
      title.push_span(": ".bold());
      title.push_span(name.to_string().bold());
    }
    if let Some(difficulty) = doc.difficulty() {
      title.push_span(format!(" ({difficulty})").dim());
    }
    title.centered().render(areas.title, buf);

    self.render_grid(doc, areas.puzzle, buf);
    self.render_clues(doc, areas.clues, buf);
    self.render_status(areas.status, buf);

    if let Some(banner) = &self.banner {
      self.render_banner(banner, area, buf);
    }
  }
}

/// https://ratatui.rs/recipes/layout/center-a-widget/
fn center(area: Rect, horizontal: Constraint, vertical: Constraint) -> Rect {
  let [area] = Layout::horizontal([horizontal])
    .flex(Flex::Center)
    .areas(area);
  let [area] = Layout::vertical([vertical]).flex(Flex::Center).areas(area);
  area
}
