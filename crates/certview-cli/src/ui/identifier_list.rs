//! Identifier pane (left): queued CPFs plus the input line.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::Line,
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, Focus};

/// Render the identifier list into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let focused = app.focus == Focus::Identifiers || app.prompt.is_some();

  let block = Block::default()
    .title(format!(" CPFs ({}) ", app.identifiers.len()))
    .borders(Borders::ALL)
    .border_style(super::border_style(focused));

  let mut inner = block.inner(area);
  f.render_widget(block, area);
  if inner.height == 0 {
    return;
  }

  // Input (or path prompt) on the last inner line.
  let input_area = Rect {
    x:      inner.x,
    y:      inner.y + inner.height - 1,
    width:  inner.width,
    height: 1,
  };
  inner.height -= 1;

  let (text, style) = match app.prompt {
    Some(prompt) => (
      format!("{}: {}_", prompt.label(), app.prompt_buffer),
      Style::default().fg(Color::Yellow),
    ),
    None if focused => (format!("> {}_", app.input), Style::default().fg(Color::White)),
    None => (format!("> {}", app.input), Style::default().fg(Color::DarkGray)),
  };
  f.render_widget(Paragraph::new(text).style(style), input_area);

  if app.identifiers.is_empty() {
    f.render_widget(
      Paragraph::new(Line::from("Digite um CPF e tecle Enter."))
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let items: Vec<ListItem> = app.identifiers.iter().map(ListItem::new).collect();

  let mut state = ListState::default();
  state.select(Some(app.id_cursor));

  let highlight = if focused {
    Style::default()
      .bg(Color::Blue)
      .fg(Color::White)
      .add_modifier(Modifier::BOLD)
  } else {
    Style::default().add_modifier(Modifier::BOLD)
  };

  f.render_stateful_widget(
    List::new(items).highlight_style(highlight).highlight_symbol(""),
    inner,
    &mut state,
  );
}
