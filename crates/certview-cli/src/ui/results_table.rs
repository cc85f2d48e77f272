//! Results pane (right): the sorted, paginated record table.
//!
//! Each person is one table row; certification columns stack one line per
//! certification inside it.

use certview_core::{
  columns::Column,
  record::{PersonRecord, Tier, TierRules},
  sort::SortDirection,
  table::TableView,
};
use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Text},
  widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use crate::app::{App, Focus};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the results pane into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(" Resultados ")
    .borders(Borders::ALL)
    .border_style(super::border_style(app.focus == Focus::Table && app.prompt.is_none()));

  let inner = block.inner(area);
  f.render_widget(block, area);

  let parts = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Min(0), Constraint::Length(1)])
    .split(inner);

  if app.orchestrator.is_loading() {
    let frame = SPINNER[(app.tick / 2) % SPINNER.len()];
    draw_message(f, parts[0], &format!("{frame} Carregando…"), Color::Yellow);
  } else if app.orchestrator.ingest_error() {
    draw_message(f, parts[0], "Arquivo inválido", Color::Red);
  } else if app.orchestrator.lookup_error() {
    draw_message(f, parts[0], "CPF inválido", Color::Red);
  } else if app.table.records().is_empty() {
    draw_message(f, parts[0], "Nenhum resultado.", Color::DarkGray);
  } else {
    draw_table(f, parts[0], app);
  }

  f.render_widget(
    Paragraph::new(pager_label(&app.table))
      .alignment(Alignment::Right)
      .style(Style::default().fg(Color::Gray)),
    parts[1],
  );
}

fn draw_message(f: &mut Frame, area: Rect, text: &str, color: Color) {
  f.render_widget(
    Paragraph::new(text.to_string())
      .alignment(Alignment::Center)
      .style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
    area,
  );
}

// ─── Table ────────────────────────────────────────────────────────────────────

fn draw_table(f: &mut Frame, area: Rect, app: &App) {
  let sort = app.table.sort();
  let table_focused = app.focus == Focus::Table && app.prompt.is_none();

  let header = Row::new(app.columns.iter().enumerate().map(|(i, column)| {
    let mut label = column.label().to_string();
    if column.sort_key() == sort.key {
      label.push_str(match sort.direction {
        SortDirection::Ascending => " ▲",
        SortDirection::Descending => " ▼",
      });
    }
    let mut style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    if table_focused && i == app.column_cursor {
      style = style.add_modifier(Modifier::REVERSED);
    }
    Cell::from(label).style(style)
  }))
  .bottom_margin(1);

  let page = app.visible_page();
  let rows: Vec<Row> = page
    .iter()
    .map(|record| {
      let cells: Vec<Cell> = app
        .columns
        .iter()
        .map(|column| Cell::from(Text::from(cell_lines(record, column, &app.tiers))))
        .collect();
      Row::new(cells)
        .height(record.certifications.len().max(1) as u16)
        .bottom_margin(1)
    })
    .collect();

  let widths: Vec<Constraint> = app.columns.iter().map(column_width).collect();

  let highlight = if table_focused {
    Style::default().bg(Color::Blue).add_modifier(Modifier::BOLD)
  } else {
    Style::default()
  };

  let mut state = TableState::default().with_selected(Some(app.row_cursor));
  f.render_stateful_widget(
    Table::new(rows, widths)
      .header(header)
      .column_spacing(2)
      .row_highlight_style(highlight),
    area,
    &mut state,
  );
}

fn column_width(column: Column) -> Constraint {
  match column {
    Column::TaxId => Constraint::Length(14),
    Column::Name | Column::Email => Constraint::Fill(2),
    Column::Certification => Constraint::Fill(1),
    Column::Phone => Constraint::Length(16),
    Column::FirstCertification | Column::LastUpdate | Column::DueDate => Constraint::Length(12),
    Column::Status => Constraint::Length(9),
  }
}

/// Lines shown in one cell of a person's row.
fn cell_lines(record: &PersonRecord, column: Column, tiers: &TierRules) -> Vec<Line<'static>> {
  let person = |value: Option<&str>| vec![Line::from(value.unwrap_or_default().to_string())];

  match column {
    Column::TaxId => person(Some(&record.tax_id)),
    Column::Name => person(Some(&record.name)),
    Column::Phone => person(record.phone.as_deref()),
    Column::Email => person(record.email.as_deref()),
    Column::Certification if record.certifications.is_empty() => vec![Line::styled(
      record.note.clone().unwrap_or_default(),
      Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )],
    Column::Certification => record
      .certifications
      .iter()
      .map(|c| Line::styled(c.name.clone(), tier_style(tiers.classify(&c.name))))
      .collect(),
    Column::FirstCertification => record
      .certifications
      .iter()
      .map(|c| Line::from(c.first_certification_date.clone()))
      .collect(),
    Column::LastUpdate => record
      .certifications
      .iter()
      .map(|c| Line::from(c.last_update_date.clone()))
      .collect(),
    Column::DueDate => record
      .certifications
      .iter()
      .map(|c| Line::from(c.due_date.clone()))
      .collect(),
    Column::Status => record
      .certifications
      .iter()
      .map(|c| {
        let status = c.status();
        let color = if status.is_active() { Color::Green } else { Color::Red };
        Line::styled(status.as_str(), Style::default().fg(color))
      })
      .collect(),
  }
}

fn tier_style(tier: Tier) -> Style {
  match tier {
    Tier::Primary => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    Tier::Secondary => Style::default().fg(Color::Cyan),
    Tier::Other => Style::default(),
  }
}

// ─── Pager ────────────────────────────────────────────────────────────────────

/// `Mostrar por página: 5  1–5 de 13`.
fn pager_label(table: &TableView<PersonRecord>) -> String {
  let (from, to, total) = table.page_range();
  format!("Mostrar por página: {}  {from}–{to} de {total} ", table.page_size())
}

#[cfg(test)]
mod tests {
  use certview_core::record::Certification;

  use super::*;

  fn cert(name: &str, status: &str) -> Certification {
    Certification {
      name:                     name.into(),
      first_certification_date: "11/11/2011".into(),
      last_update_date:         "29/12/2023".into(),
      due_date:                 "01/01/2025".into(),
      status:                   status.into(),
    }
  }

  fn text(lines: &[Line]) -> Vec<String> { lines.iter().map(|l| l.to_string()).collect() }

  #[test]
  fn certification_columns_stack_one_line_each() {
    let mut record = PersonRecord::new("111", "Ana");
    record.certifications = vec![cert("CPA-20", "Ativa"), cert("CEA", "Vencida")];
    let tiers = TierRules::default();

    assert_eq!(text(&cell_lines(&record, Column::Name, &tiers)), ["Ana"]);
    assert_eq!(text(&cell_lines(&record, Column::Certification, &tiers)), ["CPA-20", "CEA"]);
    assert_eq!(text(&cell_lines(&record, Column::Status, &tiers)), ["active", "inactive"]);

    let lines = cell_lines(&record, Column::Certification, &tiers);
    assert_eq!(lines[0].style.fg, Some(Color::Green));
    assert_eq!(lines[1].style.fg, None);
  }

  #[test]
  fn note_fills_certification_cell_when_there_are_none() {
    let record = PersonRecord { note: Some("Pendente".into()), ..PersonRecord::new("111", "Ana") };
    let tiers = TierRules::default();
    assert_eq!(text(&cell_lines(&record, Column::Certification, &tiers)), ["Pendente"]);
    assert!(cell_lines(&record, Column::DueDate, &tiers).is_empty());
    assert_eq!(text(&cell_lines(&record, Column::Phone, &tiers)), [""]);
  }

  #[test]
  fn pager_reports_visible_range() {
    let mut table = TableView::new();
    table.set_records((0..13).map(|i| PersonRecord::new(format!("{i}"), "X")).collect());
    assert_eq!(pager_label(&table), "Mostrar por página: 5  1–5 de 13 ");
    table.set_page(2);
    assert_eq!(pager_label(&table), "Mostrar por página: 5  11–13 de 13 ");
    table.clear();
    assert_eq!(pager_label(&table), "Mostrar por página: 5  0–0 de 0 ");
  }
}
