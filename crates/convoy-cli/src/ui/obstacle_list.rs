//! Obstacle list pane, left panel.

use chrono::Local;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, Screen};

/// Render the obstacle list into `area`.
pub fn draw<K, D>(f: &mut Frame, area: Rect, app: &App<K, D>) {
  let filtered = app.filtered_obstacles();
  let total = app.obstacles.len();

  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" Obstacles ({}/{}) ", filtered.len(), total)
  } else {
    format!(" Obstacles ({total}) ")
  };

  // Dim the border when focus is on the detail pane.
  let border = if app.screen == Screen::Detail { Color::DarkGray } else { Color::Gray };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let items: Vec<ListItem> = filtered
    .iter()
    .map(|o| {
      let date = o
        .creation_timestamp
        .with_timezone(&Local)
        .format("%d/%m")
        .to_string();
      let marker = if o.coordinates().is_some() { "◉ " } else { "  " };
      ListItem::new(Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Green)),
        Span::styled(format!("{date} "), Style::default().fg(Color::DarkGray)),
        Span::raw(o.title.clone()),
      ]))
    })
    .collect();

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // Filter bar on the last inner row.
  if (app.filter_active || !app.filter.is_empty()) && inner_area.height > 2 {
    let filter_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height -= 1;

    let filter_text = if app.filter_active {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  if filtered.is_empty() && !app.filter.is_empty() {
    f.render_widget(
      Paragraph::new("No match.").style(Style::default().fg(Color::DarkGray)),
      inner_area,
    );
    return;
  }

  let mut state = ListState::default();
  state.select((!filtered.is_empty()).then_some(app.list_cursor));

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}
