//! Obstacle detail pane, right panel.

use chrono::Local;
use convoy_core::obstacle::Obstacle;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{App, Screen};

/// Render `obstacle` into `area`.
pub fn draw<K, D>(f: &mut Frame, area: Rect, app: &App<K, D>, obstacle: &Obstacle) {
  let focused = app.screen == Screen::Detail;
  let block = Block::default()
    .title(format!(" {} ", obstacle.title))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }));

  let inner = block.inner(area);
  f.render_widget(block, area);

  let created = obstacle
    .creation_timestamp
    .with_timezone(&Local)
    .format("%d/%m/%Y %H:%M:%S")
    .to_string();
  let location = match obstacle.coordinates() {
    Some(c) => c.to_string(),
    None => "(not set)".into(),
  };
  let photo = obstacle.photo.as_deref().unwrap_or("(none)");

  let mut lines = vec![
    field("created", created),
    field("location", location),
    field("photo", photo.to_owned()),
    field("id", obstacle.id.clone()),
    Line::from(""),
  ];
  lines.extend(obstacle.description.lines().map(|l| Line::from(l.to_owned())));

  let para = Paragraph::new(lines)
    .wrap(Wrap { trim: false })
    .scroll((app.detail_scroll as u16, 0));
  f.render_widget(para, inner);
}

fn field(label: &'static str, value: String) -> Line<'static> {
  Line::from(vec![
    Span::styled(
      format!("{label:<10}"),
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::raw(value),
  ])
}
