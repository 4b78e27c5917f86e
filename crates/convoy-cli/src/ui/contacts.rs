//! Emergency contact directory tab.

use convoy_core::contact;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::app::App;

pub fn draw<K, D>(f: &mut Frame, area: Rect, app: &App<K, D>) {
  let block = Block::default()
    .title(" Contacts ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Gray));

  let items: Vec<ListItem> = contact::contacts()
    .iter()
    .map(|c| {
      ListItem::new(Line::from(vec![
        Span::styled(
          format!("{:<22}", c.name),
          Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{:<18}", c.phone_number), Style::default().fg(Color::Green)),
        Span::styled(c.role, Style::default().fg(Color::DarkGray)),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.contact_cursor));

  f.render_stateful_widget(
    List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("☎ "),
    area,
    &mut state,
  );
}
