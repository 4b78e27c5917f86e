//! TUI rendering: header with tabs, body panes, status bar.

pub mod contacts;
pub mod obstacle_detail;
pub mod obstacle_list;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, Pending, Screen, Tab};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<K, D>(f: &mut Frame, app: &App<K, D>) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  match app.tab {
    Tab::Obstacles => draw_obstacles(f, rows[1], app),
    Tab::Contacts => contacts::draw(f, rows[1], app),
  }
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header<K, D>(f: &mut Frame, area: Rect, app: &App<K, D>) {
  let date = Local::now().format("%d/%m/%Y").to_string();

  let tab_style = |tab: Tab| {
    if app.tab == tab {
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::White)
    }
  };

  let left = vec![
    Span::styled(
      " convoy ",
      Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(" Obstacles ", tab_style(Tab::Obstacles)),
    Span::raw(" "),
    Span::styled(" Contacts ", tab_style(Tab::Contacts)),
  ];
  let right = Span::styled(format!("{date} "), Style::default().fg(Color::Gray));

  let left_width: usize = left.iter().map(|s| s.content.chars().count()).sum();
  let pad = (area.width as usize)
    .saturating_sub(left_width)
    .saturating_sub(right.content.chars().count());

  let mut spans = left;
  spans.push(Span::raw(" ".repeat(pad)));
  spans.push(right);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_obstacles<K, D>(f: &mut Frame, area: Rect, app: &App<K, D>) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
    .split(area);

  obstacle_list::draw(f, cols[0], app);

  match app.selected_obstacle().or_else(|| app.cursor_obstacle()) {
    Some(obstacle) => obstacle_detail::draw(f, cols[1], app, obstacle),
    None => draw_empty_detail(f, cols[1]),
  }
}

fn draw_empty_detail(f: &mut Frame, area: Rect) {
  let block = Block::default()
    .title(" Detail ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new(vec![
      Line::from(Span::styled(
        "No obstacles recorded yet.",
        Style::default().fg(Color::DarkGray),
      )),
      Line::from(Span::styled(
        "Add one with `convoy add`, or press s for sample data.",
        Style::default().fg(Color::DarkGray),
      )),
    ]),
    inner,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<K, D>(f: &mut Frame, area: Rect, app: &App<K, D>) {
  let prompt;
  let (mode_label, hints) = match (&app.pending, app.tab, app.screen) {
    (Some(pending), ..) => {
      prompt = match pending {
        Pending::Delete { title, .. } => format!("Remove \"{title}\"? [y/N]"),
        Pending::Call { contact_id } => {
          let name = convoy_core::contact::find(contact_id)
            .map(|c| c.name)
            .unwrap_or("?");
          format!("Call {name}? [y/N]")
        }
      };
      ("CONFIRM", prompt.as_str())
    }
    (None, Tab::Obstacles, Screen::List) if app.filter_active => {
      ("SEARCH", "Type to filter  Esc cancel  Enter select")
    }
    (None, Tab::Obstacles, Screen::List) => (
      "NORMAL",
      "↑↓/jk navigate  / search  Enter detail  d delete  s samples  r reload  Tab contacts  q quit",
    ),
    (None, Tab::Obstacles, Screen::Detail) => (
      "DETAIL",
      "↑↓/jk scroll  Esc back  [ prev  ] next  d delete  q quit",
    ),
    (None, Tab::Contacts, _) => (
      "CONTACTS",
      "↑↓/jk navigate  Enter/c call  Tab obstacles  q quit",
    ),
  };

  let status = if app.pending.is_none() && !app.status_msg.is_empty() {
    app.status_msg.as_str()
  } else {
    hints
  };

  let mode_bg = if app.pending.is_some() { Color::Yellow } else { Color::Cyan };
  let line = Line::from(vec![
    Span::styled(
      format!(" {mode_label} "),
      Style::default()
        .fg(Color::Black)
        .bg(mode_bg)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!("  {status}"), Style::default().fg(Color::Gray)),
  ]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
