//! Application state machine and event dispatcher.

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use convoy_core::{
  contact::{self, Contact},
  obstacle::Obstacle,
  provider::Dialer,
  sample::sample_obstacles,
  store::{KeyValueStore, ObstacleStore},
};
use tracing::warn;

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
  Obstacles,
  Contacts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the obstacle list; right pane shows the selection, if any.
  List,
  /// Focus on the obstacle detail pane.
  Detail,
}

/// An action waiting for a `y`/`n` answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
  Delete { id: String, title: String },
  Call { contact_id: &'static str },
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<K, D> {
  pub tab: Tab,

  /// Keyboard focus within the Obstacles tab.
  pub screen: Screen,

  /// Every stored obstacle, refreshed after each mutation.
  pub obstacles: Vec<Obstacle>,

  /// Current fuzzy-filter string (only active when `filter_active`).
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// Cursor position within the *filtered* obstacle list.
  pub list_cursor: usize,

  /// Cursor position within the contact directory.
  pub contact_cursor: usize,

  /// Scroll offset within the detail pane.
  pub detail_scroll: usize,

  /// Id of the obstacle shown in the detail pane.
  pub selected_id: Option<String>,

  /// Confirmation prompt shown in the status bar.
  pub pending: Option<Pending>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  pub store: ObstacleStore<K>,

  pub dialer: D,
}

impl<K, D> App<K, D> {
  /// Create an [`App`] with an empty obstacle list.
  pub fn new(store: ObstacleStore<K>, dialer: D) -> Self {
    Self {
      tab: Tab::Obstacles,
      screen: Screen::List,
      obstacles: Vec::new(),
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      contact_cursor: 0,
      detail_scroll: 0,
      selected_id: None,
      pending: None,
      status_msg: String::new(),
      store,
      dialer,
    }
  }

  // ── Filtered list ─────────────────────────────────────────────────────────

  /// Returns obstacles whose title or description match the filter query.
  pub fn filtered_obstacles(&self) -> Vec<&Obstacle> {
    if self.filter.is_empty() {
      return self.obstacles.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .obstacles
      .iter()
      .filter(|o| {
        matcher.fuzzy_match(&o.title, &self.filter).is_some()
          || matcher.fuzzy_match(&o.description, &self.filter).is_some()
      })
      .collect()
  }

  /// The obstacle under the list cursor in the filtered view, if any.
  pub fn cursor_obstacle(&self) -> Option<&Obstacle> {
    self.filtered_obstacles().get(self.list_cursor).copied()
  }

  /// The obstacle shown in the detail pane.
  pub fn selected_obstacle(&self) -> Option<&Obstacle> {
    let id = self.selected_id.as_deref()?;
    self.obstacles.iter().find(|o| o.id == id)
  }

  pub fn cursor_contact(&self) -> Option<&'static Contact> {
    contact::contacts().get(self.contact_cursor)
  }
}

impl<K: KeyValueStore, D: Dialer> App<K, D> {
  // ── Data loading ──────────────────────────────────────────────────────────

  /// Re-read the obstacle collection. Unreadable storage shows as empty.
  pub async fn load_obstacles(&mut self) {
    self.obstacles = self.store.list().await;
    let len = self.filtered_obstacles().len();
    if self.list_cursor >= len {
      self.list_cursor = len.saturating_sub(1);
    }
    if self.selected_obstacle().is_none() {
      self.selected_id = None;
      self.screen = Screen::List;
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    if let Some(pending) = self.pending.take() {
      self.answer(pending, key).await;
      return true;
    }

    // Filter input mode: all printable keys go into the filter string.
    if self.filter_active {
      self.handle_filter_key(key);
      return true;
    }

    if key.code == KeyCode::Tab {
      self.tab = match self.tab {
        Tab::Obstacles => Tab::Contacts,
        Tab::Contacts => Tab::Obstacles,
      };
      self.status_msg.clear();
      return true;
    }

    match (self.tab, self.screen) {
      (Tab::Contacts, _) => self.handle_contacts_key(key),
      (Tab::Obstacles, Screen::List) => self.handle_list_key(key).await,
      (Tab::Obstacles, Screen::Detail) => self.handle_detail_key(key),
    }
  }

  async fn answer(&mut self, pending: Pending, key: KeyEvent) {
    if !matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
      self.status_msg = "Cancelled.".into();
      return;
    }

    match pending {
      Pending::Delete { id, title } => match self.store.remove(&id).await {
        Ok(()) => {
          self.load_obstacles().await;
          self.status_msg = format!("Removed \"{title}\".");
        }
        Err(e) => {
          warn!(error = %e, %id, "remove failed");
          self.status_msg = format!("Error: could not remove \"{title}\": {e}");
        }
      },
      Pending::Call { contact_id } => {
        let Some(c) = contact::find(contact_id) else { return };
        self.status_msg = match self.dialer.place_call(c.phone_number) {
          Ok(()) => format!("Calling {} ({})…", c.name, c.phone_number),
          Err(e) => format!("Error: {e}"),
        };
      }
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Enter => {
        self.filter_active = false;
        self.list_cursor = 0;
        // Immediately open detail if there's exactly one match.
        let only = match self.filtered_obstacles().as_slice() {
          [o] => Some(o.id.clone()),
          _ => None,
        };
        if let Some(id) = only {
          self.open_detail(id);
        }
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.list_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.list_cursor = 0;
      }
      _ => {}
    }
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      // Quit
      KeyCode::Char('q') => return false,

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.filtered_obstacles().len();
        if len > 0 && self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      // Open detail
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(id) = self.cursor_obstacle().map(|o| o.id.clone()) {
          self.open_detail(id);
        }
      }

      // Filter
      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.list_cursor = 0;
      }

      KeyCode::Char('d') | KeyCode::Delete => {
        if let Some(o) = self.cursor_obstacle() {
          self.pending = Some(Pending::Delete { id: o.id.clone(), title: o.title.clone() });
        }
      }

      KeyCode::Char('r') => {
        self.load_obstacles().await;
        self.status_msg = format!("{} obstacles.", self.obstacles.len());
      }

      KeyCode::Char('s') => {
        self.status_msg = match self.store.add_all(sample_obstacles(Utc::now())).await {
          Ok(()) => "Sample obstacles added.".into(),
          Err(e) => format!("Error: could not add sample obstacles: {e}"),
        };
        self.load_obstacles().await;
      }

      _ => {}
    }
    true
  }

  fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      // Quit
      KeyCode::Char('q') => return false,

      // Back to list
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.screen = Screen::List;
        self.selected_id = None;
      }

      // Scroll detail
      KeyCode::Down | KeyCode::Char('j') => {
        self.detail_scroll += 1;
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
      }

      // Navigate list from detail (for quick switching)
      KeyCode::Char(']') | KeyCode::PageDown => {
        let len = self.filtered_obstacles().len();
        if len > 0 && self.list_cursor + 1 < len {
          self.list_cursor += 1;
          if let Some(id) = self.cursor_obstacle().map(|o| o.id.clone()) {
            self.open_detail(id);
          }
        }
      }
      KeyCode::Char('[') | KeyCode::PageUp => {
        if self.list_cursor > 0 {
          self.list_cursor -= 1;
          if let Some(id) = self.cursor_obstacle().map(|o| o.id.clone()) {
            self.open_detail(id);
          }
        }
      }

      KeyCode::Char('d') | KeyCode::Delete => {
        if let Some(o) = self.selected_obstacle() {
          self.pending = Some(Pending::Delete { id: o.id.clone(), title: o.title.clone() });
        }
      }

      _ => {}
    }
    true
  }

  fn handle_contacts_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Down | KeyCode::Char('j') => {
        if self.contact_cursor + 1 < contact::contacts().len() {
          self.contact_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.contact_cursor = self.contact_cursor.saturating_sub(1);
      }
      KeyCode::Enter | KeyCode::Char('c') => {
        if let Some(c) = self.cursor_contact() {
          self.pending = Some(Pending::Call { contact_id: c.id });
        }
      }
      _ => {}
    }
    true
  }

  /// Transition to `Detail` for the obstacle `id`.
  fn open_detail(&mut self, id: String) {
    self.selected_id = Some(id);
    self.detail_scroll = 0;
    self.screen = Screen::Detail;
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use convoy_core::store::MemoryStore;

  use super::*;

  #[derive(Default)]
  struct RecordingDialer {
    calls: Mutex<Vec<String>>,
  }

  impl Dialer for RecordingDialer {
    fn place_call(&self, phone_number: &str) -> convoy_core::Result<()> {
      self.calls.lock().unwrap().push(phone_number.to_owned());
      Ok(())
    }
  }

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  async fn app_with_samples() -> App<MemoryStore, RecordingDialer> {
    let store = ObstacleStore::new(MemoryStore::new());
    store.add_all(sample_obstacles(Utc::now())).await.unwrap();
    let mut app = App::new(store, RecordingDialer::default());
    app.load_obstacles().await;
    app
  }

  async fn press(app: &mut App<MemoryStore, RecordingDialer>, codes: &[KeyCode]) -> bool {
    let mut running = true;
    for &code in codes {
      running = app.handle_key(key(code)).await;
    }
    running
  }

  #[tokio::test]
  async fn delete_requires_confirmation() {
    let mut app = app_with_samples().await;

    press(&mut app, &[KeyCode::Down, KeyCode::Char('d')]).await;
    assert!(matches!(&app.pending, Some(Pending::Delete { id, .. }) if id == "sample-2"));

    press(&mut app, &[KeyCode::Char('n')]).await;
    assert_eq!(app.obstacles.len(), 3);
    assert_eq!(app.status_msg, "Cancelled.");

    press(&mut app, &[KeyCode::Char('d'), KeyCode::Char('y')]).await;
    let ids: Vec<_> = app.obstacles.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, ["sample-1", "sample-3"]);
    assert_eq!(app.store.list().await.len(), 2);
  }

  #[tokio::test]
  async fn deleting_the_last_row_moves_cursor_up() {
    let mut app = app_with_samples().await;
    press(&mut app, &[KeyCode::Down, KeyCode::Down]).await;
    assert_eq!(app.list_cursor, 2);

    press(&mut app, &[KeyCode::Char('d'), KeyCode::Char('y')]).await;
    assert_eq!(app.list_cursor, 1);
  }

  #[tokio::test]
  async fn filter_with_single_match_opens_detail() {
    let mut app = app_with_samples().await;
    press(
      &mut app,
      &[KeyCode::Char('/'), KeyCode::Char('S'), KeyCode::Char('N'), KeyCode::Char('C'), KeyCode::Char('F'), KeyCode::Enter],
    )
    .await;

    assert_eq!(app.screen, Screen::Detail);
    assert_eq!(app.selected_obstacle().map(|o| o.id.as_str()), Some("sample-2"));

    press(&mut app, &[KeyCode::Esc]).await;
    assert_eq!(app.screen, Screen::List);
    assert!(app.selected_id.is_none());
  }

  #[tokio::test]
  async fn contacts_tab_calls_after_confirmation() {
    let mut app = app_with_samples().await;
    press(&mut app, &[KeyCode::Tab, KeyCode::Down, KeyCode::Down, KeyCode::Enter]).await;
    assert_eq!(app.pending, Some(Pending::Call { contact_id: "3" }));
    assert!(app.dialer.calls.lock().unwrap().is_empty());

    press(&mut app, &[KeyCode::Char('y')]).await;
    assert_eq!(*app.dialer.calls.lock().unwrap(), ["18"]);
    assert!(app.status_msg.contains("Pompiers"));
  }

  #[tokio::test]
  async fn seed_key_appends_samples() {
    let store = ObstacleStore::new(MemoryStore::new());
    let mut app = App::new(store, RecordingDialer::default());
    app.load_obstacles().await;
    assert!(app.obstacles.is_empty());

    press(&mut app, &[KeyCode::Char('s')]).await;
    assert_eq!(app.obstacles.len(), 3);
  }

  #[tokio::test]
  async fn q_quits_and_ctrl_c_quits_while_filtering() {
    let mut app = app_with_samples().await;
    assert!(!press(&mut app, &[KeyCode::Char('q')]).await);

    let mut app = app_with_samples().await;
    press(&mut app, &[KeyCode::Char('/')]).await;
    assert!(!app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)).await);
  }
}
