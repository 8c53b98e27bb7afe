use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Margin, Position, Rect};

use crate::app::App;
use crate::focus::{FocusTarget, Key, KeyDisposition};

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// Map a terminal key to what the focus navigator understands.
/// Chords with Ctrl or Alt never reach it.
pub fn nav_key(key: &KeyEvent) -> Key {
  if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
    return Key::Other;
  }
  match key.code {
    KeyCode::Char(c) => Key::Char(c),
    KeyCode::Enter => Key::Enter,
    KeyCode::Esc => Key::Escape,
    KeyCode::Up => Key::Up,
    KeyCode::Down => Key::Down,
    _ => Key::Other,
  }
}

/// Row of the results list under `(column, row)`, given the list's bordered area.
pub fn row_at(area: Rect, column: u16, row: u16) -> Option<usize> {
  let inner = area.inner(Margin { horizontal: 1, vertical: 1 });
  inner.contains(Position { x: column, y: row }).then(|| (row - inner.y) as usize)
}

// --- Event Handling ---

pub fn handle_key_event(app: &mut App, key: KeyEvent) {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return;
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
    app.next_theme();
    return;
  }

  if key.modifiers.contains(KeyModifiers::ALT) {
    match key.code {
      KeyCode::Left => {
        app.controller.navigate_back();
        return;
      }
      KeyCode::Right => {
        app.controller.navigate_forward();
        return;
      }
      _ => {}
    }
  }

  if key.code == KeyCode::Tab || key.code == KeyCode::BackTab {
    match app.controller.focus() {
      FocusTarget::SearchField => app.controller.blur(),
      _ => app.controller.focus_search_field(),
    }
    return;
  }

  if app.controller.handle_key(nav_key(&key)) == KeyDisposition::Consumed {
    return;
  }

  match app.controller.focus() {
    FocusTarget::SearchField => handle_search_field_key(app, key),
    FocusTarget::Nothing | FocusTarget::Row(_) => {
      if key.code == KeyCode::Char('q') {
        app.should_quit = true;
      }
    }
  }
}

fn handle_search_field_key(app: &mut App, key: KeyEvent) {
  app.clear_error();
  match key.code {
    KeyCode::Enter => {
      app.trigger_search();
    }
    KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
      let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
      app.input.insert(byte_idx, c);
      app.cursor_position += 1;
    }
    KeyCode::Backspace => {
      if app.cursor_position > 0 {
        app.cursor_position -= 1;
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
      }
    }
    KeyCode::Delete => {
      if app.cursor_position < app.input.chars().count() {
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
      }
    }
    KeyCode::Left => {
      app.cursor_position = app.cursor_position.saturating_sub(1);
    }
    KeyCode::Right => {
      if app.cursor_position < app.input.chars().count() {
        app.cursor_position += 1;
      }
    }
    KeyCode::Home => {
      app.cursor_position = 0;
    }
    KeyCode::End => {
      app.cursor_position = app.input.chars().count();
    }
    _ => {}
  }
}

pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
  if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
    return;
  }
  if let Some(area) = app.results_area
    && let Some(row) = row_at(area, mouse.column, mouse.row)
  {
    app.controller.click_row(row);
    return;
  }
  if let Some(area) = app.input_area
    && area.contains(Position { x: mouse.column, y: mouse.row })
  {
    app.controller.focus_search_field();
    return;
  }
  app.controller.blur();
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Config;
  use crate::location::MemoryHistory;
  use crate::player::PlayerBackend;
  use crate::testing::{FakeProvider, videos};
  use std::sync::Arc;
  use url::Url;

  fn app(provider: Arc<FakeProvider>) -> App {
    let location = MemoryHistory::new(Url::parse("http://localhost:3000/").unwrap());
    App::new(provider, location, PlayerBackend::None, Config::default())
  }

  fn press(app: &mut App, code: KeyCode) {
    handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
  }

  fn type_str(app: &mut App, s: &str) {
    for c in s.chars() {
      press(app, KeyCode::Char(c));
    }
  }

  // --- char_to_byte_index ---

  #[test]
  fn char_to_byte_ascii() {
    assert_eq!(char_to_byte_index("hello", 0), 0);
    assert_eq!(char_to_byte_index("hello", 3), 3);
    assert_eq!(char_to_byte_index("hello", 5), 5); // past end
  }

  #[test]
  fn char_to_byte_multibyte() {
    let s = "aé日"; // a=1 byte, é=2 bytes, 日=3 bytes
    assert_eq!(char_to_byte_index(s, 0), 0);
    assert_eq!(char_to_byte_index(s, 1), 1);
    assert_eq!(char_to_byte_index(s, 2), 3);
    assert_eq!(char_to_byte_index(s, 3), 6);
  }

  // --- nav_key ---

  #[test]
  fn nav_key_ignores_chords() {
    assert_eq!(nav_key(&KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE)), Key::Char('j'));
    assert_eq!(nav_key(&KeyEvent::new(KeyCode::Char('J'), KeyModifiers::SHIFT)), Key::Char('J'));
    assert_eq!(nav_key(&KeyEvent::new(KeyCode::Char('j'), KeyModifiers::CONTROL)), Key::Other);
    assert_eq!(nav_key(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)), Key::Escape);
    assert_eq!(nav_key(&KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)), Key::Other);
  }

  // --- row_at ---

  #[test]
  fn row_at_skips_borders() {
    let area = Rect { x: 0, y: 2, width: 40, height: 7 };
    assert_eq!(row_at(area, 5, 2), None);
    assert_eq!(row_at(area, 5, 3), Some(0));
    assert_eq!(row_at(area, 5, 7), Some(4));
    assert_eq!(row_at(area, 5, 8), None);
    assert_eq!(row_at(area, 0, 4), None);
  }

  // --- key handling ---

  #[tokio::test]
  async fn typing_slash_j_k_goes_into_search_field() {
    let mut app = app(Arc::new(FakeProvider::default()));
    type_str(&mut app, "a/jk");
    assert_eq!(app.input, "a/jk");
    assert_eq!(app.cursor_position, 4);
    press(&mut app, KeyCode::Backspace);
    assert_eq!(app.input, "a/j");
  }

  #[tokio::test]
  async fn enter_submits_and_keys_navigate_results() {
    let provider = Arc::new(FakeProvider::default());
    provider.respond("lofi", videos(&["a", "b", "c"]));
    let mut app = app(provider);

    type_str(&mut app, "lofi");
    press(&mut app, KeyCode::Enter);
    app.controller.next_search_outcome().await.unwrap();

    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Char('k'));
    assert_eq!(app.snapshot().focused_index, Some(2));
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.snapshot().selected_id.as_deref(), Some("c"));

    press(&mut app, KeyCode::Char('/'));
    assert_eq!(app.controller.focus(), FocusTarget::SearchField);
    assert_eq!(app.input, "lofi");

    press(&mut app, KeyCode::Esc);
    assert_eq!(app.snapshot().selected_id, None);
    assert!(!app.should_quit);
  }

  #[tokio::test]
  async fn q_quits_only_outside_search_field() {
    let mut app = app(Arc::new(FakeProvider::default()));
    press(&mut app, KeyCode::Char('q'));
    assert!(!app.should_quit);
    assert_eq!(app.input, "q");

    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Char('q'));
    assert!(app.should_quit);
  }
}
