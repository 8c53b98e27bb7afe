use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, List, ListItem, Padding, Paragraph},
};

use crate::app::App;
use crate::constants::constants;
use crate::controller::Snapshot;
use crate::focus::FocusTarget;
use crate::playback::embed_url;
use crate::search::SearchStatus;
use crate::theme::Theme;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

fn rounded(theme: &Theme) -> Block<'static> {
  Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(theme.border))
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();
  let snap = app.snapshot();
  app.results_area = None;
  app.input_area = None;

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let rows = constants().num_videos as u16;
  let [header_area, input_area, results_area, player_area, status_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(rows + 2),
    Constraint::Min(3),
    Constraint::Length(1),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, theme, &snap, header_area);
  render_input(frame, app, &snap, input_area);
  render_results(frame, app, &snap, results_area);
  render_player(frame, app, &snap, player_area);
  render_status(frame, app, &snap, status_area);
  render_footer(frame, theme, &snap, footer_area);
}

fn render_header(frame: &mut Frame, theme: &Theme, snap: &Snapshot, area: Rect) {
  let name = " ▶ watchit ";
  let left = Line::from(Span::styled(name, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));
  frame.render_widget(left, area);

  let room = (area.width as usize).saturating_sub(name.chars().count() + 2);
  let address = format!("{} ", truncate_str(&snap.address, room));
  let width = (address.chars().count() as u16).min(area.width);
  let right = Line::from(Span::styled(address, Style::default().fg(theme.muted)));
  let right_area = Rect { x: area.x + area.width.saturating_sub(width), width, ..area };
  frame.render_widget(right, right_area);
}

fn render_input(frame: &mut Frame, app: &mut App, snap: &Snapshot, area: Rect) {
  let theme = app.theme();
  let focused = snap.focus == FocusTarget::SearchField;
  let border_color = if focused { theme.accent } else { theme.border };
  let input_block = rounded(theme)
    .title(" Search for a video... ")
    .title_style(Style::default().fg(border_color))
    .border_style(Style::default().fg(border_color))
    .padding(Padding::horizontal(1));

  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(&app.input, app.cursor_position);

  if cursor_col < app.input_scroll {
    app.input_scroll = cursor_col;
  } else if cursor_col >= app.input_scroll + inner_w {
    app.input_scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let visible: String = app
    .input
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= app.input_scroll)
    .take_while(|(start, _, _)| *start < app.input_scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(input_block);
  frame.render_widget(paragraph, area);
  app.input_area = Some(area);

  if focused {
    let cursor_x = area.x + 2 + cursor_col.saturating_sub(app.input_scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_results(frame: &mut Frame, app: &mut App, snap: &Snapshot, area: Rect) {
  let theme = app.theme();
  let block =
    rounded(theme).title(" Results ").title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));

  if snap.results.is_empty() {
    let hint = if snap.query.is_empty() { "Type a query and press Enter." } else { "No videos." };
    let paragraph =
      Paragraph::new(Span::styled(hint, Style::default().fg(theme.muted))).alignment(Alignment::Center).block(block);
    frame.render_widget(paragraph, area);
    return;
  }

  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;

  let items: Vec<ListItem> = snap
    .results
    .iter()
    .enumerate()
    .map(|(i, record)| {
      let playing = snap.selected_id.as_deref() == Some(record.id.as_str());
      let bg = if i % 2 == 1 { theme.stripe_bg } else { theme.bg };
      let marker = if playing { "♪ " } else { "  " };
      let title = truncate_str(&record.title, inner_w.saturating_sub(2));
      let fg = if playing { theme.playing } else { theme.fg };
      let line = Line::from(vec![
        Span::styled(marker, Style::default().fg(theme.playing)),
        Span::styled(title, Style::default().fg(fg)),
      ]);
      ListItem::new(line).bg(bg)
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  app.list_state.select(snap.focused_index);
  frame.render_stateful_widget(list, area, &mut app.list_state);
  app.results_area = Some(area);
}

fn render_player(frame: &mut Frame, app: &App, snap: &Snapshot, area: Rect) {
  let theme = app.theme();
  let title = Line::from(vec![
    Span::styled(" Now Playing ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    Span::styled(
      format!("[{}{}] ", app.player.backend.label(), if app.player.is_running() { " ▶" } else { "" }),
      Style::default().fg(theme.muted),
    ),
  ]);
  let block = rounded(theme).title(title).padding(Padding::horizontal(1));

  let Some(id) = snap.selected_id.as_deref() else {
    let paragraph = Paragraph::new(Span::styled("Nothing playing.", Style::default().fg(theme.muted)))
      .alignment(Alignment::Center)
      .block(block);
    frame.render_widget(paragraph, area);
    return;
  };

  let inner_w = area.width.saturating_sub(4) as usize;
  let heading = snap.selected_record().map_or_else(|| id.to_string(), |r| r.title.clone());
  let embed = embed_url(id).map(|u| u.to_string()).unwrap_or_else(|e| format!("{:#}", e));

  let mut lines = vec![
    Line::from(""),
    Line::from(Span::styled(
      truncate_str(&heading, inner_w),
      Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
    )),
    Line::from(""),
    Line::from(vec![
      Span::styled("Video     ", Style::default().fg(theme.muted)),
      Span::styled(id.to_string(), Style::default().fg(theme.fg)),
    ]),
  ];
  if let Some(record) = snap.selected_record() {
    lines.push(Line::from(vec![
      Span::styled("Thumbnail ", Style::default().fg(theme.muted)),
      Span::styled(truncate_str(&record.thumbnail_url, inner_w.saturating_sub(10)), Style::default().fg(theme.fg)),
    ]));
  }
  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(
    truncate_str(&embed, inner_w),
    Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED),
  )));

  frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status(frame: &mut Frame, app: &App, snap: &Snapshot, area: Rect) {
  let theme = app.theme();
  let (text, style) = match (&snap.status, &app.last_error) {
    (SearchStatus::Searching { .. }, _) => {
      (format!(" ⏳ Searching '{}'…", snap.query), Style::default().fg(theme.status))
    }
    (SearchStatus::Failed { message }, _) => (format!(" ⚠  {}", message), Style::default().fg(theme.error)),
    (SearchStatus::Idle, Some(err)) => (format!(" ⚠  {}", err), Style::default().fg(theme.error)),
    (SearchStatus::Idle, None) => match app.player.last_status() {
      Some(status) => (format!(" ♪ {}", status), Style::default().fg(theme.status)),
      None => (" Ready".to_string(), Style::default().fg(theme.muted)),
    },
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_footer(frame: &mut Frame, theme: &Theme, snap: &Snapshot, area: Rect) {
  let mut keys: Vec<(&str, &str)> = match snap.focus {
    FocusTarget::SearchField => vec![("Enter", "Search"), ("↓/↑", "Results"), ("Tab", "List")],
    FocusTarget::Nothing | FocusTarget::Row(_) => {
      vec![("j/k", "Navigate"), ("Enter", "Play"), ("/", "Search"), ("q", "Quit")]
    }
  };
  if snap.is_playing() {
    keys.push(("Esc", "Close"));
  }
  keys.push(("Alt ←/→", "History"));
  keys.push(("^t", "Theme"));

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let width = (theme_label.len() as u16).min(area.width);
  let right_area = Rect { x: area.x + area.width - width, width, ..area };
  frame.render_widget(right, right_area);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn truncate_keeps_short_strings() {
    assert_eq!(truncate_str("lofi", 10), "lofi");
  }

  #[test]
  fn truncate_adds_ellipsis() {
    assert_eq!(truncate_str("lofi hip hop radio", 8), "lofi hi…");
  }

  #[test]
  fn narrow_terminal_renders_without_panicking() {
    use crate::config::Config;
    use crate::location::MemoryHistory;
    use crate::player::PlayerBackend;
    use crate::testing::FakeProvider;
    use ratatui::{Terminal, backend::TestBackend};
    use std::sync::Arc;
    use url::Url;

    let location = MemoryHistory::new(Url::parse("http://localhost:3000/?play=abc").unwrap());
    let mut app = App::new(Arc::new(FakeProvider::default()), location, PlayerBackend::None, Config::default());
    app.input = "lofi".to_string();
    app.cursor_position = 4;

    for width in [1, 4, 5] {
      let mut terminal = Terminal::new(TestBackend::new(width, 20)).unwrap();
      terminal.draw(|frame| ui(frame, &mut app)).unwrap();
    }
    assert!(app.input_area.is_some());
  }

  #[test]
  fn display_width_counts_wide_chars() {
    assert_eq!(display_width("日本a", 3), 5);
    assert_eq!(display_width("abc", 2), 2);
  }
}
