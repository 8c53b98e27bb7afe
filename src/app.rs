use ratatui::{layout::Rect, widgets::ListState};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::config::Config;
use crate::controller::{InteractionController, Snapshot};
use crate::location::MemoryHistory;
use crate::player::{ExternalPlayer, PlayerBackend};
use crate::search::SearchOutcome;
use crate::theme::{THEMES, Theme, theme_index};
use crate::youtube::SearchProvider;

/// Terminal front end state around the interaction controller.
///
/// The search field text lives here; the controller only sees it on submit.
pub struct App {
  pub controller: InteractionController<MemoryHistory>,
  pub input: String,
  pub cursor_position: usize,
  pub input_scroll: usize,
  pub theme_index: usize,
  pub player: ExternalPlayer,
  pub list_state: ListState,
  /// Screen areas from the last frame, for mouse hit-testing.
  pub results_area: Option<Rect>,
  pub input_area: Option<Rect>,
  pub last_error: Option<String>,
  pub should_quit: bool,
  config: Config,
  /// When the last error was set, for auto-dismiss after 5 seconds.
  error_time: Option<Instant>,
}

impl App {
  pub fn new(
    provider: Arc<dyn SearchProvider>,
    location: MemoryHistory,
    backend: PlayerBackend,
    config: Config,
  ) -> Self {
    let mut controller = InteractionController::new(provider, location);
    controller.mount();
    Self {
      controller,
      input: String::new(),
      cursor_position: 0,
      input_scroll: 0,
      theme_index: theme_index(config.theme_name.as_deref()),
      player: ExternalPlayer::new(backend),
      list_state: ListState::default(),
      results_area: None,
      input_area: None,
      last_error: None,
      should_quit: false,
      config,
      error_time: None,
    }
  }

  pub fn theme(&self) -> &'static Theme {
    // Safety: theme_index is always bounded by modular arithmetic in next_theme()
    // and by theme_index() on initialization.
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.config.theme_name = Some(self.theme().name.to_string());
    self.config.save();
  }

  pub fn snapshot(&self) -> Snapshot {
    self.controller.snapshot()
  }

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  /// Clear the current error message and its expiry timer.
  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Clear stale error messages after 5 seconds.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(5)
    {
      self.clear_error();
    }
  }

  pub fn trigger_search(&mut self) {
    self.clear_error();
    let query = self.input.clone();
    self.controller.submit(&query);
  }

  /// Apply finished searches and keep the player in step with the selection.
  pub async fn check_pending(&mut self) {
    for outcome in self.controller.poll() {
      if let SearchOutcome::Applied { accepted: 0, .. } = outcome {
        self.set_error("No results found.".to_string());
      }
    }

    let selected = self.controller.selected_id().map(str::to_string);
    if let Err(e) = self.player.sync(selected.as_deref()).await {
      warn!(err = %e, "player: sync failed");
      self.set_error(format!("Playback error: {:#}", e));
    }
    self.player.check_status();
    self.expire_error();
  }

  pub async fn shutdown(&mut self) {
    self.controller.unmount();
    if let Err(e) = self.player.stop().await {
      warn!(err = %e, "player: failed to stop on exit");
    }
  }
}
