use std::cell::Cell;
use std::sync::Arc;
use tracing::{debug, info};

use crate::focus::{FocusNavigator, FocusTarget, Key, KeyDisposition, KeyOutcome};
use crate::location::Location;
use crate::playback::PlaybackSelector;
use crate::search::{SearchOutcome, SearchSession, SearchStatus};
use crate::video::VideoRecord;
use crate::youtube::SearchProvider;

// --- Key listener registration ---

thread_local! {
  static KEY_LISTENERS: Cell<usize> = const { Cell::new(0) };
}

/// Registration of the document-level key handler on the current event loop.
///
/// Released on drop, so every exit path (unmount, drop of the controller,
/// unwinding) removes it.
#[derive(Debug)]
pub struct KeyListenerGuard {
  _private: (),
}

impl KeyListenerGuard {
  fn register() -> Self {
    KEY_LISTENERS.with(|n| n.set(n.get() + 1));
    Self { _private: () }
  }
}

impl Drop for KeyListenerGuard {
  fn drop(&mut self) {
    KEY_LISTENERS.with(|n| n.set(n.get().saturating_sub(1)));
  }
}

/// Number of key handlers registered on this thread.
pub fn active_key_listeners() -> usize {
  KEY_LISTENERS.with(Cell::get)
}

// --- Snapshot ---

/// Everything the presentation needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
  pub query: String,
  pub results: Vec<VideoRecord>,
  /// Playing iff `Some`.
  pub selected_id: Option<String>,
  pub focused_index: Option<usize>,
  pub focus: FocusTarget,
  pub status: SearchStatus,
  pub address: String,
}

impl Snapshot {
  pub fn is_playing(&self) -> bool {
    self.selected_id.is_some()
  }

  /// The selected record, when it is part of the current results.
  pub fn selected_record(&self) -> Option<&VideoRecord> {
    let id = self.selected_id.as_deref()?;
    self.results.iter().find(|r| r.id == id)
  }
}

// --- Controller ---

/// Wires search, playback and focus into one state machine.
pub struct InteractionController<L> {
  search: SearchSession,
  playback: PlaybackSelector<L>,
  focus: FocusNavigator,
  listener: Option<KeyListenerGuard>,
}

impl<L: Location> InteractionController<L> {
  pub fn new(provider: Arc<dyn SearchProvider>, location: L) -> Self {
    Self {
      search: SearchSession::new(provider),
      playback: PlaybackSelector::new(location),
      focus: FocusNavigator::new(),
      listener: None,
    }
  }

  /// Start handling input: pick up a deep link, focus the search field, and
  /// register the key handler. Mounting twice keeps a single registration.
  pub fn mount(&mut self) {
    if self.listener.is_some() {
      return;
    }
    self.playback.hydrate_from_location();
    self.focus.focus_search_field();
    self.listener = Some(KeyListenerGuard::register());
    info!(address = %self.playback.location().href(), listeners = active_key_listeners(), "controller: mounted");
  }

  pub fn unmount(&mut self) {
    if self.listener.take().is_some() {
      info!("controller: unmounted");
    }
  }

  pub fn is_mounted(&self) -> bool {
    self.listener.is_some()
  }

  /// Document-level key handler.
  pub fn handle_key(&mut self, key: Key) -> KeyDisposition {
    if !self.is_mounted() {
      return KeyDisposition::PassThrough;
    }
    let row_count = self.search.results().len();
    let outcome = self.focus.handle_key(key, row_count);
    debug!(?key, ?outcome, "controller: key");
    match outcome {
      KeyOutcome::Activate(i) => self.activate_row(i),
      KeyOutcome::Dismiss => {
        self.clear();
      }
      KeyOutcome::Moved | KeyOutcome::PassThrough => {}
    }
    outcome.disposition()
  }

  /// Form submission.
  pub fn submit(&mut self, query: &str) {
    self.search.submit(query);
    self.focus.reconcile(self.search.results().len());
  }

  /// Pointer activation of a row: focus it and play it.
  pub fn click_row(&mut self, index: usize) {
    if self.focus.focus_row(index, self.search.results().len()) {
      self.activate_row(index);
    }
  }

  pub fn select(&mut self, id: &str) -> bool {
    self.playback.select(id)
  }

  pub fn clear(&mut self) -> bool {
    self.playback.clear()
  }

  pub fn focus_search_field(&mut self) {
    self.focus.focus_search_field();
  }

  pub fn blur(&mut self) {
    self.focus.blur();
  }

  /// Apply finished searches without waiting.
  pub fn poll(&mut self) -> Vec<SearchOutcome> {
    let outcomes = self.search.poll();
    if !outcomes.is_empty() {
      self.focus.reconcile(self.search.results().len());
    }
    outcomes
  }

  /// Wait for the next finished search and apply it.
  #[allow(dead_code)]
  pub async fn next_search_outcome(&mut self) -> Option<SearchOutcome> {
    let outcome = self.search.next_outcome().await;
    self.focus.reconcile(self.search.results().len());
    outcome
  }

  /// History back, then follow the `play` parameter of the new entry.
  pub fn navigate_back(&mut self) -> bool {
    self.playback.location_mut().back() && self.playback.sync_from_location()
  }

  /// History forward, then follow the `play` parameter of the new entry.
  pub fn navigate_forward(&mut self) -> bool {
    self.playback.location_mut().forward() && self.playback.sync_from_location()
  }

  pub fn location(&self) -> &L {
    self.playback.location()
  }

  pub fn focus(&self) -> FocusTarget {
    self.focus.target()
  }

  pub fn selected_id(&self) -> Option<&str> {
    self.playback.selected_id()
  }

  pub fn snapshot(&self) -> Snapshot {
    let results = self.search.results().to_vec();
    Snapshot {
      query: self.search.query().to_string(),
      focused_index: self.focus.focused_index(results.len()),
      results,
      selected_id: self.playback.selected_id().map(str::to_string),
      focus: self.focus.target(),
      status: self.search.status().clone(),
      address: self.playback.location().href().to_string(),
    }
  }

  fn activate_row(&mut self, index: usize) {
    let Some(record) = self.search.results().get(index) else { return };
    let id = record.id.clone();
    self.select(&id);
  }
}
