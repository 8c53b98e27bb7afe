use tracing::debug;

/// Keys the navigator understands. Everything else arrives as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
  Char(char),
  Enter,
  Escape,
  Up,
  Down,
  Other,
}

/// Which concrete element holds input focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusTarget {
  #[default]
  SearchField,
  /// Focus sits on the page itself, e.g. after the focused row disappeared.
  Nothing,
  Row(usize),
}

/// Whether a key was handled here or should reach the focused element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
  /// Default action suppressed.
  Consumed,
  PassThrough,
}

/// Result of feeding one key to the navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
  PassThrough,
  Moved,
  /// Play the row at this index.
  Activate(usize),
  /// Stop playback.
  Dismiss,
}

impl KeyOutcome {
  pub fn disposition(self) -> KeyDisposition {
    match self {
      KeyOutcome::PassThrough => KeyDisposition::PassThrough,
      _ => KeyDisposition::Consumed,
    }
  }
}

#[derive(Clone, Copy)]
enum Step {
  Next,
  Prev,
}

/// Roving focus over the search field and up to N result rows.
///
/// Only indices are kept here; mapping an index to an on-screen row is the
/// presentation's job.
#[derive(Debug, Default)]
pub struct FocusNavigator {
  target: FocusTarget,
}

impl FocusNavigator {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn target(&self) -> FocusTarget {
    self.target
  }

  /// Index of the focused row, if a row within `0..row_count` is focused.
  pub fn focused_index(&self, row_count: usize) -> Option<usize> {
    match self.target {
      FocusTarget::Row(i) if i < row_count => Some(i),
      _ => None,
    }
  }

  pub fn focus_search_field(&mut self) {
    self.target = FocusTarget::SearchField;
  }

  pub fn blur(&mut self) {
    self.target = FocusTarget::Nothing;
  }

  /// Focus row `index`; ignored when no such row exists.
  pub fn focus_row(&mut self, index: usize, row_count: usize) -> bool {
    if index >= row_count {
      return false;
    }
    self.target = FocusTarget::Row(index);
    true
  }

  /// Drop focus from a row that no longer exists after the result set changed.
  pub fn reconcile(&mut self, row_count: usize) {
    if let FocusTarget::Row(i) = self.target
      && i >= row_count
    {
      debug!(row = i, row_count, "focus: row vanished, releasing focus");
      self.target = FocusTarget::Nothing;
    }
  }

  /// Feed one key.
  ///
  /// While the search field has focus only Escape and the arrow keys are
  /// taken; every character, `j`, `k` and `/` included, is typed into the
  /// field. Everywhere else `j`/`k` step like Down/Up and `/` returns to the
  /// field.
  pub fn handle_key(&mut self, key: Key, row_count: usize) -> KeyOutcome {
    self.reconcile(row_count);

    if key == Key::Escape {
      return KeyOutcome::Dismiss;
    }

    match self.target {
      // Text typed into the field, including '/', 'j' and 'k', belongs to the field.
      FocusTarget::SearchField => match key {
        Key::Down => self.step(Step::Next, row_count),
        Key::Up => self.step(Step::Prev, row_count),
        _ => KeyOutcome::PassThrough,
      },
      FocusTarget::Nothing | FocusTarget::Row(_) => match key {
        Key::Char('/') => {
          self.target = FocusTarget::SearchField;
          KeyOutcome::Moved
        }
        Key::Char('j') | Key::Down => self.step(Step::Next, row_count),
        Key::Char('k') | Key::Up => self.step(Step::Prev, row_count),
        Key::Enter => match self.target {
          FocusTarget::Row(i) => KeyOutcome::Activate(i),
          _ => KeyOutcome::PassThrough,
        },
        _ => KeyOutcome::PassThrough,
      },
    }
  }

  fn step(&mut self, step: Step, row_count: usize) -> KeyOutcome {
    if row_count == 0 {
      return KeyOutcome::PassThrough;
    }
    let next = match (self.target, step) {
      (FocusTarget::Row(i), Step::Next) => (i + 1) % row_count,
      (FocusTarget::Row(i), Step::Prev) => (i + row_count - 1) % row_count,
      (_, Step::Next) => 0,
      (_, Step::Prev) => row_count - 1,
    };
    self.target = FocusTarget::Row(next);
    KeyOutcome::Moved
  }
}
