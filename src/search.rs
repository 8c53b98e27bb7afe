use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::constants::constants;
use crate::video::{self, VideoRecord};
use crate::youtube::SearchProvider;

/// Progress of the most recently issued search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchStatus {
  #[default]
  Idle,
  Searching {
    epoch: u64,
  },
  /// The latest search failed; previous results are still shown.
  Failed {
    message: String,
  },
}

/// What happened when a finished request was delivered back to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
  Applied { epoch: u64, accepted: usize, rejected: usize },
  /// A newer search was issued after this one; its response was dropped.
  Stale { epoch: u64 },
  Failed { epoch: u64, message: String },
}

/// A finished provider request, tagged with the epoch it was issued under.
struct Completion {
  epoch: u64,
  query: String,
  result: anyhow::Result<Vec<serde_json::Value>>,
}

/// Owns the query, the current result set and the request epoch.
///
/// Every request runs as its own task and reports back through one channel.
/// Only a completion whose epoch still matches `epoch` may replace `results`,
/// so the most recently issued search wins regardless of arrival order.
pub struct SearchSession {
  provider: Arc<dyn SearchProvider>,
  query: String,
  results: Vec<VideoRecord>,
  epoch: u64,
  status: SearchStatus,
  tx: mpsc::UnboundedSender<Completion>,
  rx: mpsc::UnboundedReceiver<Completion>,
}

impl SearchSession {
  pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self { provider, query: String::new(), results: Vec::new(), epoch: 0, status: SearchStatus::Idle, tx, rx }
  }

  pub fn query(&self) -> &str {
    &self.query
  }

  pub fn results(&self) -> &[VideoRecord] {
    &self.results
  }

  pub fn status(&self) -> &SearchStatus {
    &self.status
  }

  /// Issue a search for `query`. Must be called inside a tokio runtime.
  ///
  /// An empty query clears the results on the spot without a request. It
  /// still advances the epoch so an older request cannot refill the list.
  pub fn submit(&mut self, query: &str) {
    self.query = query.to_string();
    self.epoch += 1;
    let epoch = self.epoch;

    if query.is_empty() {
      debug!(epoch, "search: empty query, clearing results");
      self.results = Vec::new();
      self.status = SearchStatus::Idle;
      return;
    }

    info!(query = %query, epoch, "search: submitted");
    self.status = SearchStatus::Searching { epoch };

    let provider = Arc::clone(&self.provider);
    let tx = self.tx.clone();
    let query = query.to_string();
    tokio::spawn(async move {
      let result = provider.search(&query, constants().num_results).await;
      let _ = tx.send(Completion { epoch, query, result });
    });
  }

  /// Apply every completion that has already arrived, without waiting.
  pub fn poll(&mut self) -> Vec<SearchOutcome> {
    let mut outcomes = Vec::new();
    while let Ok(completion) = self.rx.try_recv() {
      outcomes.push(self.apply(completion));
    }
    outcomes
  }

  /// Wait for the next completion and apply it.
  pub async fn next_outcome(&mut self) -> Option<SearchOutcome> {
    let completion = self.rx.recv().await?;
    Some(self.apply(completion))
  }

  fn apply(&mut self, completion: Completion) -> SearchOutcome {
    let Completion { epoch, query, result } = completion;
    if epoch != self.epoch {
      debug!(epoch, current = self.epoch, query = %query, "search: discarding stale response");
      return SearchOutcome::Stale { epoch };
    }

    match result {
      Ok(items) => {
        let mut rejected = 0;
        let mut results: Vec<VideoRecord> = Vec::with_capacity(items.len());
        for item in &items {
          match video::parse(item) {
            Ok(record) => results.push(record),
            Err(e) => {
              debug!(err = %e, "search: skipping item");
              rejected += 1;
            }
          }
        }
        results.truncate(constants().num_videos);
        let accepted = results.len();
        info!(query = %query, epoch, accepted, rejected, "search: results ready");
        self.results = results;
        self.status = SearchStatus::Idle;
        SearchOutcome::Applied { epoch, accepted, rejected }
      }
      Err(e) => {
        let message = format!("Search failed: {:#}", e);
        warn!(query = %query, epoch, err = %message, "search: request failed");
        self.status = SearchStatus::Failed { message: message.clone() };
        SearchOutcome::Failed { epoch, message }
      }
    }
  }
}
