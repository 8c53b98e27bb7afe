//! Test doubles shared by the unit tests.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::oneshot;

use crate::youtube::SearchProvider;

pub type Reply = std::result::Result<Vec<Value>, String>;

/// Scripted search provider.
///
/// Queries answer immediately from `respond`, or wait on a gate opened by the
/// test so completions can be delivered in any order.
#[derive(Default)]
pub struct FakeProvider {
  calls: Mutex<Vec<String>>,
  replies: Mutex<HashMap<String, Reply>>,
  gates: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
}

impl FakeProvider {
  pub fn respond(&self, query: &str, items: Vec<Value>) {
    self.replies.lock().unwrap().insert(query.to_string(), Ok(items));
  }

  pub fn fail(&self, query: &str, message: &str) {
    self.replies.lock().unwrap().insert(query.to_string(), Err(message.to_string()));
  }

  /// Hold back the next request for `query` until the returned sender fires.
  pub fn gate(&self, query: &str) -> oneshot::Sender<Reply> {
    let (tx, rx) = oneshot::channel();
    self.gates.lock().unwrap().insert(query.to_string(), rx);
    tx
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }
}

#[async_trait]
impl SearchProvider for FakeProvider {
  async fn search(&self, query: &str, _max_results: usize) -> Result<Vec<Value>> {
    self.calls.lock().unwrap().push(query.to_string());
    let gate = self.gates.lock().unwrap().remove(query);
    if let Some(rx) = gate {
      let reply = rx.await.map_err(|_| anyhow!("gate for '{}' dropped", query))?;
      return reply.map_err(|e| anyhow!(e));
    }
    let reply = self.replies.lock().unwrap().get(query).cloned().unwrap_or_else(|| Ok(Vec::new()));
    reply.map_err(|e| anyhow!(e))
  }
}

pub fn video_item(id: &str, title: &str) -> Value {
  json!({
    "kind": "youtube#searchResult",
    "id": { "kind": "youtube#video", "videoId": id },
    "snippet": {
      "title": title,
      "thumbnails": { "medium": { "url": format!("https://i.ytimg.com/vi/{id}/mqdefault.jpg") } }
    }
  })
}

pub fn channel_item(id: &str) -> Value {
  json!({
    "kind": "youtube#searchResult",
    "id": { "kind": "youtube#channel", "channelId": id },
    "snippet": {
      "title": format!("channel {id}"),
      "thumbnails": { "medium": { "url": "https://yt3.ggpht.com/c.jpg" } }
    }
  })
}

pub fn videos(ids: &[&str]) -> Vec<Value> {
  ids.iter().map(|id| video_item(id, &format!("title {id}"))).collect()
}
