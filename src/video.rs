use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use thiserror::Error;

use crate::constants::constants;

/// A single accepted search result, ready to render.
#[derive(Debug, Clone)]
pub struct VideoRecord {
  pub id: String,
  pub title: String,
  pub thumbnail_url: String,
}

impl PartialEq for VideoRecord {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for VideoRecord {}

impl Hash for VideoRecord {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

/// Why a raw provider item did not become a [`VideoRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejected {
  /// Channel, playlist or any other non-video hit.
  #[error("not a video (kind {0})")]
  NotVideo(String),
  #[error("malformed item: {field}: {reason}")]
  Malformed { field: &'static str, reason: String },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawId {
  kind: String,
  #[serde(default)]
  video_id: Option<String>,
}

#[derive(Deserialize)]
struct RawSnippet {
  title: String,
  thumbnails: HashMap<String, RawThumbnail>,
}

#[derive(Deserialize)]
struct RawThumbnail {
  url: String,
}

fn field<T: DeserializeOwned>(item: &Value, name: &'static str) -> Result<T, Rejected> {
  let value = item.get(name).ok_or_else(|| Rejected::Malformed { field: name, reason: "missing".to_string() })?;
  T::deserialize(value).map_err(|e| Rejected::Malformed { field: name, reason: e.to_string() })
}

/// Normalize one provider search item.
///
/// The kind is checked before anything else so channel and playlist hits are
/// reported as [`Rejected::NotVideo`] even though they lack a `videoId`.
pub fn parse(item: &Value) -> Result<VideoRecord, Rejected> {
  let c = constants();
  let id: RawId = field(item, "id")?;
  if id.kind != c.video_kind {
    return Err(Rejected::NotVideo(id.kind));
  }
  let video_id = id
    .video_id
    .filter(|v| !v.is_empty())
    .ok_or_else(|| Rejected::Malformed { field: "id.videoId", reason: "missing or empty".to_string() })?;

  let snippet: RawSnippet = field(item, "snippet")?;
  let thumbnail = snippet.thumbnails.get(&c.thumbnail_size).ok_or_else(|| Rejected::Malformed {
    field: "snippet.thumbnails",
    reason: format!("no '{}' variant", c.thumbnail_size),
  })?;

  Ok(VideoRecord {
    id: video_id,
    title: decode_html_entities(&snippet.title).into_owned(),
    thumbnail_url: thumbnail.url.clone(),
  })
}

/// Longest entity body we look at after `&`, e.g. `#x1F600` or `quot`.
const MAX_ENTITY_LEN: usize = 10;

/// Decode the HTML entities the provider uses in titles.
///
/// Handles the common named entities plus decimal and hex character
/// references. Anything unrecognised is copied through unchanged.
pub fn decode_html_entities(s: &str) -> Cow<'_, str> {
  if !s.contains('&') {
    return Cow::Borrowed(s);
  }

  let mut out = String::with_capacity(s.len());
  let mut rest = s;
  while let Some(amp) = rest.find('&') {
    out.push_str(&rest[..amp]);
    let tail = &rest[amp + 1..];
    let decoded = tail
      .char_indices()
      .take(MAX_ENTITY_LEN + 1)
      .find(|&(_, c)| c == ';')
      .and_then(|(semi, _)| decode_entity(&tail[..semi]).map(|c| (c, semi)));
    match decoded {
      Some((c, semi)) => {
        out.push(c);
        rest = &tail[semi + 1..];
      }
      None => {
        out.push('&');
        rest = tail;
      }
    }
  }
  out.push_str(rest);
  Cow::Owned(out)
}

fn decode_entity(body: &str) -> Option<char> {
  if let Some(num) = body.strip_prefix('#') {
    let code = match num.strip_prefix(['x', 'X']) {
      Some(hex) => u32::from_str_radix(hex, 16).ok()?,
      None => num.parse::<u32>().ok()?,
    };
    return char::from_u32(code);
  }
  match body {
    "amp" => Some('&'),
    "lt" => Some('<'),
    "gt" => Some('>'),
    "quot" => Some('"'),
    "apos" => Some('\''),
    "nbsp" => Some('\u{a0}'),
    _ => None,
  }
}
