use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};
use url::Url;

use crate::constants::constants;
use crate::location::{Location, query_param, with_query_param};

/// Embeddable player URL for `id`, with the fixed embed flags applied.
pub fn embed_url(id: &str) -> Result<Url> {
  let c = constants();
  let mut url = Url::parse(&c.embed_base).context("Invalid embed base in constants.ron")?;
  url.path_segments_mut().map_err(|_| anyhow!("Embed base cannot take a path"))?.pop_if_empty().push(id);
  {
    let mut pairs = url.query_pairs_mut();
    for (k, v) in &c.embed_params {
      pairs.append_pair(k, v);
    }
  }
  Ok(url)
}

/// Canonical watch page for `id`, handed to external players.
pub fn watch_url(id: &str) -> Result<Url> {
  let mut url = Url::parse(&constants().watch_base).context("Invalid watch base in constants.ron")?;
  url.query_pairs_mut().append_pair("v", id);
  Ok(url)
}

/// Which video is selected, mirrored into the `play` parameter of the location.
pub struct PlaybackSelector<L> {
  location: L,
  selected_id: Option<String>,
}

impl<L: Location> PlaybackSelector<L> {
  pub fn new(location: L) -> Self {
    Self { location, selected_id: None }
  }

  pub fn selected_id(&self) -> Option<&str> {
    self.selected_id.as_deref()
  }

  pub fn location(&self) -> &L {
    &self.location
  }

  pub fn location_mut(&mut self) -> &mut L {
    &mut self.location
  }

  /// Read the initial selection from the URL (deep link).
  ///
  /// The id is not checked against anything; the player deals with bad ids.
  pub fn hydrate_from_location(&mut self) {
    self.selected_id = self.read_param();
    if let Some(id) = &self.selected_id {
      info!(video_id = %id, "playback: hydrated from location");
    }
  }

  /// Re-read the selection after the history moved underneath us.
  pub fn sync_from_location(&mut self) -> bool {
    let id = self.read_param();
    if id == self.selected_id {
      return false;
    }
    debug!(video_id = ?id, "playback: synced from location");
    self.selected_id = id;
    true
  }

  /// Select `id` and push a history entry for it. Returns whether anything changed.
  pub fn select(&mut self, id: &str) -> bool {
    if id.is_empty() || self.selected_id.as_deref() == Some(id) {
      return false;
    }
    info!(video_id = %id, "playback: select");
    self.selected_id = Some(id.to_string());
    let next = with_query_param(self.location.href(), &constants().play_param, Some(id));
    self.location.push(next);
    true
  }

  /// Stop playback and push a history entry without the parameter.
  pub fn clear(&mut self) -> bool {
    if self.selected_id.take().is_none() {
      return false;
    }
    info!("playback: clear");
    let next = with_query_param(self.location.href(), &constants().play_param, None);
    self.location.push(next);
    true
  }

  fn read_param(&self) -> Option<String> {
    query_param(self.location.href(), &constants().play_param).filter(|id| !id.is_empty())
  }
}
