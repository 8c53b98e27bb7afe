//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it is always available, with
//! no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

/// All fixed application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  /// Address the widget is served from when no deep link is given.
  pub app_url: String,
  /// Query parameter mirroring the selected video.
  pub play_param: String,

  // Search provider
  pub search_endpoint: String,
  pub search_part: String,
  /// How many raw items to request per search.
  pub num_results: usize,
  /// How many accepted videos are kept per search.
  pub num_videos: usize,
  pub video_kind: String,
  pub thumbnail_size: String,

  // Player
  pub embed_base: String,
  /// Fixed embed flags: autoplay, no related videos, minimal branding.
  pub embed_params: Vec<(String, String)>,
  pub watch_base: String,

  // UI loop
  pub tick_millis: u64,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed this is a build-time error.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
