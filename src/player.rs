use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use std::process::Stdio;
use tokio::{
  io::{AsyncBufReadExt, BufReader as TokioBufReader},
  process::{Child as TokioChild, Command},
  sync::mpsc,
  task::JoinHandle,
};
use tracing::{info, warn};

use crate::playback::watch_url;

/// What actually shows the selected video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlayerBackend {
  /// Launch mpv on the watch page.
  Mpv,
  /// Only show the embed link.
  None,
}

impl PlayerBackend {
  pub fn label(self) -> &'static str {
    match self {
      PlayerBackend::Mpv => "mpv",
      PlayerBackend::None => "none",
    }
  }

  pub fn from_config(s: &str) -> Self {
    match s.to_lowercase().as_str() {
      "none" | "off" => PlayerBackend::None,
      _ => PlayerBackend::Mpv,
    }
  }
}

/// Follows the selected video id with an external player process.
pub struct ExternalPlayer {
  pub backend: PlayerBackend,
  current_id: Option<String>,
  process: Option<TokioChild>,
  monitor_handle: Option<JoinHandle<()>>,
  status_rx: Option<mpsc::Receiver<String>>,
  last_status: Option<String>,
}

impl ExternalPlayer {
  pub fn new(backend: PlayerBackend) -> Self {
    Self { backend, current_id: None, process: None, monitor_handle: None, status_rx: None, last_status: None }
  }

  pub fn current_id(&self) -> Option<&str> {
    self.current_id.as_deref()
  }

  pub fn is_running(&self) -> bool {
    self.process.is_some()
  }

  /// Bring the player in line with the selection. A no-op when it already matches.
  ///
  /// The id is recorded before launching, so a failed launch is reported once
  /// rather than retried on every tick.
  pub async fn sync(&mut self, selected: Option<&str>) -> Result<()> {
    if selected == self.current_id.as_deref() {
      return Ok(());
    }
    self.stop().await.context("Failed to stop previous playback")?;
    let Some(id) = selected else { return Ok(()) };
    self.current_id = Some(id.to_string());
    match self.backend {
      PlayerBackend::Mpv => self.spawn_mpv(id),
      PlayerBackend::None => Ok(()),
    }
  }

  fn spawn_mpv(&mut self, id: &str) -> Result<()> {
    let url = watch_url(id)?;
    info!(video_id = %id, "player: launching mpv");

    let mut cmd = Command::new("mpv");
    cmd.args([
      "--force-window=immediate",
      "--term-status-msg=${time-pos/full} / ${duration/full} | ${media-title}",
      "--",
      url.as_str(),
    ]);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    // Undrained stderr would fill the pipe buffer and block mpv.
    cmd.stderr(Stdio::null());
    cmd.kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        anyhow!("mpv not found. Install it, or run with --player none")
      } else {
        anyhow!(e).context("Failed to spawn mpv process")
      }
    })?;

    let stdout = child.stdout.take().context("Failed to get mpv stdout")?;
    let (tx, rx) = mpsc::channel::<String>(10);
    let monitor_handle = tokio::spawn(async move {
      let mut lines = TokioBufReader::new(stdout).lines();
      while let Ok(Some(line)) = lines.next_line().await {
        if tx.send(line).await.is_err() {
          break;
        }
      }
    });

    self.process = Some(child);
    self.monitor_handle = Some(monitor_handle);
    self.status_rx = Some(rx);
    Ok(())
  }

  /// Drain status lines and notice a player the user closed.
  pub fn check_status(&mut self) {
    if let Some(rx) = &mut self.status_rx {
      while let Ok(status) = rx.try_recv() {
        self.last_status = Some(status);
      }
    }
    if let Some(child) = &mut self.process
      && let Ok(Some(exit)) = child.try_wait()
    {
      if exit.success() {
        info!("player: mpv exited");
      } else {
        warn!(code = ?exit.code(), "player: mpv exited with an error");
      }
      self.process = None;
      self.last_status = Some("player closed".to_string());
    }
  }

  pub fn last_status(&self) -> Option<&str> {
    self.last_status.as_deref()
  }

  pub async fn stop(&mut self) -> Result<()> {
    if let Some(handle) = self.monitor_handle.take() {
      handle.abort();
      let _ = handle.await;
    }
    self.status_rx = None;
    self.last_status = None;
    self.current_id = None;

    if let Some(mut child) = self.process.take() {
      info!("player: stopping mpv");
      child.kill().await.context("Failed to kill mpv process")?;
      let _ = child.wait().await;
    }
    Ok(())
  }
}
