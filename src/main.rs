mod app;
mod config;
mod constants;
mod controller;
mod focus;
mod input;
mod location;
mod playback;
mod player;
mod search;
#[cfg(test)]
mod testing;
mod theme;
mod ui;
mod video;
mod youtube;

use anyhow::{Context, Result};
use clap::Parser;
use ratatui::{
  DefaultTerminal,
  crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
  },
};
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use url::Url;

use app::App;
use config::Config;
use constants::constants;
use location::{Location, MemoryHistory};
use player::PlayerBackend;
use youtube::{SearchProvider, YouTubeClient};

const LOG_ENV: &str = "WATCHIT_LOG";

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Address to open, e.g. a shared link carrying `?play=<id>`
  #[arg(short, long)]
  link: Option<Url>,

  /// Player used for the selected video (default: config file, then mpv)
  #[arg(short, long, value_enum)]
  player: Option<PlayerBackend>,

  /// Directory for the rolling log file
  #[arg(long)]
  log_dir: Option<PathBuf>,
}

// --- Logging ---

/// Log to a daily file so the terminal UI stays clean. Returns `None` when no
/// log directory is available; logging is then disabled.
fn init_logging(log_dir: Option<PathBuf>) -> Option<WorkerGuard> {
  let dir = log_dir.or_else(Config::log_dir)?;
  if let Err(e) = std::fs::create_dir_all(&dir) {
    eprintln!("Warning: failed to create log directory {}: {}", dir.display(), e);
    return None;
  }
  let file_appender = tracing_appender::rolling::daily(&dir, "watchit.log");
  let (writer, guard) = tracing_appender::non_blocking(file_appender);
  let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).init();
  Some(guard)
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let _log_guard = init_logging(args.log_dir.clone());

  let config = Config::load();
  let api_key = config.api_key()?;
  let provider: Arc<dyn SearchProvider> = Arc::new(YouTubeClient::new(api_key)?);

  let start = match args.link {
    Some(link) => link,
    None => Url::parse(&constants().app_url).context("invalid app_url in constants.ron")?,
  };
  let backend = args
    .player
    .or_else(|| config.player.as_deref().map(PlayerBackend::from_config))
    .unwrap_or(PlayerBackend::Mpv);
  info!(address = %start, player = backend.label(), "main: starting");

  let mut app = App::new(provider, MemoryHistory::new(start), backend, config);

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    let _ = execute!(stdout(), DisableMouseCapture);
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  execute!(stdout(), EnableMouseCapture)?;
  let result = run(&mut terminal, &mut app).await;
  if let Err(e) = execute!(stdout(), DisableMouseCapture) {
    warn!(err = %e, "main: failed to disable mouse capture");
  }
  ratatui::restore();

  app.shutdown().await;
  println!("{}", app.controller.location().href());
  result
}

async fn run(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
  let tick = Duration::from_millis(constants().tick_millis);

  loop {
    app.check_pending().await;

    terminal.draw(|frame| ui::ui(frame, app))?;

    if event::poll(tick)? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(app, key);
        }
        Event::Mouse(mouse) => input::handle_mouse_event(app, mouse),
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }

  Ok(())
}
