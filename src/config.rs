use anyhow::{Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Environment variable that overrides `api_key` from the config file.
pub const API_KEY_ENV: &str = "WATCHIT_API_KEY";

/// User preferences stored in `config.toml`.
#[derive(Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
  pub api_key: Option<String>,
  pub theme_name: Option<String>,
  pub player: Option<String>,
}

impl fmt::Debug for Config {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Config")
      .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
      .field("theme_name", &self.theme_name)
      .field("player", &self.player)
      .finish()
  }
}

fn project_dirs() -> Option<ProjectDirs> {
  ProjectDirs::from("", "", "watchit")
}

impl Config {
  pub fn path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
  }

  /// Directory for log files.
  pub fn log_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_local_dir().join("logs"))
  }

  pub fn load() -> Self {
    if let Some(config_file) = Self::path()
      && let Ok(content) = std::fs::read_to_string(config_file)
      && let Ok(config) = toml::from_str(&content)
    {
      return config;
    }
    Self::default()
  }

  pub fn save(&self) {
    if let Some(proj_dirs) = project_dirs() {
      let config_dir = proj_dirs.config_dir();
      if std::fs::create_dir_all(config_dir).is_ok() {
        let config_file = config_dir.join("config.toml");
        if let Ok(content) = toml::to_string(self) {
          let _ = std::fs::write(config_file, content);
        }
      }
    }
  }

  /// The provider key: the environment wins over the file.
  pub fn api_key(&self) -> Result<String> {
    self.api_key_with(std::env::var(API_KEY_ENV).ok())
  }

  fn api_key_with(&self, env: Option<String>) -> Result<String> {
    env
      .filter(|k| !k.trim().is_empty())
      .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
      .ok_or_else(|| {
        let location = Self::path().map(|p| p.display().to_string()).unwrap_or_else(|| "config.toml".to_string());
        anyhow!("No YouTube API key configured. Set {} or api_key in {}", API_KEY_ENV, location)
      })
  }
}
