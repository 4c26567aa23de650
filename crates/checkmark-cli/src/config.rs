use std::{
    fs,
    path::{Path, PathBuf},
};

use checkmark_http::RemoteConfig;
use color_eyre::Result;
use dirs::config_dir;
use serde::{Deserialize, Serialize};

/// User-level configuration loaded from `~/.config/checkmark/config.toml` (platform-specific).
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Override for the directory holding local preferences.
    pub data_dir: Option<PathBuf>,
    /// Backend settings.
    pub remote: Option<RemoteConfig>,
}

impl Config {
    /// Remote settings with defaults filled in.
    pub fn remote(&self) -> RemoteConfig {
        self.remote.clone().unwrap_or_default()
    }

    /// Apply a base address given on the command line or through the environment.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.remote.get_or_insert_with(RemoteConfig::default).base_url = Some(url);
        }
        self
    }
}

/// Load config from the default path; if missing, return defaults.
pub fn load() -> Result<Config> {
    let path = default_path()?;
    load_from_path(path)
}

/// Load config from a given path; if missing or empty, return defaults.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    let cfg: Config = toml::from_str(&contents)?;
    Ok(cfg)
}

/// Resolve the default config path (platform aware).
pub fn default_path() -> Result<PathBuf> {
    let base = config_dir().ok_or_else(|| color_eyre::eyre::eyre!("no config dir available"))?;
    Ok(base.join("checkmark").join("config.toml"))
}

/// Write the given config to the default path unless a file already exists there.
pub fn write_default_if_missing(path: &Path) -> Result<PathBuf> {
    write_if_missing(&Config::default(), path)
}

fn write_if_missing(config: &Config, path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = toml::to_string_pretty(config)?;
    fs::write(path, body)?;
    Ok(path.to_path_buf())
}
