use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "pathdex";
const CONFIG_FILE: &str = "config.json";

/// Application configuration stored in the app data directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Delimiter between path fragments
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Keep every inserted leaf, even when the same path is inserted twice
    #[serde(default)]
    pub allow_duplicate_leaves: bool,

    /// Honor .gitignore and friends when cataloging a directory
    #[serde(default = "default_respect_gitignore")]
    pub respect_gitignore: bool,

    /// Include hidden files when cataloging a directory
    #[serde(default)]
    pub include_hidden: bool,

    /// Maximum directory depth to walk, unlimited if None
    #[serde(default)]
    pub max_depth: Option<usize>,
}

fn default_delimiter() -> char {
    '/'
}

fn default_respect_gitignore() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            allow_duplicate_leaves: false,
            respect_gitignore: default_respect_gitignore(),
            include_hidden: false,
            max_depth: None,
        }
    }
}

impl AppConfig {
    /// Load config from the app data directory, or return default if not found
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load config from an explicit file, or return default if it does not exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the index cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() {
            anyhow::bail!("delimiter must be an ASCII character, got {:?}", self.delimiter);
        }
        Ok(())
    }
}

/// Get the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    let app_dir = get_app_data_dir()?;
    Ok(app_dir.join(CONFIG_FILE))
}

/// Get the application data directory. Nothing is created on disk.
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_CONFIG_HOME or ~/.config
        dirs::config_dir()
    };

    app_data_dir_in(base)
}

fn app_data_dir_in(base: Option<PathBuf>) -> Result<PathBuf> {
    let base = base.context("Could not determine app data directory")?;
    Ok(base.join(APP_NAME))
}
