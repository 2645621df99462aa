//! Replay configuration
//!
//! Loaded from `.ministore.toml` in the current directory, then from the home
//! directory, falling back to defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = ".ministore.toml";

/// Replay configuration loaded from .ministore.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Log every dispatched action
    #[serde(default = "default_log_actions")]
    pub log_actions: bool,

    /// Stop at the first line that fails instead of skipping it
    #[serde(default)]
    pub strict: bool,

    /// Pretty-print the final state
    #[serde(default = "default_pretty")]
    pub pretty: bool,

    /// JSON file holding the preloaded state. A relative path is taken
    /// relative to the directory of the config file it appears in.
    #[serde(default)]
    pub initial_state: Option<PathBuf>,

    /// Action types dropped before they reach the store
    #[serde(default)]
    pub ignore_types: Vec<String>,
}

fn default_log_actions() -> bool {
    true
}

fn default_pretty() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_actions: default_log_actions(),
            strict: false,
            pretty: default_pretty(),
            initial_state: None,
            ignore_types: Vec::new(),
        }
    }
}

impl Config {
    /// Load config from CWD first, then home directory, or use defaults
    pub fn load() -> Self {
        if let Some((path, content)) = load_config_file() {
            match toml::from_str::<Config>(&content) {
                Ok(config) => {
                    log::info!("Loaded replay config from {}", path.display());
                    return config.relative_to(&path);
                }
                Err(e) => {
                    log::warn!("Failed to parse config file: {}", e);
                }
            }
        }

        log::debug!("Using default replay config");
        Self::default()
    }

    /// Load config from an explicitly requested file.
    ///
    /// Unlike [`Config::load`], a missing or malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config.relative_to(path))
    }

    /// Explicit path if given, search otherwise
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => Ok(Self::load()),
        }
    }

    /// Anchor relative paths at the directory holding `config_path`
    fn relative_to(mut self, config_path: &Path) -> Self {
        let base = config_path.parent().unwrap_or_else(|| Path::new(""));
        if let Some(state) = self.initial_state.take() {
            self.initial_state = Some(base.join(state));
        }
        self
    }
}

/// Load config file content from CWD first, then home directory
fn load_config_file() -> Option<(PathBuf, String)> {
    let local = PathBuf::from(CONFIG_FILE);
    if let Ok(content) = std::fs::read_to_string(&local) {
        log::debug!("Loaded config from {}", CONFIG_FILE);
        return Some((local, content));
    }

    if let Some(home_config) = home_config_path() {
        if let Ok(content) = std::fs::read_to_string(&home_config) {
            log::debug!("Loaded config from {}", home_config.display());
            return Some((home_config, content));
        }
    }

    None
}

/// ~/.ministore.toml if HOME is set
fn home_config_path() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join(CONFIG_FILE))
}
