//! Application configuration management.
//!
//! This module handles loading the application configuration: the mail
//! gateway base URL and the loopback port the sign-in redirect lands on.
//!
//! Configuration is read from `~/.config/mayl/config.json` when present,
//! with `MAYL_API_URL` / `MAYL_CALLBACK_PORT` environment overrides.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use anyhow::Result;
use tracing::warn;

/// Application name used for the config directory path
const APP_NAME: &str = "mayl";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default gateway base URL (local development backend)
const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Default port for the sign-in redirect listener. Matches the frontend
/// origin the backend redirects to.
const DEFAULT_CALLBACK_PORT: u16 = 5173;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_callback_port")]
    pub callback_port: u16,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_callback_port() -> u16 {
    DEFAULT_CALLBACK_PORT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            callback_port: default_callback_port(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Ok(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)?;
                serde_json::from_str(&contents)?
            }
            _ => Self::default(),
        };

        if let Ok(url) = std::env::var("MAYL_API_URL") {
            config.api_base_url = url;
        }
        if let Ok(port) = std::env::var("MAYL_CALLBACK_PORT") {
            match port.parse() {
                Ok(port) => config.callback_port = port,
                Err(_) => warn!(value = %port, "Ignoring invalid MAYL_CALLBACK_PORT"),
            }
        }

        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}
