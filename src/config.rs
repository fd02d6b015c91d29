//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which holds the origin the fixed asset paths resolve against and an
//! optional override for the cache root directory.
//!
//! Configuration is stored at `~/.config/offcache/config.json`. The
//! `OFFCACHE_ORIGIN` environment variable overrides the configured origin.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "offcache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the configured origin
pub const ORIGIN_ENV: &str = "OFFCACHE_ORIGIN";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub origin: Option<String>,
    pub cache_root: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Root directory holding the named caches.
    pub fn cache_root(&self) -> Result<PathBuf> {
        if let Some(ref root) = self.cache_root {
            return Ok(root.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Origin the asset paths resolve against.
    pub fn origin(&self) -> Result<Url> {
        let origin = std::env::var(ORIGIN_ENV)
            .ok()
            .or_else(|| self.origin.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No origin configured - set {} or run `offcache set-origin <url>`",
                    ORIGIN_ENV
                )
            })?;
        Url::parse(&origin).with_context(|| format!("Invalid origin URL: {}", origin))
    }
}
