//! Application configuration management.
//!
//! Configuration is stored at `~/.config/tallybook/config.json`. Every field
//! is optional; environment variables override what the file says.
//!
//! | Variable                 | Field          |
//! |--------------------------|----------------|
//! | `TALLYBOOK_DATA_DIR`     | `data_dir`     |
//! | `TALLYBOOK_EXPORT_DIR`   | `export_dir`   |
//! | `TALLYBOOK_ASSET_ORIGIN` | `asset_origin` |

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/data/cache directory paths
const APP_NAME: &str = "tallybook";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Where the asset worker fetches from when nothing is configured
pub const DEFAULT_ASSET_ORIGIN: &str = "http://localhost:8080/";

pub const ENV_DATA_DIR: &str = "TALLYBOOK_DATA_DIR";
pub const ENV_EXPORT_DIR: &str = "TALLYBOOK_EXPORT_DIR";
pub const ENV_ASSET_ORIGIN: &str = "TALLYBOOK_ASSET_ORIGIN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
    #[serde(default)]
    pub asset_origin: Option<String>,
}

impl Config {
    /// Load the config file (defaults if absent), then apply env overrides
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the environment in practice)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = lookup(ENV_EXPORT_DIR) {
            self.export_dir = Some(PathBuf::from(dir));
        }
        if let Some(origin) = lookup(ENV_ASSET_ORIGIN) {
            self.asset_origin = Some(origin);
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the persisted ledger
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Directory for CSV exports, the working directory by default
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Directory holding asset cache buckets and log files
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn asset_origin(&self) -> &str {
        self.asset_origin.as_deref().unwrap_or(DEFAULT_ASSET_ORIGIN)
    }
}
