use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::query_cache::DEFAULT_MAX_ENTRIES;
use crate::refresh::DEFAULT_PAGE_SIZE;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Client tuning. Every field has a default, so a partial `config.yaml`
/// only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Albums fetched per grid page
    pub page_size: u32,
    /// Album list header search box
    pub search_debounce_ms: u64,
    /// Search page header input
    pub search_header_debounce_ms: u64,
    pub genre_debounce_ms: u64,
    pub year_debounce_ms: u64,
    /// Card size slider
    pub grid_size_throttle_ms: u64,
    /// How long a fetched page is served from cache
    pub query_stale_secs: u64,
    /// Cached queries kept per cache before the oldest is dropped
    pub query_cache_max_entries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: 500,
            search_header_debounce_ms: 200,
            genre_debounce_ms: 250,
            year_debounce_ms: 500,
            grid_size_throttle_ms: 200,
            query_stale_secs: 60,
            query_cache_max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl Config {
    /// Dev mode (`SONIXD_DEV_MODE` set or a `.env` present) reads `SONIXD_*`
    /// variables; otherwise the user's `config.yaml` is used if it exists.
    pub fn load() -> Self {
        let dev_mode = std::env::var("SONIXD_DEV_MODE").is_ok() || dotenvy::dotenv().is_ok();
        if dev_mode {
            info!("Dev mode activated - loading from environment");
            Self::from_env()
        } else {
            Self::from_config_file()
        }
    }

    fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            page_size: env_or("SONIXD_PAGE_SIZE", defaults.page_size),
            search_debounce_ms: env_or("SONIXD_SEARCH_DEBOUNCE_MS", defaults.search_debounce_ms),
            search_header_debounce_ms: env_or(
                "SONIXD_SEARCH_HEADER_DEBOUNCE_MS",
                defaults.search_header_debounce_ms,
            ),
            genre_debounce_ms: env_or("SONIXD_GENRE_DEBOUNCE_MS", defaults.genre_debounce_ms),
            year_debounce_ms: env_or("SONIXD_YEAR_DEBOUNCE_MS", defaults.year_debounce_ms),
            grid_size_throttle_ms: env_or(
                "SONIXD_GRID_SIZE_THROTTLE_MS",
                defaults.grid_size_throttle_ms,
            ),
            query_stale_secs: env_or("SONIXD_QUERY_STALE_SECS", defaults.query_stale_secs),
            query_cache_max_entries: env_or(
                "SONIXD_QUERY_CACHE_MAX_ENTRIES",
                defaults.query_cache_max_entries,
            ),
        };
        match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!("Ignoring environment config: {}", e);
                defaults
            }
        }
    }

    fn from_config_file() -> Self {
        let Some(path) = Self::config_path() else {
            warn!("No config directory on this platform, using defaults");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring unreadable {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// `<config dir>/sonixd/config.yaml`
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sonixd").join("config.yaml"))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml =
            serde_yaml::to_string(self).map_err(|e| ConfigError::Serialization(e.to_string()))?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Config("page_size must be at least 1".into()));
        }
        if self.query_cache_max_entries == 0 {
            return Err(ConfigError::Config(
                "query_cache_max_entries must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn search_header_debounce(&self) -> Duration {
        Duration::from_millis(self.search_header_debounce_ms)
    }

    pub fn genre_debounce(&self) -> Duration {
        Duration::from_millis(self.genre_debounce_ms)
    }

    pub fn year_debounce(&self) -> Duration {
        Duration::from_millis(self.year_debounce_ms)
    }

    pub fn grid_size_throttle(&self) -> Duration {
        Duration::from_millis(self.grid_size_throttle_ms)
    }

    pub fn query_stale_time(&self) -> Duration {
        Duration::from_secs(self.query_stale_secs)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value.parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={}", key, value);
            default
        }),
        _ => default,
    }
}
