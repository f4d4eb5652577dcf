//! # Configuration Management Module
//!
//! Type-safe TOML configuration for the puzzle hall engine. Every section and
//! field has a default, so a partial (or missing) file still yields a working
//! setup that serves the three stock halls from `./halls`.
//!
//! ## Configuration Structure
//!
//! - [`HallsConfig`] - Known hall ids and where their documents live
//! - [`StorageConfig`] - Location of the persisted progress slot
//! - [`LoggingConfig`] - Logging level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use puzzlehall::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Write a starter file, then load it back
//!     Config::create_default("config.toml").await?;
//!     let config = Config::load("config.toml").await?;
//!
//!     println!("Halls: {:?}", config.halls.ids);
//!     println!("Progress file: {}", config.storage.progress_file);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [halls]
//! ids = ["nate", "erik", "patty"]
//! source = "dir"
//! content_dir = "./halls"
//!
//! [storage]
//! progress_file = "./data/puzzleHouseProgress.json"
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Stock hall ids, in display order.
pub const DEFAULT_HALL_IDS: [&str; 3] = ["nate", "erik", "patty"];

/// Name of the single durable slot holding serialized progress.
pub const PROGRESS_SLOT: &str = "puzzleHouseProgress";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub halls: HallsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The known, fixed set of halls and their content source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HallsConfig {
    /// Hall ids in the order they are offered to the player. The first one is
    /// selected at startup.
    pub ids: Vec<String>,
    /// `"dir"` (read `<content_dir>/<id>.json`) or `"http"` (GET `<base_url>/<id>.json`).
    pub source: String,
    pub content_dir: String,
    pub base_url: String,
    /// Request timeout for the HTTP source.
    pub timeout_seconds: u64,
}

impl Default for HallsConfig {
    fn default() -> Self {
        Self {
            ids: DEFAULT_HALL_IDS.iter().map(|s| s.to_string()).collect(),
            source: "dir".to_string(),
            content_dir: "./halls".to_string(),
            base_url: String::new(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub progress_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            progress_file: format!("./data/{}.json", PROGRESS_SLOT),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Parse the configured level; unknown values fall back to `Info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        Self::from_toml(&content).map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))
    }

    /// Parse configuration from TOML text and check it.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.halls.ids.is_empty() {
            return Err(anyhow!("halls.ids must list at least one hall"));
        }
        for id in &self.halls.ids {
            crate::validation::validate_hall_id(id)
                .map_err(|e| anyhow!("halls.ids entry '{}': {}", id, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.halls.ids, vec!["nate", "erik", "patty"]);
        assert_eq!(config.halls.source, "dir");
        assert_eq!(
            config.storage.progress_file,
            "./data/puzzleHouseProgress.json"
        );
        assert_eq!(config.logging.level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [halls]
            ids = ["east", "west"]

            [logging]
            level = "debug"
            "#,
        )
        .expect("parse");
        assert_eq!(config.halls.ids, vec!["east", "west"]);
        assert_eq!(config.halls.content_dir, "./halls");
        assert_eq!(config.halls.timeout_seconds, 10);
        assert_eq!(config.logging.level_filter(), log::LevelFilter::Debug);
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::from_toml("").expect("parse");
        assert_eq!(config.halls.ids.len(), 3);
    }

    #[test]
    fn test_invalid_hall_ids_rejected() {
        assert!(Config::from_toml("[halls]\nids = []").is_err());
        assert!(Config::from_toml("[halls]\nids = [\"../up\"]").is_err());
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        let logging = LoggingConfig {
            level: "loud".into(),
            file: None,
        };
        assert_eq!(logging.level_filter(), log::LevelFilter::Info);
    }

    #[tokio::test]
    async fn test_create_default_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        let path = path.to_str().unwrap();

        Config::create_default(path).await.expect("write");
        let config = Config::load(path).await.expect("load");
        assert_eq!(config.halls.ids, Config::default().halls.ids);
        assert_eq!(config.storage.progress_file, Config::default().storage.progress_file);
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        assert!(Config::load("/nonexistent/puzzlehall.toml").await.is_err());
    }
}
