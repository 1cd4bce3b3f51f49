//! TOML configuration.
//!
//! Every section and every field has a default, so a config file only needs
//! to mention what it changes. A missing file is the same as an empty one.

use crate::models::MediaType;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub logging: LoggingConfig,
    pub anilist: AniListConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Base for relative paths such as the log directory
    pub root_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Relative to `data.root_dir` unless absolute
    pub log_dir: PathBuf,
    /// trace, debug, info, warn or error
    pub default_level: String,
    pub console: bool,
    pub file: bool,
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            default_level: "info".to_string(),
            console: true,
            file: true,
            json_format: false,
        }
    }
}

/// AniList endpoint and client behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AniListConfig {
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Extra attempts after a transient failure
    pub max_retries: u32,
    /// First backoff delay; doubles on each retry
    pub retry_delay_ms: u64,
    pub rate_limit: RateLimitConfig,
}

impl Default for AniListConfig {
    fn default() -> Self {
        Self {
            base_url: "https://graphql.anilist.co".to_string(),
            user_agent: concat!("media-feed/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 30,
            max_retries: 2,
            retry_delay_ms: 500,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub requests_per_second: f64,
    pub requests_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        // AniList allows 90 requests per minute
        Self {
            requests_per_second: 2.0,
            requests_per_minute: 80,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Media type loaded when none is given
    pub default_media_type: MediaType,
    /// Upper bound on a single list query, retries included
    pub query_timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_media_type: MediaType::Anime,
            query_timeout_secs: 60,
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file is absent
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Like [`Config::from_file`], but a broken file also means defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::from_file(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load config, using defaults");
            Self::default()
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    pub fn log_dir(&self) -> PathBuf {
        if self.logging.log_dir.is_absolute() {
            self.logging.log_dir.clone()
        } else {
            self.data.root_dir.join(&self.logging.log_dir)
        }
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.dashboard.query_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.root_dir, PathBuf::from("data"));
        assert_eq!(config.anilist.base_url, "https://graphql.anilist.co");
        assert!(config.anilist.user_agent.starts_with("media-feed/"));
        assert_eq!(config.anilist.rate_limit.requests_per_second, 2.0);
        assert_eq!(config.dashboard.default_media_type, MediaType::Anime);
        assert_eq!(config.query_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_save_and_load_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let mut original = Config::default();
        original.dashboard.default_media_type = MediaType::Manga;
        original.anilist.max_retries = 5;
        original.save(&config_path)?;

        let loaded = Config::from_file(&config_path)?;
        assert_eq!(loaded.data.root_dir, original.data.root_dir);
        assert_eq!(loaded.anilist.max_retries, 5);
        assert_eq!(loaded.dashboard.default_media_type, MediaType::Manga);

        Ok(())
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[dashboard]\ndefault_media_type = \"MANGA\"\n\n[anilist.rate_limit]\nrequests_per_minute = 30\n",
        )?;

        let config = Config::from_file(&config_path)?;
        assert_eq!(config.dashboard.default_media_type, MediaType::Manga);
        assert_eq!(config.dashboard.query_timeout_secs, 60);
        assert_eq!(config.anilist.rate_limit.requests_per_minute, 30);
        assert_eq!(config.anilist.rate_limit.requests_per_second, 2.0);
        assert_eq!(config.logging.default_level, "info");

        Ok(())
    }

    #[test]
    fn test_broken_file_is_an_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[dashboard\n")?;

        assert!(Config::from_file(&config_path).is_err());
        assert_eq!(
            Config::load_or_default(&config_path).anilist.base_url,
            "https://graphql.anilist.co"
        );

        Ok(())
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.dashboard.query_timeout_secs, 60);
    }

    #[test]
    fn test_log_dir_resolution() {
        let mut config = Config::default();
        assert_eq!(config.log_dir(), PathBuf::from("data/logs"));

        config.logging.log_dir = PathBuf::from("/var/log/media-feed");
        assert_eq!(config.log_dir(), PathBuf::from("/var/log/media-feed"));
    }
}
