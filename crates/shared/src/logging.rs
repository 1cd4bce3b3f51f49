//! Tracing setup for the media-feed binaries.
//!
//! Console output goes to stderr so that list output on stdout stays clean.
//! File output rotates daily and is written through a background worker;
//! keep the returned [`LogGuard`] alive until exit or buffered lines are lost.

use crate::config::Config;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::{Layered, SubscriberExt},
    registry::Registry,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

type BoxedLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

/// Where and how a component logs
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_dir: PathBuf,
    /// Log file prefix; also the crate target that gets `level`
    pub component: String,
    pub level: Level,
    pub console: bool,
    pub file: bool,
    /// Write file logs as JSON lines
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("data/logs"),
            component: "media-feed".to_string(),
            level: Level::INFO,
            console: true,
            file: true,
            json: false,
        }
    }
}

impl LogConfig {
    /// Build from the `[logging]` section; an unparseable level means INFO
    pub fn from_config(config: &Config, component: &str) -> Self {
        Self {
            log_dir: config.log_dir(),
            component: component.to_string(),
            level: config.logging.default_level.parse().unwrap_or(Level::INFO),
            console: config.logging.console,
            file: config.logging.file,
            json: config.logging.json_format,
        }
    }

    fn filter_directives(&self) -> String {
        let target = self.component.replace('-', "_");
        format!(
            "{target}={level},shared={level},hyper=warn,reqwest=warn,h2=warn",
            level = self.level
        )
    }

    fn console_layer(&self) -> BoxedLayer {
        fmt::layer()
            .with_target(true)
            .with_span_events(FmtSpan::NONE)
            .with_writer(std::io::stderr)
            .boxed()
    }

    fn file_layer(&self) -> Result<(BoxedLayer, WorkerGuard)> {
        std::fs::create_dir_all(&self.log_dir).with_context(|| {
            format!("Failed to create log directory: {}", self.log_dir.display())
        })?;

        let appender = tracing_appender::rolling::daily(&self.log_dir, &self.component);
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let layer = if self.json {
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .with_writer(writer)
                .boxed()
        } else {
            fmt::layer().with_ansi(false).with_writer(writer).boxed()
        };
        Ok((layer, guard))
    }
}

/// Flushes file logs when dropped
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber
///
/// `RUST_LOG`, when set, replaces the configured filter.
pub fn init(config: LogConfig) -> Result<LogGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directives()));

    let mut layers = Vec::new();
    if config.console {
        layers.push(config.console_layer());
    }

    let mut file_guard = None;
    if config.file {
        let (layer, guard) = config.file_layer()?;
        layers.push(layer);
        file_guard = Some(guard);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::debug!(
        component = %config.component,
        log_dir = %config.log_dir.display(),
        level = %config.level,
        "Logging initialized"
    );

    Ok(LogGuard { _file: file_guard })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_config_resolves_paths_and_level() {
        let mut config = Config::default();
        config.logging.default_level = "debug".to_string();
        config.logging.json_format = true;

        let log_config = LogConfig::from_config(&config, "media-feed");
        assert_eq!(log_config.level, Level::DEBUG);
        assert!(log_config.json);
        assert!(log_config.log_dir.ends_with("data/logs"));
    }

    #[test]
    fn test_bad_level_falls_back_to_info() {
        let mut config = Config::default();
        config.logging.default_level = "loud".to_string();

        let log_config = LogConfig::from_config(&config, "media-feed");
        assert_eq!(log_config.level, Level::INFO);
    }

    #[test]
    fn test_filter_uses_crate_target_name() {
        let log_config = LogConfig {
            level: Level::WARN,
            ..Default::default()
        };
        let directives = log_config.filter_directives();
        assert!(directives.starts_with("media_feed=WARN,"));
        assert!(directives.contains("shared=WARN"));
    }

    #[test]
    fn test_file_layer_creates_log_dir() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let log_config = LogConfig {
            log_dir: temp_dir.path().join("nested/logs"),
            ..Default::default()
        };

        let (_layer, _guard) = log_config.file_layer()?;
        assert!(log_config.log_dir.is_dir());
        Ok(())
    }
}
