//! Configuration loading from files and environment variables
//!
//! Environment variables take precedence over the config file so container
//! deployments can tune the aggregator without editing files:
//! - `DIALER_STATS_WINDOW_SIZE`
//! - `DIALER_STATS_HISTORY_POINTS`
//! - `DIALER_STATS_METRIC`
//! - `DIALER_STATS_CHANNEL_CAPACITY`

use anyhow::Result;

use super::types::Config;
use crate::constants::env;
use crate::types::{ChannelCapacity, HistoryPoints, MetricName, WindowSize};

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Loaded from a TOML file (environment overrides may apply on top)
    File(String),
    /// No file; built from defaults plus environment variables
    Environment,
    /// No file and no environment variables
    Default,
}

impl ConfigSource {
    /// Human-readable description for startup logs
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::File(path) => format!("config file '{}'", path),
            Self::Environment => "environment variables".to_string(),
            Self::Default => "built-in defaults".to_string(),
        }
    }
}

/// Check whether any configuration environment variable is set
#[must_use]
pub fn has_env_overrides() -> bool {
    [
        env::WINDOW_SIZE,
        env::HISTORY_POINTS,
        env::METRIC,
        env::CHANNEL_CAPACITY,
    ]
    .iter()
    .any(|key| std::env::var(key).is_ok())
}

/// Apply overrides read through `lookup`
///
/// `lookup` is `std::env::var` in production; tests pass a map so they do
/// not race on the process environment.
pub fn apply_env_overrides_from<F>(config: &mut Config, lookup: F) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = false;

    if let Some(raw) = lookup(env::WINDOW_SIZE) {
        config.aggregator.window_size = raw
            .parse::<WindowSize>()
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", env::WINDOW_SIZE, e))?;
        applied = true;
    }

    if let Some(raw) = lookup(env::HISTORY_POINTS) {
        config.aggregator.history_points = raw
            .parse::<HistoryPoints>()
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", env::HISTORY_POINTS, e))?;
        applied = true;
    }

    if let Some(raw) = lookup(env::METRIC) {
        config.source.metric = MetricName::parse(raw)
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", env::METRIC, e))?;
        applied = true;
    }

    if let Some(raw) = lookup(env::CHANNEL_CAPACITY) {
        config.source.channel_capacity = raw
            .parse::<ChannelCapacity>()
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", env::CHANNEL_CAPACITY, e))?;
        applied = true;
    }

    Ok(applied)
}

fn apply_env_overrides(config: &mut Config) -> Result<bool> {
    let applied = apply_env_overrides_from(config, |key| std::env::var(key).ok())?;
    if applied {
        tracing::info!("Applied configuration overrides from environment variables");
    }
    Ok(applied)
}

/// Parse a TOML string into a validated configuration
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config =
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a TOML file, with environment variable overrides
pub fn load_config(config_path: &str) -> Result<Config> {
    let config_content = std::fs::read_to_string(config_path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", config_path, e))?;

    let mut config: Config = toml::from_str(&config_content)
        .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", config_path, e))?;

    apply_env_overrides(&mut config)?;
    config.validate()?;

    Ok(config)
}

/// Load configuration from defaults plus environment variables
pub fn load_config_from_env() -> Result<Config> {
    let mut config = create_default_config();
    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration, falling back when the file does not exist
///
/// 1. The file at `config_path`, if it exists
/// 2. Defaults plus environment variables, if any are set
/// 3. Built-in defaults
///
/// A file that exists but fails to parse is an error, never a fallback.
pub fn load_config_with_fallback(config_path: &str) -> Result<(Config, ConfigSource)> {
    if std::path::Path::new(config_path).exists() {
        let config = load_config(config_path)?;
        return Ok((config, ConfigSource::File(config_path.to_string())));
    }

    if has_env_overrides() {
        let config = load_config_from_env()?;
        return Ok((config, ConfigSource::Environment));
    }

    tracing::debug!(
        "Config file '{}' not found, using built-in defaults",
        config_path
    );
    Ok((create_default_config(), ConfigSource::Default))
}

/// Create the default configuration
#[must_use]
pub fn create_default_config() -> Config {
    Config::default()
}
