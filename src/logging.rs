use crate::config::env_vars;
use anyhow::Result;
use std::env;
use tracing::Level;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Logging setup for the command-line front-end. Logs go to stderr so stdout
/// carries only command output.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    pub use_colors: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            use_colors: true,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.use_colors = enabled;
        self
    }

    /// Create config from `ZAI_LOG_LEVEL`, `ZAI_DEBUG` and `NO_COLOR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(level) = lookup(env_vars::LOG_LEVEL) {
            config.level = parse_level(&level).unwrap_or(config.level);
        }

        // ZAI_DEBUG only surfaces wire bodies if debug events get through.
        if lookup(env_vars::DEBUG).as_deref() == Some("true") && config.level < Level::DEBUG {
            config.level = Level::DEBUG;
        }

        if lookup(env_vars::NO_COLOR).is_some() {
            config.use_colors = false;
        }

        config
    }
}

fn parse_level(value: &str) -> Option<Level> {
    match value.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.use_colors)
        .with_target(false)
        .with_filter(LevelFilter::from_level(config.level));

    tracing_subscriber::registry().with(layer).try_init()?;

    tracing::debug!(level = ?config.level, "Logging initialized");
    Ok(())
}

pub fn init_from_env() -> Result<()> {
    init_logging(LoggingConfig::from_env())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> LoggingConfig {
        let vars: HashMap<&str, &str> = pairs.iter().copied().collect();
        LoggingConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn test_default_is_warn() {
        let config = from_pairs(&[]);
        assert_eq!(config.level, Level::WARN);
        assert!(config.use_colors);
    }

    #[test]
    fn test_log_level_from_env() {
        assert_eq!(from_pairs(&[(env_vars::LOG_LEVEL, "INFO")]).level, Level::INFO);
        assert_eq!(from_pairs(&[(env_vars::LOG_LEVEL, "trace")]).level, Level::TRACE);
        assert_eq!(from_pairs(&[(env_vars::LOG_LEVEL, "loud")]).level, Level::WARN);
    }

    #[test]
    fn test_debug_flag_raises_level() {
        let config = from_pairs(&[(env_vars::DEBUG, "true")]);
        assert_eq!(config.level, Level::DEBUG);

        let config = from_pairs(&[(env_vars::DEBUG, "true"), (env_vars::LOG_LEVEL, "trace")]);
        assert_eq!(config.level, Level::TRACE);
    }

    #[test]
    fn test_no_color() {
        assert!(!from_pairs(&[(env_vars::NO_COLOR, "1")]).use_colors);
    }

    #[test]
    fn test_builder() {
        let config = LoggingConfig::default()
            .with_level(Level::ERROR)
            .with_colors(false);
        assert_eq!(config.level, Level::ERROR);
        assert!(!config.use_colors);
    }
}
