//! Client configuration resolved from the process environment.

use std::env;
use std::time::Duration;

/// Environment variable names read by [`ClientConfig::from_env`].
pub mod env_vars {
    /// API key for the Z.ai platform
    pub const API_KEY: &str = "ZAI_API_KEY";

    /// Base URL of the chat completions API
    pub const BASE_URL: &str = "ZAI_BASE_URL";

    /// Vision model identifier
    pub const MODEL_VISION: &str = "ZAI_MODEL_VISION";

    /// Retries after the first attempt for rate-limited or unreachable requests
    pub const MAX_RETRIES: &str = "ZAI_MAX_RETRIES";

    /// Per-request timeout in milliseconds
    pub const TIMEOUT_MS: &str = "ZAI_TIMEOUT_MS";

    /// Log request and response bodies ("true" to enable)
    pub const DEBUG: &str = "ZAI_DEBUG";

    /// Log level for the CLI (error, warn, info, debug, trace)
    pub const LOG_LEVEL: &str = "ZAI_LOG_LEVEL";

    /// Disable colored log output
    pub const NO_COLOR: &str = "NO_COLOR";
}

pub const DEFAULT_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4";
pub const DEFAULT_MODEL: &str = "glm-4v";
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Settings shared by every request a client makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Bearer token; must be non-empty for a client to be built
    pub api_key: String,
    pub base_url: String,
    pub model_name: String,
    pub max_retries: u32,
    /// Always positive
    pub timeout_ms: u64,
    /// Log request and response bodies at debug level
    pub debug: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model_name: DEFAULT_MODEL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            debug: false,
        }
    }
}

impl ClientConfig {
    /// Create a config with the given API key and default settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Read every setting from the environment, falling back to defaults.
    ///
    /// Never fails: a missing key resolves to an empty string and malformed
    /// numbers resolve to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            api_key: lookup(env_vars::API_KEY).unwrap_or_default(),
            base_url: lookup(env_vars::BASE_URL)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.base_url),
            model_name: lookup(env_vars::MODEL_VISION)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.model_name),
            max_retries: lookup(env_vars::MAX_RETRIES)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_retries),
            timeout_ms: lookup(env_vars::TIMEOUT_MS)
                .and_then(|v| v.trim().parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.timeout_ms),
            debug: lookup(env_vars::DEBUG).as_deref() == Some("true"),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_name = model.into();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the per-request timeout. Zero is ignored.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        if timeout_ms > 0 {
            self.timeout_ms = timeout_ms;
        }
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Resolve the client configuration from the environment.
pub fn resolve() -> ClientConfig {
    ClientConfig::from_env()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> ClientConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = from_pairs(&[]);
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api_key, "");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model_name, "glm-4v");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout_ms, 30_000);
        assert!(!config.debug);
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_reads_all_variables() {
        let config = from_pairs(&[
            (env_vars::API_KEY, "secret"),
            (env_vars::BASE_URL, "http://localhost:9000/v4"),
            (env_vars::MODEL_VISION, "glm-4v-plus"),
            (env_vars::MAX_RETRIES, "5"),
            (env_vars::TIMEOUT_MS, "1500"),
            (env_vars::DEBUG, "true"),
        ]);

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.base_url, "http://localhost:9000/v4");
        assert_eq!(config.model_name, "glm-4v-plus");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.timeout(), Duration::from_millis(1500));
        assert!(config.debug);
    }

    #[test]
    fn test_debug_requires_exact_true() {
        assert!(!from_pairs(&[(env_vars::DEBUG, "TRUE")]).debug);
        assert!(!from_pairs(&[(env_vars::DEBUG, "1")]).debug);
        assert!(!from_pairs(&[(env_vars::DEBUG, "yes")]).debug);
    }

    #[test]
    fn test_malformed_numbers_fall_back() {
        let config = from_pairs(&[
            (env_vars::MAX_RETRIES, "-1"),
            (env_vars::TIMEOUT_MS, "0"),
        ]);
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);

        let config = from_pairs(&[(env_vars::TIMEOUT_MS, "soon")]);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::new("key")
            .with_base_url("http://127.0.0.1:1")
            .with_model("glm-4v-flash")
            .with_max_retries(0)
            .with_timeout_ms(0)
            .with_debug(true);

        assert!(config.has_api_key());
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(config.model_name, "glm-4v-flash");
        assert!(config.debug);
    }
}
