pub mod validation;

use serde::{Deserialize, Serialize};

use self::validation::validate_config;

/// Error type for configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Chat endpoint and HTTP client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub url: String,
    pub authorization: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    #[serde(default = "default_http_pool_max_idle_per_host")]
    pub http_pool_max_idle_per_host: usize,
    #[serde(default = "default_http_pool_idle_timeout_secs")]
    pub http_pool_idle_timeout_secs: u64,
}

fn default_connect_timeout_secs() -> u64 {
    5
}
fn default_read_timeout_secs() -> u64 {
    120
}
fn default_http_pool_max_idle_per_host() -> usize {
    16
}
fn default_http_pool_idle_timeout_secs() -> u64 {
    15
}

/// Conversation behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default)]
    pub web_search: bool,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_model() -> String {
    "auto".to_string()
}
fn default_history_limit() -> usize {
    20
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            web_search: false,
            history_limit: default_history_limit(),
        }
    }
}

/// Feature flags and settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default)]
    pub features: FeaturesConfig,
}

/// Load configuration from a YAML file and validate it.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when reading the file fails, [`ConfigError::Yaml`]
/// when parsing fails, or [`ConfigError::Validation`] when semantic validation fails.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml::from_str(&contents)?;
    validate_config(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_example_config() {
        // The example config should load and validate successfully
        let config = load_config("config.example.yaml");
        assert!(
            config.is_ok(),
            "Failed to load example config: {:?}",
            config.err()
        );
        let config = config.unwrap();
        assert_eq!(config.endpoint.connect_timeout_secs, 5);
        assert_eq!(config.endpoint.read_timeout_secs, 120);
        assert_eq!(config.chat.default_model, "auto");
        assert_eq!(config.chat.history_limit, 20);
        assert!(!config.chat.web_search);
        assert_eq!(config.features.log_level, "INFO");
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str(
            "endpoint:\n  url: \"https://chat.example.com/api/chat\"\n  authorization: \"secret\"\n",
        )
        .unwrap();
        assert_eq!(config.chat.default_model, "auto");
        assert_eq!(config.chat.history_limit, 20);
        assert_eq!(config.endpoint.http_pool_max_idle_per_host, 16);
        assert_eq!(config.endpoint.http_pool_idle_timeout_secs, 15);
    }

    #[test]
    fn test_chat_settings_default() {
        let settings = ChatSettings::default();
        assert_eq!(settings.default_model, "auto");
        assert!(!settings.web_search);
        assert_eq!(settings.history_limit, 20);
    }
}
