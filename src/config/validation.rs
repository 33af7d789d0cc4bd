use super::{AppConfig, ConfigError};

/// Validate the full application config, returning an error if any rule is violated.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] when any configuration invariant is violated.
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    validate_endpoint(config)?;
    validate_chat_settings(config)?;
    validate_log_level(config)?;
    Ok(())
}

fn validation_err(msg: impl Into<String>) -> ConfigError {
    ConfigError::Validation(msg.into())
}

fn validate_endpoint(config: &AppConfig) -> Result<(), ConfigError> {
    let endpoint = &config.endpoint;
    let parsed = url::Url::parse(&endpoint.url)
        .map_err(|err| validation_err(format!("endpoint.url is not a valid URL: {err}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(validation_err("endpoint.url must use http:// or https://"));
    }
    if endpoint.authorization.trim().is_empty() {
        return Err(validation_err("endpoint.authorization cannot be empty"));
    }
    if endpoint.connect_timeout_secs == 0 {
        return Err(validation_err(
            "endpoint.connect_timeout_secs must be greater than 0",
        ));
    }
    if endpoint.read_timeout_secs == 0 {
        return Err(validation_err(
            "endpoint.read_timeout_secs must be greater than 0",
        ));
    }
    if endpoint.http_pool_max_idle_per_host == 0 {
        return Err(validation_err(
            "endpoint.http_pool_max_idle_per_host must be greater than 0",
        ));
    }
    Ok(())
}

fn validate_chat_settings(config: &AppConfig) -> Result<(), ConfigError> {
    let chat = &config.chat;
    if chat.default_model.trim().is_empty() {
        return Err(validation_err("chat.default_model cannot be empty"));
    }
    if chat.history_limit == 0 {
        return Err(validation_err(
            "chat.history_limit must be greater than 0",
        ));
    }
    Ok(())
}

fn validate_log_level(config: &AppConfig) -> Result<(), ConfigError> {
    let valid_levels = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL", "DISABLED"];
    if !valid_levels.contains(&config.features.log_level.to_uppercase().as_str()) {
        return Err(validation_err(format!(
            "log_level must be one of {valid_levels:?}"
        )));
    }
    Ok(())
}
