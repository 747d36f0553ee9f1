use crate::config::types::{
    ApiConfig, CollectorConfig, Config, OutputConfig, SchedulerConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Upper bound on contests per run, matching the API's page size ceiling
const MAX_LIMIT: usize = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_collector_config(&config.collector)?;
    validate_scheduler_config(&config.scheduler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_api_config(&config.api)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates collector configuration
fn validate_collector_config(config: &CollectorConfig) -> Result<(), ConfigError> {
    if config.platform.trim().is_empty() {
        return Err(ConfigError::Validation(
            "platform cannot be empty".to_string(),
        ));
    }

    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", config.base_url, e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    Url::parse(&config.contests_url()).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid contests_path '{}': {}", config.contests_path, e))
    })?;

    if config.limit < 1 || config.limit > MAX_LIMIT {
        return Err(ConfigError::Validation(format!(
            "limit must be between 1 and {}, got {}",
            MAX_LIMIT, config.limit
        )));
    }

    if config.max_concurrent < 1 || config.max_concurrent > 32 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent must be between 1 and 32, got {}",
            config.max_concurrent
        )));
    }

    if config.request_timeout_secs < 1 || config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request and connect timeouts must be >= 1s".to_string(),
        ));
    }

    Ok(())
}

/// Validates scheduler intervals
fn validate_scheduler_config(config: &SchedulerConfig) -> Result<(), ConfigError> {
    if config.interval_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "interval_secs must be >= 1, got {}",
            config.interval_secs
        )));
    }

    if config.backoff_secs < 1 || config.backoff_secs > config.interval_secs {
        return Err(ConfigError::Validation(format!(
            "backoff_secs must be between 1 and interval_secs ({}), got {}",
            config.interval_secs, config.backoff_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates API server configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    if !config.enabled {
        return Ok(());
    }

    if config.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation(
            "bind_address cannot be empty".to_string(),
        ));
    }

    if config.workers < 1 || config.workers > 64 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 64, got {}",
            config.workers
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.raw_data_dir.is_empty() {
        return Err(ConfigError::Validation(
            "raw_data_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
