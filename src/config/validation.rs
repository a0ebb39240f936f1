use crate::config::types::{Config, PipelineConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on the configured worker count
const MAX_WORKERS: i64 = 256;

/// Upper bound on the configured frontier queue capacity
const MAX_QUEUE_CAPACITY: usize = 1 << 20;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_pipeline_config(&config.pipeline)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_seeds(&config.seeds)?;
    Ok(())
}

/// Validates worker pool configuration
fn validate_pipeline_config(config: &PipelineConfig) -> Result<(), ConfigError> {
    // Non-positive worker counts fall back to the default, so only the ceiling is checked
    if config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be at most {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.queue_capacity > MAX_QUEUE_CAPACITY {
        return Err(ConfigError::Validation(format!(
            "queue_capacity must be at most {}, got {}",
            MAX_QUEUE_CAPACITY, config.queue_capacity
        )));
    }

    if config.fetch_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "fetch_timeout_ms must be > 0".to_string(),
        ));
    }

    if config.follow_links && config.max_pages == 0 {
        return Err(ConfigError::Validation(
            "follow_links requires max_pages > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
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

    Ok(())
}

/// Validates seed URLs: each must be an absolute http(s) URL
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    for seed in seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use http or https",
                seed
            )));
        }
    }

    Ok(())
}
