use crate::config::types::{Config, HarvestConfig, OutputConfig, SeedEntry, UserAgentConfig};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Placeholder for the seed URL (without trailing slash) in `page-url-template`
pub const SEED_PLACEHOLDER: &str = "{seed}";

/// Placeholder for the 1-based page number in `page-url-template`
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_harvest_config(&config.harvest)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_seeds(&config.seeds)?;
    Ok(())
}

/// Validates the two parameters every run needs
///
/// Also used for command-line overrides, which bypass the config file.
pub fn validate_run_parameters(pool_size: usize, request_limit: u64) -> Result<(), ConfigError> {
    if pool_size < 1 {
        return Err(ConfigError::Validation(format!(
            "pool_size must be >= 1, got {}",
            pool_size
        )));
    }

    if request_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "request_limit must be >= 1, got {}",
            request_limit
        )));
    }

    Ok(())
}

fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    validate_run_parameters(config.pool_size, config.request_limit)?;

    if config.pending_seed_cap < 1 {
        return Err(ConfigError::Validation(format!(
            "pending_seed_cap must be >= 1, got {}",
            config.pending_seed_cap
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if let Some(template) = &config.page_url_template {
        if !template.contains(PAGE_PLACEHOLDER) {
            return Err(ConfigError::Validation(format!(
                "page_url_template must contain {}, got '{}'",
                PAGE_PLACEHOLDER, template
            )));
        }
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

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("database_path", &config.database_path),
        ("csv_path", &config.csv_path),
        ("json_path", &config.json_path),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

/// Validates seed entries: unique non-empty ids and http(s) URLs
fn validate_seeds(seeds: &[SeedEntry]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for seed in seeds {
        if seed.id.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "Seed for '{}' has an empty id",
                seed.page_url
            )));
        }

        if !seen.insert(seed.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Duplicate seed id '{}'",
                seed.id
            )));
        }

        let url = Url::parse(&seed.page_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed.page_url, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use http or https",
                seed.page_url
            )));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::Validation(format!("Invalid email format: '{}'", email));

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
