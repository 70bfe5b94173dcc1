use crate::config::types::{Config, ScraperConfig};
use crate::ConfigError;
use regex::Regex;
use std::net::SocketAddr;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_listen_address(&config.listen_address)?;
    validate_scraper_config(&config.scraper)?;
    Ok(())
}

/// Validates the reloadable crawler section
pub fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if config.maxage < 0 {
        return Err(ConfigError::Validation(format!(
            "maxage must be >= 0, got {}",
            config.maxage
        )));
    }

    validate_seeds(&config.seeds)?;
    validate_url_filters(&config.url_filters)?;
    Ok(())
}

/// Validates the listen address of the HTTP surface
fn validate_listen_address(address: &str) -> Result<(), ConfigError> {
    address.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!("Invalid listen-address '{}': {}", address, e))
    })?;
    Ok(())
}

/// Validates seed URLs: absolute, http or https
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    for seed in seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Seed URL '{}' must use http or https",
                seed
            )));
        }
    }
    Ok(())
}

/// Compiles every filter once so a typo fails at load time instead of mid-crawl
fn validate_url_filters(patterns: &[String]) -> Result<(), ConfigError> {
    for pattern in patterns {
        Regex::new(pattern)
            .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;
    }
    Ok(())
}
