use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Zero/empty crawler fields are filled with their defaults after validation.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use seedwatch::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Max depth: {}", config.scraper.max_depth);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let mut config: Config = toml::from_str(content)?;

    validate(&config)?;

    config.scraper = config.scraper.with_defaults();
    Ok(config)
}

/// Hex-encoded SHA-256 of the configuration text
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Loads a configuration and returns both the config and its hash
///
/// The file is read once, so the hash always describes the parsed content.
/// The reload listener compares hashes to skip swaps when the file is unchanged.
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{DEFAULT_MAXAGE, DEFAULT_USER_AGENT};
    use crate::ConfigError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
listen-address = "127.0.0.1:9000"

[scraper]
save-file = "./snapshot.json"
maxage = 600
verbose = true
user-agent = "TestBot/1.0"
max-depth = 3
url-filters = ["^https://example\\.com/"]
seeds = ["https://example.com/", "https://example.com/blog"]
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.listen_address, "127.0.0.1:9000");
        assert_eq!(config.scraper.save_file, "./snapshot.json");
        assert_eq!(config.scraper.maxage, 600);
        assert!(config.scraper.verbose);
        assert!(!config.scraper.debug);
        assert_eq!(config.scraper.user_agent, "TestBot/1.0");
        assert_eq!(config.scraper.max_depth, 3);
        assert_eq!(config.scraper.url_filters.len(), 1);
        assert_eq!(config.scraper.seeds.len(), 2);
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let config = parse_config("[scraper]\nseeds = [\"https://example.com/\"]\n").unwrap();

        assert_eq!(config.listen_address, "127.0.0.1:8080");
        assert_eq!(config.scraper.maxage, DEFAULT_MAXAGE);
        assert_eq!(config.scraper.user_agent, DEFAULT_USER_AGENT);
        assert!(config.scraper.save_file.is_empty());
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_bad_filter() {
        let file = create_temp_config("[scraper]\nurl-filters = [\"[a-\"]\n");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::InvalidPattern(_))));
    }

    #[test]
    fn test_hash_content_is_stable_sha256() {
        let hash1 = hash_content("test content");
        let hash2 = hash_content("test content");

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
        assert_ne!(hash1, hash_content("other content"));
    }

    #[test]
    fn test_load_config_with_hash_matches_file_hash() {
        let content = "[scraper]\nmaxage = 10\n";
        let file = create_temp_config(content);

        let (config, hash) = load_config_with_hash(file.path()).unwrap();

        assert_eq!(config.scraper.maxage, 10);
        assert_eq!(hash, hash_content(content));
    }

    #[test]
    fn test_edited_file_changes_hash() {
        let mut file = create_temp_config("[scraper]\nmaxage = 10\n");
        let (_, before) = load_config_with_hash(file.path()).unwrap();
        let (_, unchanged) = load_config_with_hash(file.path()).unwrap();

        file.write_all(b"seeds = [\"https://example.org/\"]\n").unwrap();
        file.flush().unwrap();
        let (config, after) = load_config_with_hash(file.path()).unwrap();

        assert_eq!(before, unchanged);
        assert_ne!(before, after);
        assert_eq!(config.scraper.seeds, vec!["https://example.org/".to_string()]);
    }
}
