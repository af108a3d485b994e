use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable holding the discovery-service credential
pub const DISCOVERY_KEY_VAR: &str = "SERPER_API_KEY";

/// Environment variable holding the extraction-service credential
pub const EXTRACTION_KEY_VAR: &str = "OPENAI_API_KEY";

/// Loads, validates, and credential-resolves a configuration file
///
/// Tunables come from the TOML file; the two service credentials come from
/// the environment and are startup-fatal when absent.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use caissa_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Page budget: {}", config.crawler.max_pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let mut config: Config = toml::from_str(&content)?;

    validate(&config)?;
    resolve_credentials(&mut config, |name| std::env::var(name).ok())?;

    Ok(config)
}

/// Fills the credential fields from an environment-style lookup
///
/// Split out from [`load_config`] so tests can supply a lookup map instead
/// of mutating the process environment.
pub(crate) fn resolve_credentials(
    config: &mut Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    config.discovery.api_key = lookup(DISCOVERY_KEY_VAR)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingCredential(DISCOVERY_KEY_VAR))?;

    config.extraction.api_key = lookup(EXTRACTION_KEY_VAR)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingCredential(EXTRACTION_KEY_VAR))?;

    Ok(())
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so runs can be correlated with the exact configuration
/// that produced them.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID_CONFIG: &str = r#"
[crawler]
max-pages = 5
page-delay-ms = 1000
query-delay-ms = 500
extraction-delay-ms = 500
navigation-timeout-ms = 30000

[browser]
endpoint = "ws://localhost:3000"

[discovery]

[extraction]

[output]
knowledge-dir = "./knowledge"
"#;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn test_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            (DISCOVERY_KEY_VAR, "serper-test-key"),
            (EXTRACTION_KEY_VAR, "openai-test-key"),
        ])
    }

    fn parse_and_resolve(content: &str) -> Config {
        let mut config: Config = toml::from_str(content).unwrap();
        crate::config::validation::validate(&config).unwrap();
        let env = test_env();
        resolve_credentials(&mut config, |name| {
            env.get(name).map(|v| v.to_string())
        })
        .unwrap();
        config
    }

    #[test]
    fn test_parse_valid_config() {
        let config = parse_and_resolve(VALID_CONFIG);

        assert_eq!(config.crawler.max_pages, 5);
        assert_eq!(config.crawler.max_page_retries, 2);
        assert_eq!(config.browser.endpoint, "ws://localhost:3000");
        assert_eq!(config.discovery.api_key, "serper-test-key");
        assert_eq!(config.extraction.api_key, "openai-test-key");
        assert_eq!(config.extraction.model, "gpt-4o");
        assert_eq!(config.extraction.max_output_tokens, 4096);
    }

    #[test]
    fn test_missing_discovery_credential_is_fatal() {
        let mut config: Config = toml::from_str(VALID_CONFIG).unwrap();
        let result = resolve_credentials(&mut config, |name| {
            (name == EXTRACTION_KEY_VAR).then(|| "openai-test-key".to_string())
        });

        assert!(matches!(
            result,
            Err(ConfigError::MissingCredential(DISCOVERY_KEY_VAR))
        ));
    }

    #[test]
    fn test_blank_credential_is_fatal() {
        let mut config: Config = toml::from_str(VALID_CONFIG).unwrap();
        let result = resolve_credentials(&mut config, |_| Some("   ".to_string()));

        assert!(matches!(result, Err(ConfigError::MissingCredential(_))));
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/harvest.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        // Same content produces the same hash
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
