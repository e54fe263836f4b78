//! Configuration data types.

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::validation;

/// Default cap on buffered form bodies (10 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 << 20;

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Enable debug logging to file
    pub debug: bool,

    /// Path to log directory
    pub log_path: PathBuf,

    /// Largest form body the middleware buffers, in bytes
    pub max_body_bytes: usize,

    /// Field filters, evaluated in order
    pub filters: Vec<FilterSettings>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            log_path: default_log_path(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            filters: Vec::new(),
        }
    }
}

impl Config {
    /// Validate configuration and return errors if invalid.
    /// Delegates to the comprehensive validation module.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

/// Settings of one field filter instance.
///
/// # Examples
///
/// ```toml
/// [[filters]]
/// name = "block-test-accounts"
/// field_name = "account"
/// response_message = "Test accounts are not accepted"
/// disallowed_content = ["^7000000[0-9]$", "^99"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct FilterSettings {
    /// Instance name, shown in logs and errors
    #[serde(default = "default_filter_name")]
    pub name: String,

    /// Query or form field to inspect
    #[serde(default)]
    pub field_name: String,

    /// Response body on rejection (default: "Disallowed content")
    #[serde(default)]
    pub response_message: Option<String>,

    /// Regex patterns, any substring match rejects the request
    #[serde(default)]
    pub disallowed_content: Vec<String>,
}

fn default_filter_name() -> String {
    "field-filter".to_string()
}

/// Get default log path (relative to config directory).
/// This returns a placeholder; the actual path is set by ConfigService based on config file location.
pub fn default_log_path() -> PathBuf {
    default_log_path_for_config_dir(None)
}

/// Get log path based on config directory.
pub fn default_log_path_for_config_dir(config_dir: Option<&Path>) -> PathBuf {
    config_dir
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
                .join("field-filter")
        })
        .join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            debug = true
            max_body_bytes = 1024

            [[filters]]
            name = "accounts"
            field_name = "account"
            response_message = "Blocked"
            disallowed_content = ["^7000", "invalid"]

            [[filters]]
            field_name = "f"
            "#,
        )
        .unwrap();

        assert!(config.debug);
        assert_eq!(config.max_body_bytes, 1024);
        assert_eq!(config.filters.len(), 2);
        assert_eq!(config.filters[0].name, "accounts");
        assert_eq!(config.filters[0].disallowed_content, vec!["^7000", "invalid"]);
        assert_eq!(config.filters[1].name, "field-filter");
        assert!(config.filters[1].response_message.is_none());
        assert!(config.filters[1].disallowed_content.is_empty());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(!config.debug);
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert!(config.filters.is_empty());
        assert!(config.log_path.ends_with("logs"));
    }
}
