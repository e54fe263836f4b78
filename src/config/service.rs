//! Configuration service for loading and generating config files.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::types::default_log_path_for_config_dir;
use super::Config;

/// Configuration service.
pub struct ConfigService;

impl ConfigService {
    /// Get the default configuration file path.
    /// Always uses ~/.config/field-filter/config.toml for cross-platform consistency.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("field-filter")
            .join("config.toml")
    }

    /// Load configuration from file.
    ///
    /// If `path` is `None`, uses the default path.
    /// If the file doesn't exist, creates default configuration file.
    /// Validates configuration after loading.
    /// Log path defaults to the same directory as config file.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let path = path.map(PathBuf::from).unwrap_or_else(Self::default_path);
        let config_dir = path.parent();

        if !path.exists() {
            // Create default config file
            Self::generate_at(&path, false)?;
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        // If log_path was not explicitly set in config, use config file directory
        // Check if log_path matches the general default (meaning it wasn't set in file)
        let general_default = default_log_path_for_config_dir(None);
        if config.log_path == general_default {
            config.log_path = default_log_path_for_config_dir(config_dir);
        }

        // Validate configuration
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        Ok(config)
    }

    /// Generate default configuration file at the default path.
    pub fn generate_default(force: bool) -> Result<()> {
        Self::generate_at(&Self::default_path(), force)
    }

    /// Generate default configuration file at the specified path.
    ///
    /// An existing file is left untouched unless `force` is set.
    pub fn generate_at(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            bail!(
                "Config file already exists: {} (use --force to overwrite)",
                path.display()
            );
        }

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = Self::default_config_content();
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Generate default configuration content with comments.
    fn default_config_content() -> String {
        r#"# field-filter configuration file

# Enable debug logging to file (default: false)
debug = false

# Path to log directory (default: same directory as config.toml/logs)
# If --config is specified, logs go to that directory/logs
# log_path = "~/.config/field-filter/logs"

# Largest form-encoded body buffered for inspection, in bytes (default: 10 MiB)
max_body_bytes = 10485760

# Field filters, evaluated in order; the first rejection wins.
# A request whose field is absent or empty is always forwarded.
# Patterns are regular expressions matched anywhere in the value.
# [[filters]]
# name = "block-test-accounts"
# field_name = "account"
# response_message = "Disallowed content"
# disallowed_content = ["^7000000[0-9]$"]

# [[filters]]
# name = "no-script-in-comments"
# field_name = "comment"
# response_message = "Markup is not allowed in comments"
# disallowed_content = ["(?i)<script", "(?i)javascript:"]
"#
        .to_string()
    }
}
