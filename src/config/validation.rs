//! Configuration validation.

use anyhow::{bail, Result};
use std::collections::HashSet;

use super::Config;
use crate::domain::FieldFilter;

/// Validate configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Validate log path
    if !config.log_path.as_os_str().is_empty() {
        // Path will be created if it doesn't exist, so just check it's valid
        if config.log_path.to_string_lossy().contains('\0') {
            bail!("Invalid log_path: contains null character");
        }
    }

    if config.max_body_bytes == 0 {
        bail!("max_body_bytes must be greater than 0");
    }

    let mut names = HashSet::new();
    for (i, filter) in config.filters.iter().enumerate() {
        if filter.name.is_empty() {
            bail!("filters[{}]: name cannot be empty", i);
        }
        if !names.insert(filter.name.as_str()) {
            bail!("filters[{}]: duplicate filter name '{}'", i, filter.name);
        }

        if matches!(&filter.response_message, Some(m) if m.is_empty()) {
            bail!("filters[{}]: response_message cannot be empty", i);
        }

        for (j, pattern) in filter.disallowed_content.iter().enumerate() {
            // An empty regex matches every value
            if pattern.is_empty() {
                bail!(
                    "filters[{}]: disallowed_content[{}] cannot be empty",
                    i,
                    j
                );
            }
        }

        // Compile exactly as the middleware will
        if let Err(e) = FieldFilter::new(filter) {
            bail!("filters[{}]: {}", i, e);
        }
    }

    Ok(())
}
