//! Field filter implementation.

use regex::Regex;
use tracing::{debug, info};

use super::Filter;
use crate::config::FilterSettings;
use crate::domain::{Decision, FieldSource, FilterError};

/// Default message for rejected requests.
pub const DEFAULT_RESPONSE_MESSAGE: &str = "Disallowed content";

/// Filter rejecting requests whose field value contains a disallowed pattern.
///
/// Patterns are compiled once here and reused for every request, so a
/// constructed filter can be shared across threads without locking.
#[derive(Debug, Clone)]
pub struct FieldFilter {
    name: String,
    field_name: String,
    message: String,
    patterns: Vec<Regex>,
}

impl FieldFilter {
    /// Create a new FieldFilter from its settings.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidPattern`] for the first pattern that is
    /// not a valid regex. No filter is produced in that case.
    pub fn new(settings: &FilterSettings) -> Result<Self, FilterError> {
        let patterns = settings
            .disallowed_content
            .iter()
            .enumerate()
            .map(|(index, pattern)| {
                Regex::new(pattern).map_err(|source| FilterError::InvalidPattern {
                    filter: settings.name.clone(),
                    index,
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: settings.name.clone(),
            field_name: settings.field_name.clone(),
            message: settings
                .response_message
                .clone()
                .unwrap_or_else(|| DEFAULT_RESPONSE_MESSAGE.to_string()),
            patterns,
        })
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Index and source of the first pattern found in `value`.
    pub fn first_match(&self, value: &str) -> Option<(usize, &str)> {
        self.patterns
            .iter()
            .enumerate()
            .find(|(_, re)| re.is_match(value))
            .map(|(i, re)| (i, re.as_str()))
    }
}

impl Filter for FieldFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, request: &dyn FieldSource) -> Decision {
        let value = request.field_value(&self.field_name);

        // Absence of the field is not disallowed content
        if value.is_empty() {
            debug!(filter = %self.name, field = %self.field_name, "Field absent, forwarding");
            return Decision::Forward;
        }

        match self.first_match(value) {
            Some((index, pattern)) => {
                info!(
                    filter = %self.name,
                    field = %self.field_name,
                    pattern_index = index,
                    pattern = %pattern,
                    "Disallowed content, rejecting"
                );
                Decision::reject(self.message.clone())
            }
            None => {
                debug!(filter = %self.name, field = %self.field_name, "No pattern matched");
                Decision::Forward
            }
        }
    }
}
