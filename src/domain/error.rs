//! Error types for field-filter.

use thiserror::Error;

/// Main error type for field-filter.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A disallowed pattern failed to compile
    #[error("filter '{filter}': disallowed_content[{index}] is not a valid regex '{pattern}': {source}")]
    InvalidPattern {
        filter: String,
        index: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
