//! Filter chain implementation.

use tracing::{debug, warn};

use crate::config::Config;
use crate::domain::{Decision, FieldSource, FilterError};

use super::{FieldFilter, Filter};

/// Chain of filters that processes requests in configured order.
pub struct FilterChain {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterChain {
    /// Create a new FilterChain from configuration.
    ///
    /// Fails if any configured filter cannot be built, so a chain never
    /// contains a partially-initialized filter.
    pub fn new(config: &Config) -> Result<Self, FilterError> {
        let mut filters: Vec<Box<dyn Filter>> = Vec::with_capacity(config.filters.len());

        for settings in &config.filters {
            let filter = FieldFilter::new(settings)?;
            if filter.field_name().is_empty() {
                warn!(filter = %settings.name, "Empty field_name, filter forwards every request");
            }
            filters.push(Box::new(filter));
        }

        Ok(Self { filters })
    }

    /// Create a chain from already-built filters.
    pub fn from_filters(filters: Vec<Box<dyn Filter>>) -> Self {
        Self { filters }
    }

    /// Evaluate all filters and return the first rejecting decision.
    pub fn evaluate(&self, request: &dyn FieldSource) -> Decision {
        for filter in &self.filters {
            let decision = filter.evaluate(request);
            if !decision.is_forwarded() {
                debug!(filter = filter.name(), "Chain stopped by filter");
                return decision;
            }
        }

        Decision::Forward
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
