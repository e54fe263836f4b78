//! Filter trait definition.

use crate::domain::{Decision, FieldSource};

/// Trait for request filters.
pub trait Filter: Send + Sync {
    /// Instance name, used in logs.
    fn name(&self) -> &str;

    /// Evaluate the request and return a decision.
    fn evaluate(&self, request: &dyn FieldSource) -> Decision;
}
