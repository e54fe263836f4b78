//! Filter system for request filtering.

mod chain;
mod field_filter;
mod filter_trait;

pub use chain::FilterChain;
pub use field_filter::{FieldFilter, DEFAULT_RESPONSE_MESSAGE};
pub use filter_trait::Filter;
