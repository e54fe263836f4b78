//! Domain layer containing core business logic.
//!
//! This module contains:
//! - Request input and decision output types
//! - Request field extraction
//! - Filter trait and implementations
//! - Logger with rotation

mod error;
pub mod filters;
pub mod logger;
pub mod request;
mod types;

pub use error::FilterError;
pub use filters::{FieldFilter, Filter, FilterChain};
pub use request::{FieldSource, FormBody, FormParams};
pub use types::{Decision, DecisionOutput, RequestInput};
