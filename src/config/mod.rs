//! Configuration management module.
//!
//! Handles TOML configuration file loading, validation, and default generation.

mod service;
mod types;
mod validation;

pub use service::ConfigService;
pub use types::{Config, FilterSettings, DEFAULT_MAX_BODY_BYTES};
pub use validation::validate;
