//! field-filter: request field filtering middleware
//!
//! Extracts one named field from a request's query string or form-encoded
//! body and rejects the request with `400 Bad Request` when the value
//! contains a disallowed pattern. Otherwise the request is forwarded to the
//! next stage unchanged.
//!
//! ```no_run
//! use field_filter::config::FilterSettings;
//! use field_filter::FieldFilterLayer;
//!
//! let settings = FilterSettings {
//!     name: "accounts".to_string(),
//!     field_name: "account".to_string(),
//!     response_message: None,
//!     disallowed_content: vec!["^7000000[0-9]$".to_string()],
//! };
//! let layer = FieldFilterLayer::from_settings(&settings)?;
//! # let _ = layer;
//! # Ok::<(), field_filter::FilterError>(())
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod service;

pub use config::{Config, FilterSettings};
pub use domain::{Decision, FieldFilter, FieldSource, Filter, FilterChain, FilterError, FormParams};
pub use service::{FieldFilterLayer, FieldFilterService};
