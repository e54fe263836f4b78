//! Service layer: the stdin evaluator and the tower middleware.

mod adapter;
mod filter_service;
pub mod middleware;

pub use adapter::FormatAdapter;
pub use filter_service::FilterService;
pub use middleware::{FieldFilterLayer, FieldFilterService};
