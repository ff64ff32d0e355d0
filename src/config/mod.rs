//! Configuration
//!
//! YAML configuration for round timing, input wiring, display layout and
//! the broadcast link, with environment substitution and validation.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLimits, ConfigLoader, LoadResult, LoadWarning};
pub use schema::*;
pub use validation::{ValidationResult, Validator};
