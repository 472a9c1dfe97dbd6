//! Configuration models and loading for the Carlink client.
//!
//! This crate owns the client config schema, JSON5 loading, environment
//! overrides, and validation used by the notification SDK and demos.

mod error;
mod load;
mod model;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Env override name and default snapshot location helpers.
pub use load::{BACKEND_URL_ENV, default_cache_path};
/// Configuration schema models.
pub use model::*;
