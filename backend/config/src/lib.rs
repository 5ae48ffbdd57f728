//! `geolens-config`: runtime configuration for the GeoLens relay.
//!
//! Provides:
//! - Typed config with defaults
//! - Environment loading with an injectable lookup
//! - Redaction for safe logging

pub mod env;
pub mod redact;
pub mod schema;

pub use env::ConfigError;
pub use redact::redact;
pub use schema::Config;
