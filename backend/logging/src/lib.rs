//! Telemetry and structured logging for GeoLens.
//!
//! Handles log redaction, console output and rolling JSON files.

pub mod logger;
pub mod redact;

pub use logger::init_logger;
pub use redact::redact_sensitive_data;
