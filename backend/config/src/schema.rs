//! Typed runtime configuration.

use serde::Serialize;

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 32;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// GeoLens runtime configuration.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Generative model key; the server refuses to start without it
    pub gemini_api_key: String,
    /// Gemini model id
    pub gemini_model: String,
    /// Cloud Vision key; without it the lens endpoint answers with the model
    pub vision_api_key: Option<String>,
    /// Geocoding key; without it lookups are skipped
    pub geocoding_api_key: Option<String>,
    /// Outbound provider timeout, none by default
    pub provider_timeout_secs: Option<u64>,
    /// Request body limit
    pub max_upload_bytes: usize,
    /// Log level
    pub log_level: String,
    /// Directory for rolling JSON logs
    pub log_dir: Option<String>,
}

impl Config {
    /// Defaults around the one required value.
    pub fn with_gemini_key(key: impl Into<String>) -> Self {
        Self {
            bind_address: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            gemini_api_key: key.into(),
            gemini_model: DEFAULT_MODEL.to_string(),
            vision_api_key: None,
            geocoding_api_key: None,
            provider_timeout_secs: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_dir: None,
        }
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
