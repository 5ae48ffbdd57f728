//! Loading [`Config`] from environment variables.
//!
//! Empty values count as unset.

use std::collections::HashMap;

use crate::schema::{Config, DEFAULT_BIND, DEFAULT_LOG_LEVEL, DEFAULT_MODEL, DEFAULT_PORT};

pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const VISION_API_KEY: &str = "GOOGLE_VISION_API_KEY";
pub const GEOCODING_API_KEY: &str = "GOOGLE_MAPS_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var \"{0}\"")]
    MissingVar(&'static str),

    #[error("invalid value {value:?} for env var \"{var}\": {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from a map (useful for testing).
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let gemini_api_key = get(GEMINI_API_KEY).ok_or(ConfigError::MissingVar(GEMINI_API_KEY))?;
        let mut config = Config::with_gemini_key(gemini_api_key);

        config.bind_address = get("GEOLENS_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        config.port = parse_or(get("GEOLENS_PORT"), "GEOLENS_PORT", DEFAULT_PORT)?;
        config.gemini_model = get("GEOLENS_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        config.vision_api_key = get(VISION_API_KEY);
        config.geocoding_api_key = get(GEOCODING_API_KEY);
        config.provider_timeout_secs = get("GEOLENS_PROVIDER_TIMEOUT_SECS")
            .map(|v| parse_or(Some(v), "GEOLENS_PROVIDER_TIMEOUT_SECS", 0))
            .transpose()?;
        if let Some(raw) = get("GEOLENS_MAX_UPLOAD_MB") {
            let mb: usize = parse_or(Some(raw.clone()), "GEOLENS_MAX_UPLOAD_MB", 0)?;
            config.max_upload_bytes =
                mb.checked_mul(1024 * 1024).ok_or_else(|| ConfigError::Invalid {
                    var: "GEOLENS_MAX_UPLOAD_MB",
                    value: raw,
                    reason: "too large".to_string(),
                })?;
        }
        config.log_level = get("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        config.log_dir = get("GEOLENS_LOG_DIR");

        Ok(config)
    }
}

fn parse_or<T>(raw: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}
