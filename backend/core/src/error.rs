use thiserror::Error;

/// Top-level error type for the GeoLens relay.
#[derive(Debug, Error)]
pub enum GeoLensError {
    /// Missing or out-of-range upload parts. The message is shown to the caller as is.
    #[error("{0}")]
    InvalidUpload(String),

    #[error("cannot identify image file: {0}")]
    ImageDecode(String),

    #[error("{provider} provider error: {message}")]
    Provider { provider: String, message: String },
}

impl GeoLensError {
    /// True when the caller sent something we cannot work with.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidUpload(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_upload_problems_are_client_errors() {
        assert!(GeoLensError::InvalidUpload("no image".into()).is_client_error());
        assert!(!GeoLensError::ImageDecode("a.txt".into()).is_client_error());
        let provider = GeoLensError::Provider { provider: "gemini".into(), message: "503".into() };
        assert!(!provider.is_client_error());
        assert_eq!(provider.to_string(), "gemini provider error: 503");
    }
}
