//! Handler-boundary errors, rendered as `{"error": "..."}`.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use geolens_core::GeoLensError;
use geolens_logging::redact_sensitive_data;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid multipart upload: {message}")]
    Multipart { status: StatusCode, message: String },

    #[error("{}", analysis_message(.0))]
    Analysis(#[from] GeoLensError),
}

fn analysis_message(err: &GeoLensError) -> String {
    if err.is_client_error() {
        err.to_string()
    } else {
        format!("Analysis failed: {err:#}")
    }
}

impl ApiError {
    /// Wrap a provider failure, keeping the whole cause chain in the message.
    pub fn provider(provider: &str, err: anyhow::Error) -> Self {
        Self::Analysis(GeoLensError::Provider {
            provider: provider.to_string(),
            message: format!("{err:#}"),
        })
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Multipart { status, .. } => *status,
            Self::Analysis(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Analysis(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::Multipart {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::BadRequest(format!("Expected a multipart/form-data upload: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = redact_sensitive_data(&self.to_string());
        if status.is_server_error() {
            error!(status = %status, error = %message, "Request failed");
        } else {
            warn!(status = %status, error = %message, "Request rejected");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}
