//! Visual web search via the Cloud Vision `images:annotate` endpoint.
//!
//! Requests web detection and landmark detection for a single image.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use geolens_core::{GeoLensError, ImageUpload, VisionAnnotations, VisionProvider};

const DEFAULT_BASE_URL: &str = "https://vision.googleapis.com/v1";
const MAX_WEB_RESULTS: u32 = 20;
const MAX_LANDMARK_RESULTS: u32 = 5;

pub struct CloudVision {
    client: Client,
    api_key: String,
    base_url: String,
}

impl CloudVision {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Deserialize)]
struct ImageResponse {
    #[serde(flatten)]
    annotations: VisionAnnotations,
    error: Option<Status>,
}

#[derive(Deserialize)]
struct Status {
    #[serde(default)]
    message: String,
}

fn annotate_body(image: &ImageUpload) -> serde_json::Value {
    serde_json::json!({
        "requests": [{
            "image": { "content": STANDARD.encode(&image.data) },
            "features": [
                { "type": "WEB_DETECTION", "maxResults": MAX_WEB_RESULTS },
                { "type": "LANDMARK_DETECTION", "maxResults": MAX_LANDMARK_RESULTS }
            ]
        }]
    })
}

#[async_trait]
impl VisionProvider for CloudVision {
    fn name(&self) -> &str {
        "cloud-vision"
    }

    async fn annotate(&self, image: &ImageUpload) -> Result<VisionAnnotations> {
        info!(bytes = image.data.len(), "[Vision] Running web detection");
        let resp = self
            .client
            .post(format!("{}/images:annotate", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .json(&annotate_body(image))
            .send()
            .await
            .context("Cloud Vision HTTP request failed")?;
        let status = resp.status();
        if !status.is_success() {
            bail!("Cloud Vision returned {}: {}", status, resp.text().await.unwrap_or_default());
        }
        let body: AnnotateResponse = resp
            .json()
            .await
            .context("Failed to parse Cloud Vision response")?;

        let Some(first) = body.responses.into_iter().next() else {
            return Ok(VisionAnnotations::default());
        };
        if let Some(err) = first.error {
            return Err(GeoLensError::Provider {
                provider: "cloud-vision".into(),
                message: err.message,
            }
            .into());
        }
        Ok(first.annotations)
    }
}
