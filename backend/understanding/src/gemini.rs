use std::time::Instant;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use geolens_core::{GenerativeModel, ImageUpload};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini `generateContent` client.
pub struct GeminiModel {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiModel {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

fn build_request(prompt: &str, images: &[ImageUpload]) -> GenerateRequest {
    let mut parts = Vec::with_capacity(images.len() + 1);
    parts.push(Part::Text { text: prompt.to_string() });
    parts.extend(images.iter().map(|image| Part::InlineData {
        inline_data: InlineData {
            mime_type: image.mime_type.clone(),
            data: STANDARD.encode(&image.data),
        },
    }));
    GenerateRequest {
        contents: vec![Content { parts }],
    }
}

/// Concatenated text of the first candidate.
fn reply_text(response: GenerateResponse) -> Result<String> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates".to_string());
        bail!("Gemini returned no answer ({reason})");
    };
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        bail!("Gemini returned an empty answer");
    }
    Ok(text)
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str, images: &[ImageUpload]) -> Result<String> {
        let start = Instant::now();
        info!(model = %self.model, images = images.len(), "Sending images to Gemini");

        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, self.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request(prompt, images))
            .send()
            .await
            .context("Gemini HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            bail!("Gemini returned {}: {}", status, error_body);
        }

        let body: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;
        let text = reply_text(body)?;

        debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            chars = text.len(),
            "Gemini answered"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{HeaderMap, StatusCode, Uri},
        Router,
    };
    use serde_json::json;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    async fn stub(status: StatusCode, body: &'static str) -> String {
        serve(Router::new().fallback(move || async move { (status, body) })).await
    }

    fn photo() -> Vec<ImageUpload> {
        vec![ImageUpload {
            filename: "a.png".into(),
            mime_type: "image/png".into(),
            data: vec![0x89, b'P', b'N', b'G'],
        }]
    }

    /// Answers only on the expected model path with the expected key header.
    async fn generate_content(uri: Uri, headers: HeaderMap) -> (StatusCode, &'static str) {
        let key = headers.get("x-goog-api-key").and_then(|v| v.to_str().ok());
        if uri.path() != "/models/gemini-test:generateContent" || key != Some("test-key") {
            return (StatusCode::NOT_FOUND, "wrong path or key");
        }
        (
            StatusCode::OK,
            r#"{"candidates": [{"content": {"parts": [{"text": "Country: Peru"}]}}]}"#,
        )
    }

    #[tokio::test]
    async fn generate_posts_to_the_model_endpoint() {
        let base = serve(Router::new().fallback(generate_content)).await;
        let model = GeminiModel::new(Client::new(), "test-key")
            .with_model("gemini-test")
            .with_base_url(base);
        assert_eq!(model.generate("where?", &photo()).await.unwrap(), "Country: Peru");
    }

    #[tokio::test]
    async fn error_status_carries_the_body() {
        let base = stub(StatusCode::SERVICE_UNAVAILABLE, "model overloaded").await;
        let model = GeminiModel::new(Client::new(), "k").with_base_url(base);
        let err = model.generate("where?", &photo()).await.unwrap_err();
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("model overloaded"));
    }

    #[tokio::test]
    async fn undecodable_body_is_reported() {
        let base = stub(StatusCode::OK, "not json").await;
        let model = GeminiModel::new(Client::new(), "k").with_base_url(base);
        let err = model.generate("where?", &photo()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse Gemini response");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_reported() {
        let model = GeminiModel::new(Client::new(), "k").with_base_url("http://127.0.0.1:9");
        let err = model.generate("where?", &photo()).await.unwrap_err();
        assert_eq!(err.to_string(), "Gemini HTTP request failed");
    }

    #[test]
    fn request_puts_prompt_before_images() {
        let images = vec![ImageUpload {
            filename: "a.png".into(),
            mime_type: "image/png".into(),
            data: vec![1, 2, 3],
        }];
        let value = serde_json::to_value(build_request("where?", &images)).unwrap();
        assert_eq!(
            value,
            json!({"contents": [{"parts": [
                {"text": "where?"},
                {"inline_data": {"mime_type": "image/png", "data": "AQID"}}
            ]}]})
        );
    }

    #[test]
    fn reply_joins_text_parts() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "Country: "}, {"text": "Peru"}]}}]
        }))
        .unwrap();
        assert_eq!(reply_text(response).unwrap(), "Country: Peru");
    }

    #[test]
    fn blocked_prompt_is_an_error() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        let err = reply_text(response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }
}
