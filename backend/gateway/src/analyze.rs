//! Single- and multi-image analysis endpoints.

use axum::extract::{multipart::MultipartRejection, Multipart, State};
use axum::Json;
use tracing::{info, instrument};

use geolens_core::{AnalysisResult, ImageUpload, MultiImageAnalysis};
use geolens_understanding::{parse_analysis, prompts};

use crate::error::ApiError;
use crate::server::GatewayState;
use crate::upload::{decode, read_files, single_image, validate_multi};

pub const SERVICE_BANNER: &str = "GeoLens image geolocation service";

/// Handler for `GET /`.
pub async fn root() -> &'static str {
    SERVICE_BANNER
}

/// Ask the model about `images` and parse its reply.
pub(crate) async fn run_model(
    state: &GatewayState,
    prompt: &str,
    images: &[ImageUpload],
) -> Result<AnalysisResult, ApiError> {
    let reply = state
        .model
        .generate(prompt, images)
        .await
        .map_err(|e| ApiError::provider(state.model.name(), e))?;
    Ok(parse_analysis(&reply))
}

/// Handler for `POST /api/analyze`.
#[instrument(skip_all)]
pub async fn analyze_image(
    State(state): State<GatewayState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let image = single_image(multipart?).await?;
    info!(filename = %image.filename, mime = %image.mime_type, bytes = image.data.len(), "Analyzing image");

    let result = run_model(&state, &prompts::single_image_prompt(), std::slice::from_ref(&image)).await?;
    info!(country = %result.country, confidence = %result.confidence, "Analysis complete");
    Ok(Json(result))
}

/// Handler for `POST /api/analyze-multi`.
#[instrument(skip_all)]
pub async fn analyze_multi(
    State(state): State<GatewayState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let files = validate_multi(read_files(multipart?, "images").await?)?;
    let images = files.into_iter().map(decode).collect::<Result<Vec<_>, _>>()?;
    info!(count = images.len(), "Analyzing image set");

    let prompt = prompts::multi_image_prompt(images.len());
    let result = run_model(&state, &prompt, &images).await?;
    let summaries = images
        .iter()
        .enumerate()
        .map(|(i, image)| image.summary(i + 1))
        .collect();

    info!(country = %result.country, confidence = %result.confidence, "Triangulation complete");
    Ok(Json(result.with_multi_image(MultiImageAnalysis::new(summaries))))
}
