use anyhow::Result;
use async_trait::async_trait;

use crate::geocode::GeocodeResult;
use crate::upload::ImageUpload;
use crate::vision::VisionAnnotations;

/// A multimodal generative model that answers a prompt about images.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send the prompt followed by every image, return the reply text.
    async fn generate(&self, prompt: &str, images: &[ImageUpload]) -> Result<String>;
}

/// Visual web search over a single image.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn annotate(&self, image: &ImageUpload) -> Result<VisionAnnotations>;
}

/// Place-name lookup.
///
/// Implementations swallow every failure and answer `None`; callers never
/// see a geocoding error.
#[async_trait]
pub trait Geocoder: Send + Sync {
    fn name(&self) -> &str;

    async fn geocode(&self, place: &str) -> Option<GeocodeResult>;
}
