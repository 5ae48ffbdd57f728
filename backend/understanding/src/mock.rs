//! Canned providers for tests and offline runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use geolens_core::{
    GenerativeModel, GeocodeResult, Geocoder, ImageUpload, VisionAnnotations, VisionProvider,
};

/// A model that returns a fixed reply, or fails when none is set.
#[derive(Default)]
pub struct MockModel {
    fixed_response: Option<String>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
    last_image_count: AtomicUsize,
}

impl MockModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.fixed_response = Some(response.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }

    pub fn last_image_count(&self) -> usize {
        self.last_image_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeModel for MockModel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str, images: &[ImageUpload]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_image_count.store(images.len(), Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }
        self.fixed_response
            .clone()
            .ok_or_else(|| anyhow!("mock model has no response configured"))
    }
}

/// A vision provider returning fixed annotations, or failing when none are set.
#[derive(Default)]
pub struct MockVision {
    annotations: Option<VisionAnnotations>,
}

impl MockVision {
    pub fn new(annotations: VisionAnnotations) -> Self {
        Self { annotations: Some(annotations) }
    }

    pub fn failing() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VisionProvider for MockVision {
    fn name(&self) -> &str {
        "mock-vision"
    }

    async fn annotate(&self, _image: &ImageUpload) -> Result<VisionAnnotations> {
        self.annotations
            .clone()
            .ok_or_else(|| anyhow!("mock vision provider unavailable"))
    }
}

/// A geocoder with a fixed answer for every place.
#[derive(Default)]
pub struct MockGeocoder {
    result: Option<GeocodeResult>,
}

impl MockGeocoder {
    pub fn new(result: GeocodeResult) -> Self {
        Self { result: Some(result) }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    fn name(&self) -> &str {
        "mock-geocoder"
    }

    async fn geocode(&self, _place: &str) -> Option<GeocodeResult> {
        self.result.clone()
    }
}
