//! Web-detection payload as returned by the Cloud Vision `images:annotate` call.
//!
//! Only the fields the clue extractor reads are modeled; everything else is ignored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisionAnnotations {
    pub web_detection: WebDetection,
    pub landmark_annotations: Vec<LandmarkAnnotation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebDetection {
    pub web_entities: Vec<WebEntity>,
    pub pages_with_matching_images: Vec<WebPage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebEntity {
    pub entity_id: Option<String>,
    pub description: Option<String>,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebPage {
    pub url: String,
    pub page_title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LandmarkAnnotation {
    pub description: String,
    pub score: Option<f64>,
}
