use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clue::LocationClue;
use crate::geocode::GeocodeResult;

pub const UNKNOWN: &str = "Unknown";
pub const NOT_SPECIFIED: &str = "Not specified";
pub const NO_COORDINATES: &str = "N/A";
pub const DEFAULT_CERTAINTY: u32 = 50;
pub const PARSING_ERROR_COUNTRY: &str = "Parsing Error";

/// How sure the model claims to be about its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Confidence {
    High,
    #[default]
    Medium,
    Low,
}

impl Confidence {
    /// Case-insensitive match on the first word of a label value.
    pub fn from_label(value: &str) -> Option<Self> {
        let word = value
            .split(|c: char| !c.is_ascii_alphabetic())
            .find(|w| !w.is_empty())?;
        match word.to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" | "moderate" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    /// Bucket a 0..=1 score.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::High
        } else if score >= 0.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

/// A latitude/longitude pair whose components may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct LatLng {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat: Some(lat), lng: Some(lng) }
    }

    /// `"lat, lng"` when both components are present.
    pub fn display_pair(&self) -> Option<String> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(format!("{lat}, {lng}")),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub signage: String,
    pub infrastructure: String,
    pub architecture: String,
    pub environment: String,
    pub cultural_elements: String,
}

impl Default for Evidence {
    fn default() -> Self {
        Self {
            signage: NOT_SPECIFIED.to_string(),
            infrastructure: NOT_SPECIFIED.to_string(),
            architecture: NOT_SPECIFIED.to_string(),
            environment: NOT_SPECIFIED.to_string(),
            cultural_elements: NOT_SPECIFIED.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalAssessment {
    pub most_probable_location: String,
    pub certainty_percentage: u32,
    pub primary_landmark: String,
}

impl Default for FinalAssessment {
    fn default() -> Self {
        Self {
            most_probable_location: UNKNOWN.to_string(),
            certainty_percentage: DEFAULT_CERTAINTY,
            primary_landmark: NOT_SPECIFIED.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedAnalysis {
    pub primary_coordinates: LatLng,
    /// Always two entries, one per "Alternative Location N" label.
    pub alternative_locations: [LatLng; 2],
    pub evidence: Evidence,
    pub final_assessment: FinalAssessment,
}

impl Default for DetailedAnalysis {
    fn default() -> Self {
        Self {
            primary_coordinates: LatLng::default(),
            alternative_locations: [LatLng::default(); 2],
            evidence: Evidence::default(),
            final_assessment: FinalAssessment::default(),
        }
    }
}

/// Metadata about one image of a multi-image request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSummary {
    pub index: usize,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiImageAnalysis {
    pub image_count: usize,
    pub images: Vec<ImageSummary>,
    pub analysis_type: String,
}

impl MultiImageAnalysis {
    pub const ANALYSIS_TYPE: &'static str = "multi_image_triangulation";

    pub fn new(images: Vec<ImageSummary>) -> Self {
        Self {
            image_count: images.len(),
            images,
            analysis_type: Self::ANALYSIS_TYPE.to_string(),
        }
    }
}

/// How a lens-style answer was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LensAnalysisType {
    /// Built from vision web-detection clues.
    GoogleLensWebDetection,
    /// No usable clues; answered by the generative model.
    GeminiFallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LensAnalysis {
    pub analysis_type: LensAnalysisType,
    pub clues_found: usize,
    pub top_clues: Vec<LocationClue>,
    pub all_clues: Vec<LocationClue>,
    /// The geocoder hit behind the coordinates, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geocoded: Option<GeocodeResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl LensAnalysis {
    pub fn fallback(note: impl Into<String>) -> Self {
        Self {
            analysis_type: LensAnalysisType::GeminiFallback,
            clues_found: 0,
            top_clues: Vec::new(),
            all_clues: Vec::new(),
            geocoded: None,
            note: Some(note.into()),
        }
    }
}

/// The JSON document returned by every analyze endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub country: String,
    pub region_or_city: String,
    pub confidence: Confidence,
    pub coordinates: String,
    pub reasoning: String,
    pub detailed_analysis: DetailedAnalysis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_image_analysis: Option<MultiImageAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_lens_analysis: Option<LensAnalysis>,
}

impl AnalysisResult {
    /// A result with every field at its default and `reasoning` set.
    pub fn empty(reasoning: impl Into<String>) -> Self {
        Self {
            country: UNKNOWN.to_string(),
            region_or_city: UNKNOWN.to_string(),
            confidence: Confidence::default(),
            coordinates: NO_COORDINATES.to_string(),
            reasoning: reasoning.into(),
            detailed_analysis: DetailedAnalysis::default(),
            error: None,
            multi_image_analysis: None,
            google_lens_analysis: None,
        }
    }

    /// The uniform shape returned when the parser itself fails.
    pub fn parsing_error(reasoning: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            country: PARSING_ERROR_COUNTRY.to_string(),
            confidence: Confidence::Low,
            error: Some(error.into()),
            ..Self::empty(reasoning)
        }
    }

    pub fn with_multi_image(mut self, analysis: MultiImageAnalysis) -> Self {
        self.multi_image_analysis = Some(analysis);
        self
    }

    pub fn with_lens(mut self, analysis: LensAnalysis) -> Self {
        self.google_lens_analysis = Some(analysis);
        self
    }
}
