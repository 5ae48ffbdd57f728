pub mod analysis;
pub mod clue;
pub mod error;
pub mod geocode;
pub mod traits;
pub mod upload;
pub mod vision;

pub use analysis::{
    AnalysisResult, Confidence, DetailedAnalysis, Evidence, FinalAssessment, ImageSummary,
    LatLng, LensAnalysis, LensAnalysisType, MultiImageAnalysis,
};
pub use clue::{ClueSource, LocationClue};
pub use error::GeoLensError;
pub use geocode::GeocodeResult;
pub use traits::{Geocoder, GenerativeModel, VisionProvider};
pub use upload::{sniff_image_mime, ImageUpload};
pub use vision::{LandmarkAnnotation, VisionAnnotations, WebDetection, WebEntity, WebPage};
