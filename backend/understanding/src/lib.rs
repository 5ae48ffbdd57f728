//! Provider clients and text transforms behind the GeoLens endpoints.

pub mod clues;
pub mod gemini;
pub mod geocode;
pub mod mock;
pub mod parser;
pub mod prompts;
pub mod vision;

pub use clues::{best_clues, extract_clues, BEST_CLUE_COUNT};
pub use gemini::GeminiModel;
pub use geocode::GoogleGeocoder;
pub use parser::parse_analysis;
pub use vision::CloudVision;
