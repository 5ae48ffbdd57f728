//! Lens-style endpoint: visual web search first, generative model as fallback.

use axum::extract::{multipart::MultipartRejection, Multipart, State};
use axum::Json;
use tracing::{info, instrument, warn};

use geolens_core::{
    AnalysisResult, ClueSource, Confidence, Geocoder, LatLng, LensAnalysis, LensAnalysisType,
    LocationClue,
};
use geolens_logging::redact_sensitive_data;
use geolens_understanding::{best_clues, extract_clues, prompts, BEST_CLUE_COUNT};

use crate::analyze::run_model;
use crate::error::ApiError;
use crate::server::GatewayState;
use crate::upload::single_image;

/// Example coordinates reported when no geocoder result backs the top clue.
pub const PLACEHOLDER_COORDINATES: (f64, f64) = (40.7128, -74.0060);

/// Handler for `POST /api/analyze-lens`.
#[instrument(skip_all)]
pub async fn analyze_lens(
    State(state): State<GatewayState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let image = single_image(multipart?).await?;

    let note = match &state.vision {
        None => "No vision API key configured".to_string(),
        Some(vision) => match vision.annotate(&image).await {
            Ok(annotations) => {
                let clues = extract_clues(&annotations);
                if !clues.is_empty() {
                    info!(clues = clues.len(), "Vision search produced location clues");
                    let result = synthesize(clues, state.geocoder.as_deref()).await;
                    return Ok(Json(result));
                }
                "Vision search found no location clues".to_string()
            }
            Err(e) => {
                let message = redact_sensitive_data(&format!("{e:#}"));
                warn!(provider = vision.name(), error = %message, "Vision search failed, falling back");
                format!("Vision search failed: {message}")
            }
        },
    };

    info!(reason = %note, "Answering lens request with the generative model");
    let result = run_model(&state, &prompts::lens_fallback_prompt(), std::slice::from_ref(&image)).await?;
    Ok(Json(result.with_lens(LensAnalysis::fallback(note))))
}

/// Build an answer from vision clues. `clues` must not be empty.
pub async fn synthesize(clues: Vec<LocationClue>, geocoder: Option<&dyn Geocoder>) -> AnalysisResult {
    let top = best_clues(&clues, BEST_CLUE_COUNT);
    let Some(best) = top.first().cloned() else {
        return AnalysisResult::empty("No location clues");
    };

    let geocoded = match geocoder {
        Some(geocoder) => geocoder.geocode(&best.text).await,
        None => None,
    };

    let summary = top
        .iter()
        .map(|c| format!("{} ({:?}, {:.2})", c.text, c.source, c.score))
        .collect::<Vec<_>>()
        .join("; ");
    let mut result = AnalysisResult::empty(format!(
        "Visual web search matched {} clue(s). Strongest: {summary}.",
        clues.len()
    ));
    result.region_or_city = best.text.clone();
    result.confidence = Confidence::from_score(best.score);

    // A geocoded address always ends in its country; a bare clue needs a comma.
    let country = match &geocoded {
        Some(hit) => hit
            .formatted_address
            .rsplit(',')
            .next()
            .map(str::trim)
            .filter(|c| !c.is_empty()),
        None => country_of(&best.text),
    };
    if let Some(country) = country {
        result.country = country.to_string();
    }

    let (coordinates, note) = match &geocoded {
        Some(hit) => (LatLng::new(hit.lat, hit.lng), None),
        None => {
            let (lat, lng) = PLACEHOLDER_COORDINATES;
            (
                LatLng::new(lat, lng),
                Some("Coordinates are placeholders; the top clue was not geocoded".to_string()),
            )
        }
    };
    if let Some(pair) = coordinates.display_pair() {
        result.coordinates = pair;
    }

    let detailed = &mut result.detailed_analysis;
    detailed.primary_coordinates = coordinates;
    let assessment = &mut detailed.final_assessment;
    assessment.most_probable_location = geocoded
        .as_ref()
        .map(|g| g.formatted_address.clone())
        .unwrap_or_else(|| best.text.clone());
    assessment.certainty_percentage = (best.score.clamp(0.0, 1.0) * 100.0).round() as u32;
    if let Some(landmark) = clues.iter().find(|c| c.source == ClueSource::Landmark) {
        assessment.primary_landmark = landmark.text.clone();
    }

    result.with_lens(LensAnalysis {
        analysis_type: LensAnalysisType::GoogleLensWebDetection,
        clues_found: clues.len(),
        top_clues: top,
        all_clues: clues,
        geocoded,
        note,
    })
}

/// Last segment of a comma-separated place name, e.g. "Porto, Portugal".
fn country_of(place: &str) -> Option<&str> {
    let (_, country) = place.rsplit_once(',')?;
    let country = country.trim();
    (!country.is_empty()).then_some(country)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geolens_core::GeocodeResult;
    use geolens_understanding::mock::MockGeocoder;

    fn clues() -> Vec<LocationClue> {
        vec![
            LocationClue::new("Lisbon", 0.62, ClueSource::WebEntity),
            LocationClue::new("Tram 28 - Visit Lisboa", 0.7, ClueSource::PageTitle),
            LocationClue::new("Belém Tower", 0.91, ClueSource::Landmark),
        ]
    }

    #[tokio::test]
    async fn uses_placeholder_without_geocoder() {
        let result = synthesize(clues(), None).await;
        assert_eq!(result.region_or_city, "Belém Tower");
        assert_eq!(result.country, "Unknown");
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.coordinates, "40.7128, -74.006");
        assert_eq!(result.detailed_analysis.final_assessment.certainty_percentage, 91);
        assert_eq!(result.detailed_analysis.final_assessment.primary_landmark, "Belém Tower");

        let lens = result.google_lens_analysis.unwrap();
        assert_eq!(lens.analysis_type, LensAnalysisType::GoogleLensWebDetection);
        assert_eq!(lens.clues_found, 3);
        assert_eq!(lens.top_clues[0].text, "Belém Tower");
        assert!(lens.note.is_some());
        assert!(lens.geocoded.is_none());
    }

    #[tokio::test]
    async fn uses_geocoder_hit_when_available() {
        let geocoder = MockGeocoder::new(GeocodeResult {
            lat: 38.6916,
            lng: -9.2160,
            formatted_address: "Av. Brasília, 1400-038 Lisboa, Portugal".into(),
            place_id: "abc".into(),
        });
        let result = synthesize(clues(), Some(&geocoder as &dyn Geocoder)).await;
        assert_eq!(result.country, "Portugal");
        assert_eq!(result.detailed_analysis.primary_coordinates, LatLng::new(38.6916, -9.216));
        assert_eq!(
            result.detailed_analysis.final_assessment.most_probable_location,
            "Av. Brasília, 1400-038 Lisboa, Portugal"
        );
        let lens = result.google_lens_analysis.unwrap();
        assert!(lens.note.is_none());
        assert_eq!(lens.geocoded.unwrap().place_id, "abc");
    }

    #[tokio::test]
    async fn country_comes_from_the_clue_text_without_geocoder() {
        let clues = vec![LocationClue::new("Porto, Portugal", 0.85, ClueSource::WebEntity)];
        let result = synthesize(clues, None).await;
        assert_eq!(result.region_or_city, "Porto, Portugal");
        assert_eq!(result.country, "Portugal");
    }

    #[test]
    fn country_is_the_last_comma_segment() {
        assert_eq!(country_of("Av. Brasília, 1400-038 Lisboa, Portugal"), Some("Portugal"));
        assert_eq!(country_of("Belém Tower"), None);
        assert_eq!(country_of("Lisbon, "), None);
    }

    #[tokio::test]
    async fn geocoder_miss_falls_back_to_placeholder() {
        let result = synthesize(clues(), Some(&MockGeocoder::empty() as &dyn Geocoder)).await;
        assert_eq!(result.country, "Unknown");
        assert_eq!(
            result.detailed_analysis.primary_coordinates,
            LatLng::new(PLACEHOLDER_COORDINATES.0, PLACEHOLDER_COORDINATES.1)
        );
    }
}
