//! Response parser: pulls labeled fields out of a free-text model reply.
//!
//! The prompts in [`crate::prompts`] ask for a `Label: value` template, but the
//! model only loosely follows it. Every field is looked up on its own and falls
//! back to a sentinel when absent, so a partially formatted reply still yields
//! a useful result.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use geolens_core::{AnalysisResult, Confidence, LatLng};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("certainty level {0:?} is not a valid percentage")]
    Certainty(String),

    #[error("invalid field pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Build a first-match, line-anchored, case-insensitive pattern for one of
/// `labels`. Tolerates list markers and markdown bold around the label.
fn labeled(labels: &[&str]) -> Result<Regex, regex::Error> {
    let alternatives = labels
        .iter()
        .map(|l| regex::escape(l))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(
        r"(?mi)^[ \t>#]*(?:[-*•][ \t]+)?(?:\*\*|__)?(?:{alternatives})(?:\*\*|__)?[ \t]*:(.*)$"
    ))
}

struct FieldPatterns {
    country: Regex,
    region: Regex,
    region_loose: Regex,
    confidence: Regex,
    primary: Regex,
    alternative_1: Regex,
    alternative_2: Regex,
    signage: Regex,
    infrastructure: Regex,
    architecture: Regex,
    environment: Regex,
    cultural: Regex,
    most_probable: Regex,
    certainty: Regex,
    landmark: Regex,
}

impl FieldPatterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            country: labeled(&["Country"])?,
            region: labeled(&["Region/City", "City/Region", "Region or City"])?,
            region_loose: labeled(&["City", "Region"])?,
            confidence: labeled(&["Confidence Level", "Confidence"])?,
            primary: labeled(&["Primary Location", "Primary Coordinates"])?,
            alternative_1: labeled(&["Alternative Location 1"])?,
            alternative_2: labeled(&["Alternative Location 2"])?,
            signage: labeled(&["Signage", "Signs", "Text/Signage"])?,
            infrastructure: labeled(&["Infrastructure"])?,
            architecture: labeled(&["Architecture"])?,
            environment: labeled(&["Environment", "Vegetation/Climate"])?,
            cultural: labeled(&["Cultural Elements", "Cultural"])?,
            most_probable: labeled(&["Most Probable Location"])?,
            certainty: labeled(&["Certainty Level", "Certainty"])?,
            landmark: labeled(&["Primary Landmark", "Key Landmark"])?,
        })
    }
}

static PATTERNS: Lazy<Result<FieldPatterns, regex::Error>> = Lazy::new(FieldPatterns::compile);

static COORDINATE_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[\s(\[]*([-+]?\d+(?:\.\d+)?)\s*°?\s*([NSns])?\s*,\s*([-+]?\d+(?:\.\d+)?)\s*°?\s*([EWew])?",
    )
    .unwrap()
});

static LEADING_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d+)").unwrap());

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```(?:json|JSON)?").unwrap());

/// Parse a model reply into an [`AnalysisResult`].
///
/// Never fails: an internal error produces the uniform "Parsing Error" shape
/// with the raw text preserved under `reasoning`.
pub fn parse_analysis(text: &str) -> AnalysisResult {
    match try_parse(text) {
        Ok(result) => result,
        Err(err) => {
            warn!(error = %err, "Model reply could not be parsed");
            AnalysisResult::parsing_error(text, err.to_string())
        }
    }
}

fn try_parse(text: &str) -> Result<AnalysisResult, ParseError> {
    let patterns = PATTERNS.as_ref().map_err(|e| ParseError::Pattern(e.clone()))?;
    let mut result = AnalysisResult::empty(text);

    if let Some(v) = field(&patterns.country, text) {
        result.country = v;
    }
    // A bare `Region:` or `City:` only counts when the combined label is absent.
    if let Some(v) = field(&patterns.region, text).or_else(|| field(&patterns.region_loose, text)) {
        result.region_or_city = v;
    }
    if let Some(c) = field(&patterns.confidence, text).and_then(|v| Confidence::from_label(&v)) {
        result.confidence = c;
    }

    let detailed = &mut result.detailed_analysis;
    if let Some((pair, text_pair)) = coordinates(&patterns.primary, text) {
        detailed.primary_coordinates = pair;
        if let Some(literal) = text_pair {
            result.coordinates = literal;
        }
    }
    detailed.alternative_locations = [
        coordinates(&patterns.alternative_1, text).map(|(p, _)| p).unwrap_or_default(),
        coordinates(&patterns.alternative_2, text).map(|(p, _)| p).unwrap_or_default(),
    ];

    let evidence = &mut detailed.evidence;
    for (pattern, slot) in [
        (&patterns.signage, &mut evidence.signage),
        (&patterns.infrastructure, &mut evidence.infrastructure),
        (&patterns.architecture, &mut evidence.architecture),
        (&patterns.environment, &mut evidence.environment),
        (&patterns.cultural, &mut evidence.cultural_elements),
    ] {
        if let Some(v) = field(pattern, text) {
            *slot = v;
        }
    }

    let assessment = &mut detailed.final_assessment;
    if let Some(v) = field(&patterns.most_probable, text) {
        assessment.most_probable_location = v;
    }
    if let Some(v) = field(&patterns.landmark, text) {
        assessment.primary_landmark = v;
    }
    if let Some(v) = field(&patterns.certainty, text) {
        if let Some(digits) = LEADING_INTEGER.captures(&v).and_then(|c| c.get(1)) {
            assessment.certainty_percentage = digits
                .as_str()
                .parse()
                .map_err(|_| ParseError::Certainty(digits.as_str().to_string()))?;
        }
    }

    if let Some(object) = json_reply(text) {
        debug!("Model reply is a JSON object, applying its keys");
        apply_json(&mut result, &object);
    }

    Ok(result)
}

/// First line matching `pattern`, with surrounding whitespace and markdown stripped.
fn field(pattern: &Regex, text: &str) -> Option<String> {
    let raw = pattern.captures(text)?.get(1)?.as_str();
    let value = raw.trim().trim_matches(|c| c == '*' || c == '_').trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Parsed pair plus its literal `"lat, lng"` text, when the label is present.
///
/// A label whose value is not numeric yields null components.
fn coordinates(pattern: &Regex, text: &str) -> Option<(LatLng, Option<String>)> {
    let value = field(pattern, text)?;
    match coordinate_pair(&value) {
        Some((pair, literal)) => Some((pair, Some(literal))),
        None => Some((LatLng::default(), None)),
    }
}

/// `"<float>, <float>"`, optionally with degree signs and N/S/E/W suffixes.
fn coordinate_pair(value: &str) -> Option<(LatLng, String)> {
    let caps = COORDINATE_PAIR.captures(value)?;
    let lat_text = signed(&caps[1], caps.get(2).map(|m| m.as_str()), "S");
    let lng_text = signed(&caps[3], caps.get(4).map(|m| m.as_str()), "W");
    let pair = LatLng {
        lat: lat_text.parse().ok(),
        lng: lng_text.parse().ok(),
    };
    Some((pair, format!("{lat_text}, {lng_text}")))
}

/// Apply a southern/western hemisphere suffix as a minus sign.
fn signed(number: &str, hemisphere: Option<&str>, negative: &str) -> String {
    match hemisphere {
        Some(h) if h.eq_ignore_ascii_case(negative) && !number.starts_with('-') => {
            format!("-{}", number.trim_start_matches('+'))
        }
        _ => number.to_string(),
    }
}

/// The reply as a JSON object, after removing markdown code fences.
fn json_reply(text: &str) -> Option<Map<String, Value>> {
    let cleaned = CODE_FENCE.replace_all(text.trim(), "");
    match serde_json::from_str::<Value>(cleaned.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn apply_json(result: &mut AnalysisResult, object: &Map<String, Value>) {
    let text = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    if let Some(v) = text("country") {
        result.country = v;
    }
    if let Some(v) = text("region_or_city") {
        result.region_or_city = v;
    }
    if let Some(c) = text("confidence").and_then(|v| Confidence::from_label(&v)) {
        result.confidence = c;
    }

    let pair = match object.get("coordinates") {
        Some(Value::String(s)) => coordinate_pair(s),
        Some(Value::Object(c)) => {
            let lat = c.get("lat").or_else(|| c.get("latitude")).and_then(Value::as_f64);
            let lng = c.get("lng").or_else(|| c.get("longitude")).and_then(Value::as_f64);
            let pair = LatLng { lat, lng };
            pair.display_pair().map(|literal| (pair, literal))
        }
        _ => None,
    };
    if let Some((pair, literal)) = pair {
        result.detailed_analysis.primary_coordinates = pair;
        result.coordinates = literal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE_REPLY: &str = "\
Country: France
Region/City: Paris, Île-de-France
Confidence: High
Primary Location: 48.858370, 2.294481
Alternative Location 1: 48.853000, 2.349900
Alternative Location 2: 48.860600, 2.337600
Signage: French street signs with blue enamel plates
Infrastructure: Haussmann-style boulevards, Vélib' docks
Architecture: Wrought-iron lattice tower
Environment: Temperate, plane trees along the river
Cultural Elements: Tricolour flags
Most Probable Location: Champ de Mars, Paris, France
Certainty Level: 92%
Primary Landmark: Eiffel Tower
";

    #[test]
    fn extracts_every_template_field() {
        let r = parse_analysis(TEMPLATE_REPLY);
        assert_eq!(r.country, "France");
        assert_eq!(r.region_or_city, "Paris, Île-de-France");
        assert_eq!(r.confidence, Confidence::High);
        assert_eq!(r.coordinates, "48.858370, 2.294481");
        assert_eq!(r.reasoning, TEMPLATE_REPLY);
        assert!(r.error.is_none());

        let d = &r.detailed_analysis;
        assert_eq!(d.primary_coordinates, LatLng::new(48.85837, 2.294481));
        assert_eq!(d.alternative_locations[0], LatLng::new(48.853, 2.3499));
        assert_eq!(d.alternative_locations[1], LatLng::new(48.8606, 2.3376));
        assert_eq!(d.evidence.signage, "French street signs with blue enamel plates");
        assert_eq!(d.evidence.infrastructure, "Haussmann-style boulevards, Vélib' docks");
        assert_eq!(d.evidence.architecture, "Wrought-iron lattice tower");
        assert_eq!(d.evidence.environment, "Temperate, plane trees along the river");
        assert_eq!(d.evidence.cultural_elements, "Tricolour flags");
        assert_eq!(d.final_assessment.most_probable_location, "Champ de Mars, Paris, France");
        assert_eq!(d.final_assessment.certainty_percentage, 92);
        assert_eq!(d.final_assessment.primary_landmark, "Eiffel Tower");
    }

    #[test]
    fn missing_labels_fall_back_to_defaults() {
        let r = parse_analysis("I think this is somewhere in Europe.\nCountry: Spain\n");
        assert_eq!(r.country, "Spain");
        assert_eq!(r.region_or_city, "Unknown");
        assert_eq!(r.confidence, Confidence::Medium);
        assert_eq!(r.coordinates, "N/A");
        let d = &r.detailed_analysis;
        assert_eq!(d.primary_coordinates, LatLng::default());
        assert_eq!(d.alternative_locations, [LatLng::default(); 2]);
        assert_eq!(d.evidence.signage, "Not specified");
        assert_eq!(d.final_assessment.most_probable_location, "Unknown");
        assert_eq!(d.final_assessment.certainty_percentage, 50);
        assert_eq!(d.final_assessment.primary_landmark, "Not specified");
        assert!(r.error.is_none());
    }

    #[test]
    fn empty_reply_is_all_defaults() {
        let r = parse_analysis("");
        assert_eq!(r, AnalysisResult::empty(""));
    }

    #[test]
    fn tolerates_markdown_around_labels() {
        let reply = "- **Country:** Japan\n* **Region/City**: Kyoto\n**Certainty Level:** 75%\n";
        let r = parse_analysis(reply);
        assert_eq!(r.country, "Japan");
        assert_eq!(r.region_or_city, "Kyoto");
        assert_eq!(r.detailed_analysis.final_assessment.certainty_percentage, 75);
    }

    #[test]
    fn labels_are_line_anchored_and_first_match_wins() {
        let reply = "The Country: line below matters\nCountry: Chile\nCountry: Peru\n";
        assert_eq!(parse_analysis(reply).country, "Chile");
    }

    #[test]
    fn combined_region_label_beats_a_bare_one() {
        let r = parse_analysis("Region: Western Europe\nRegion/City: Paris\n");
        assert_eq!(r.region_or_city, "Paris");
        assert_eq!(parse_analysis("City: Porto\n").region_or_city, "Porto");
    }

    #[test]
    fn low_precision_coordinates_still_parse() {
        let r = parse_analysis("Primary Location: 35.7, 139\n");
        assert_eq!(r.detailed_analysis.primary_coordinates, LatLng::new(35.7, 139.0));
        assert_eq!(r.coordinates, "35.7, 139");
    }

    #[test]
    fn hemisphere_suffixes_set_the_sign() {
        let r = parse_analysis("Primary Location: 33.8568° S, 151.2153° E\n");
        assert_eq!(r.detailed_analysis.primary_coordinates, LatLng::new(-33.8568, 151.2153));
        assert_eq!(r.coordinates, "-33.8568, 151.2153");
    }

    #[test]
    fn non_numeric_coordinates_are_null_not_an_error() {
        let r = parse_analysis("Primary Location: somewhere near the coast, maybe\n");
        assert_eq!(r.detailed_analysis.primary_coordinates, LatLng::default());
        assert_eq!(r.coordinates, "N/A");
        assert!(r.error.is_none());
    }

    #[test]
    fn unrecognized_confidence_keeps_default() {
        let r = parse_analysis("Confidence: fairly certain\n");
        assert_eq!(r.confidence, Confidence::Medium);
    }

    #[test]
    fn overflowing_certainty_yields_parsing_error_shape() {
        let reply = "Country: Italy\nCertainty Level: 99999999999999999999%\n";
        let r = parse_analysis(reply);
        assert_eq!(r.country, "Parsing Error");
        assert_eq!(r.confidence, Confidence::Low);
        assert_eq!(r.reasoning, reply);
        assert!(r.error.unwrap().contains("99999999999999999999"));
    }

    #[test]
    fn fenced_json_reply_is_honoured() {
        let reply = "```json\n{\"country\": \"Brazil\", \"region_or_city\": \"Rio de Janeiro\", \
                     \"coordinates\": \"-22.9519, -43.2105\", \"confidence\": \"high\", \
                     \"reasoning\": \"Christ the Redeemer\"}\n```";
        let r = parse_analysis(reply);
        assert_eq!(r.country, "Brazil");
        assert_eq!(r.region_or_city, "Rio de Janeiro");
        assert_eq!(r.confidence, Confidence::High);
        assert_eq!(r.coordinates, "-22.9519, -43.2105");
        assert_eq!(r.detailed_analysis.primary_coordinates, LatLng::new(-22.9519, -43.2105));
        assert_eq!(r.reasoning, reply);
    }

    #[test]
    fn json_object_coordinates() {
        let reply = r#"{"country": "Kenya", "coordinates": {"lat": -1.2864, "lng": 36.8172}}"#;
        let r = parse_analysis(reply);
        assert_eq!(r.country, "Kenya");
        assert_eq!(r.detailed_analysis.primary_coordinates, LatLng::new(-1.2864, 36.8172));
    }
}
