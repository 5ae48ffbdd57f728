//! Vision clue extractor: turns web-detection annotations into location clues.

use once_cell::sync::Lazy;
use regex::Regex;

use geolens_core::{ClueSource, LocationClue, VisionAnnotations};

/// Web entities at or below this score are noise.
pub const MIN_ENTITY_SCORE: f64 = 0.3;
/// Only the first pages with matching images are considered.
pub const MAX_PAGES: usize = 5;
/// Pages carry no native score.
pub const PAGE_TITLE_SCORE: f64 = 0.7;
pub const DEFAULT_LANDMARK_SCORE: f64 = 0.8;
pub const BEST_CLUE_COUNT: usize = 3;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Collect clues in source order: web entities, page titles, then landmarks.
///
/// The same place may appear once per source; nothing is deduplicated.
pub fn extract_clues(annotations: &VisionAnnotations) -> Vec<LocationClue> {
    let web = &annotations.web_detection;

    let entities = web.web_entities.iter().filter_map(|entity| {
        let description = entity.description.as_deref()?.trim();
        (entity.score > MIN_ENTITY_SCORE && !description.is_empty())
            .then(|| LocationClue::new(description, entity.score, ClueSource::WebEntity))
    });

    let pages = web
        .pages_with_matching_images
        .iter()
        .take(MAX_PAGES)
        .filter_map(|page| {
            let title = clean_title(page.page_title.as_deref()?);
            (!title.is_empty()).then(|| {
                LocationClue::new(title, PAGE_TITLE_SCORE, ClueSource::PageTitle)
                    .with_url(page.url.clone())
            })
        });

    let landmarks = annotations.landmark_annotations.iter().filter_map(|landmark| {
        let description = landmark.description.trim();
        (!description.is_empty()).then(|| {
            LocationClue::new(
                description,
                landmark.score.unwrap_or(DEFAULT_LANDMARK_SCORE),
                ClueSource::Landmark,
            )
        })
    });

    entities.chain(pages).chain(landmarks).collect()
}

/// The highest-scoring clues, best first. Ties keep source order.
pub fn best_clues(clues: &[LocationClue], count: usize) -> Vec<LocationClue> {
    let mut ranked = clues.to_vec();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(count);
    ranked
}

/// Page titles come back with `<b>` highlighting and HTML entities.
fn clean_title(raw: &str) -> String {
    let stripped = HTML_TAG.replace_all(raw, "");
    stripped
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
