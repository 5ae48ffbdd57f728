//! Prompts sent to the generative model.
//!
//! All of them end with the same labeled template so that
//! [`crate::parser::parse_analysis`] can read the reply.

/// Labeled answer layout shared by every prompt.
pub const RESPONSE_TEMPLATE: &str = "\
Country: <country name>
Region/City: <region, state or city>
Confidence: <High|Medium|Low>
Primary Location: <latitude>, <longitude>
Alternative Location 1: <latitude>, <longitude>
Alternative Location 2: <latitude>, <longitude>
Signage: <languages, scripts, road signs, shop fronts>
Infrastructure: <road markings, driving side, poles, bollards, plates>
Architecture: <building styles, materials, roofs>
Environment: <vegetation, terrain, climate, sun position>
Cultural Elements: <clothing, vehicles, flags, commerce>
Most Probable Location: <place, city, country>
Certainty Level: <0-100>%
Primary Landmark: <the single most identifying feature, or None>";

const FORENSIC_INSTRUCTIONS: &str = "\
You are an expert OSINT geolocation analyst. Determine where this photograph \
was taken using only what is visible in it.

Work through the evidence methodically:
1. Text and signage: language, script, fonts, phone number formats, domain suffixes.
2. Infrastructure: driving side, road markings, bollards, utility poles, licence plates.
3. Architecture: construction materials, roof shapes, window styles, urban layout.
4. Environment: vegetation, soil colour, terrain, weather, sun angle and shadows.
5. Cultural elements: clothing, vehicles, brands, flags, religious buildings.
6. Landmarks: any recognizable building, monument or natural feature.

Cross-check the clues against each other and discard those that conflict. \
Give coordinates in decimal degrees with six decimal places. \
The alternative locations are your next two best candidates.";

/// Long-form forensic prompt for a single image.
pub fn single_image_prompt() -> String {
    format!(
        "{FORENSIC_INSTRUCTIONS}\n\nAfter your reasoning, answer using exactly these labels, one per line:\n\n{RESPONSE_TEMPLATE}"
    )
}

/// Triangulation prompt for `image_count` photographs of the same place.
pub fn multi_image_prompt(image_count: usize) -> String {
    format!(
        "You are an expert OSINT geolocation analyst. You are given {image_count} photographs \
that were taken at or near the same location.\n\n\
Analyze each image on its own first, noting its signage, infrastructure, architecture, \
environment and cultural elements. Then triangulate: combine the independent clues from all \
{image_count} images, prefer locations consistent with every image, and explain which image \
contributed which piece of evidence. Treat a clue seen in several images as stronger than one \
seen in a single image.\n\n\
Give coordinates in decimal degrees with six decimal places. After your reasoning, answer for \
the combined set using exactly these labels, one per line:\n\n{RESPONSE_TEMPLATE}"
    )
}

/// Shorter prompt used when the lens path has no vision clues to work from.
pub fn lens_fallback_prompt() -> String {
    format!(
        "Act like a visual search engine. Identify this place: name any recognizable landmark, \
building or business, then estimate the location from visible signs and surroundings. \
Answer using exactly these labels, one per line:\n\n{RESPONSE_TEMPLATE}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_carry_the_template() {
        for prompt in [single_image_prompt(), multi_image_prompt(3), lens_fallback_prompt()] {
            assert!(prompt.contains("Primary Location:"));
            assert!(prompt.contains("Certainty Level:"));
        }
    }

    #[test]
    fn multi_image_prompt_mentions_count() {
        let prompt = multi_image_prompt(4);
        assert!(prompt.contains("given 4 photographs"));
        assert!(prompt.contains("triangulate"));
    }
}
