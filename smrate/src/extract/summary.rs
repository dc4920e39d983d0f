//! Ratings-overview extraction.
//!
//! The overview page's rating breakdown renders six slider widgets; the first
//! three are the aggregate helpfulness, clarity and easiness scores, in that
//! order. The remaining three are other site metrics this engine ignores.

use super::ExtractError;
use crate::professor::RatingSummary;
use regex::Regex;
use std::sync::OnceLock;

/// Number of slider widgets the breakdown is expected to carry.
const EXPECTED_SLIDERS: usize = 6;

/// A slider block and the numeric rating rendered inside it.
fn slider_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?s)class="rating-slider"[^>]*>.*?class="rating"[^>]*>\s*([^<\s]+)\s*<"#)
            .expect("slider pattern is valid")
    })
}

/// Extracts the three aggregate rating dimensions from an overview document.
///
/// # Errors
///
/// [`ExtractError::EmptyDocument`] for a blank response;
/// [`ExtractError::MissingRatingSliders`] unless exactly six sliders are
/// found; [`ExtractError::SliderValueInvalid`] if a slider's rendered value
/// is not numeric.
pub fn extract_rating_summary(document: &str) -> Result<RatingSummary, ExtractError> {
    if document.trim().is_empty() {
        return Err(ExtractError::EmptyDocument);
    }

    // Scope to the left column of the rating breakdown, where the six
    // sliders live; the marker precedes every slider widget.
    let region = document
        .find("left-breakdown")
        .map(|pos| &document[pos..])
        .unwrap_or(document);

    let values: Vec<&str> = slider_pattern()
        .captures_iter(region)
        .map(|caps| caps.get(1).expect("slider capture").as_str())
        .collect();

    if values.len() != EXPECTED_SLIDERS {
        return Err(ExtractError::MissingRatingSliders {
            found: values.len(),
        });
    }

    let mut parsed = values.iter().take(3).map(|raw| {
        raw.parse::<f64>()
            .map_err(|_| ExtractError::SliderValueInvalid(raw.to_string()))
    });

    // Positional: helpfulness, clarity, easiness are the first three sliders
    Ok(RatingSummary {
        helpfulness: parsed.next().expect("three sliders taken")?,
        clarity: parsed.next().expect("three sliders taken")?,
        easiness: parsed.next().expect("three sliders taken")?,
    })
}
