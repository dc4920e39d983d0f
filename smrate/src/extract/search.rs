//! Search-results extraction.
//!
//! Pulls two things out of a search results document:
//!
//! - the affiliated-school label shown inside the results box (optional),
//! - the first professor listing's link target, whose trailing `tid=<digits>`
//!   is the instructor's opaque site identifier (required).

use super::ExtractError;
use crate::professor::SiteId;
use regex::Regex;
use std::sync::OnceLock;

/// Outcome of the search stage, threaded by value into the summary stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Site identifier of the first matching professor listing.
    pub site_id: SiteId,

    /// School label from the results box, when the page shows one.
    pub school_name: Option<String>,
}

/// First `<span class="sub">` after the results box marker.
fn school_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?s)<span class="sub"[^>]*>\s*(.*?)\s*</span>"#)
            .expect("school pattern is valid")
    })
}

/// First anchor inside a professor listing item.
///
/// The listing `<li>` carries both `listing` and `PROFESSOR` classes; the
/// anchor's href ends in the site id.
fn listing_link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"(?s)<li[^>]*class="[^"]*listing[^"]*PROFESSOR[^"]*"[^>]*>.*?<a[^>]*href="([^"]*)""#,
        )
        .expect("listing link pattern is valid")
    })
}

/// Trailing site id in a listing link target.
fn site_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"tid=(\d+)$").expect("site id pattern is valid"))
}

/// Extracts the first matching professor and school label from a search
/// results document.
///
/// # Errors
///
/// [`ExtractError::NoMatchFound`] if no professor listing link exists;
/// [`ExtractError::SiteIdUnparseable`] if the link target carries no
/// trailing `tid=<digits>`.
pub fn extract_search_hit(document: &str) -> Result<SearchHit, ExtractError> {
    // The school label lives inside the results box; scope the span search
    // to everything after the box marker so page chrome can't match first.
    let school_name = document.find("searchResultsBox").and_then(|pos| {
        school_pattern()
            .captures(&document[pos..])
            .map(|caps| caps[1].to_string())
            .filter(|label| !label.is_empty())
    });

    let href = listing_link_pattern()
        .captures(document)
        .map(|caps| caps[1].to_string())
        .ok_or(ExtractError::NoMatchFound)?;

    let site_id = site_id_pattern()
        .captures(&href)
        .map(|caps| SiteId::new(&caps[1]))
        .ok_or_else(|| ExtractError::SiteIdUnparseable(href.clone()))?;

    Ok(SearchHit {
        site_id,
        school_name,
    })
}
