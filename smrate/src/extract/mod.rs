//! Pure extractors over fetched documents and JSON payloads.
//!
//! Each extractor turns one of the three upstream payload shapes into a typed
//! value or a typed failure, with no I/O of its own:
//!
//! - search results document → [`SearchHit`] (site id + optional school label)
//! - ratings overview document → [`crate::professor::RatingSummary`]
//! - review page JSON → [`ReviewsPage`]
//!
//! The extractors know only the fragments of page structure they match on;
//! everything else about the documents is opaque to the engine.

mod reviews;
mod search;
mod summary;

pub use reviews::{parse_reviews_page, ReviewRecord, ReviewsPage};
pub use search::{extract_search_hit, SearchHit};
pub use summary::extract_rating_summary;

use thiserror::Error;

/// Typed extraction failures.
///
/// All of these are terminal for the owning pipeline; the variants exist for
/// diagnostics only and never reach the public entity state.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// Search results contained no professor listing link.
    #[error("no matching search result")]
    NoMatchFound,

    /// A listing link was present but its target carried no site identifier.
    #[error("could not extract site id from link target: {0}")]
    SiteIdUnparseable(String),

    /// Summary document was empty.
    #[error("no document to analyze")]
    EmptyDocument,

    /// Summary document did not carry the expected six rating sliders.
    #[error("expected 6 rating sliders, found {found}")]
    MissingRatingSliders { found: usize },

    /// A rating slider's value was not numeric.
    #[error("rating slider value is not a number: {0}")]
    SliderValueInvalid(String),

    /// A review page's JSON did not match the expected record shape.
    #[error("malformed review page: {0}")]
    MalformedReviewPage(String),
}
