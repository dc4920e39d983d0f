//! Review-page JSON extraction.
//!
//! Review pages are a JSON feed. Only the fields this engine needs are
//! deserialized; everything else in the payload is ignored. Field names are
//! the upstream wire names.

use super::ExtractError;
use crate::professor::Review;
use serde::Deserialize;
use serde_json::Value;

/// One page of the paginated review feed.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewsPage {
    /// Number of records after this page. Only page 1's value is consulted,
    /// to compute the total page count.
    pub remaining: u32,

    /// The rating records on this page, in feed order.
    pub ratings: Vec<ReviewRecord>,
}

/// One rating record as the feed serves it.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRecord {
    #[serde(rename = "rHelpful")]
    pub helpful: f64,

    #[serde(rename = "rClarity")]
    pub clarity: f64,

    #[serde(rename = "rEasy")]
    pub easy: f64,

    #[serde(rename = "rDate")]
    pub date: String,

    #[serde(rename = "rClass")]
    pub class: String,

    #[serde(rename = "rComments")]
    pub comments: String,

    #[serde(rename = "teacherRatingTags")]
    pub tags: Vec<String>,
}

impl ReviewRecord {
    /// Converts a wire record into the engine's [`Review`] value.
    ///
    /// Comment text is normalized here so every downstream consumer sees the
    /// same clean form: the feed escapes double quotes as `&quot;`.
    pub fn into_review(self) -> Review {
        Review {
            helpfulness: self.helpful,
            clarity: self.clarity,
            easiness: self.easy,
            date: self.date,
            class_taken: self.class,
            comments: self.comments.replace("&quot;", "\""),
            tags: self.tags,
        }
    }
}

/// Parses one review page from its JSON payload.
///
/// # Errors
///
/// [`ExtractError::MalformedReviewPage`] when the payload does not match the
/// expected record shape.
pub fn parse_reviews_page(json: Value) -> Result<ReviewsPage, ExtractError> {
    serde_json::from_value(json).map_err(|e| ExtractError::MalformedReviewPage(e.to_string()))
}
