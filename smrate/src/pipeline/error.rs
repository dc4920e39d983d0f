//! Error types for the retrieval pipeline.
//!
//! Errors are categorized by pipeline stage to aid in debugging. They are
//! diagnostic-only: every one of them maps to the same terminal
//! `NotAvailable` entity state, so stage-level detail never reaches the
//! public API.

use crate::extract::ExtractError;
use crate::fetch::FetchError;
use thiserror::Error;

/// The underlying failure inside a stage: transport or extraction.
#[derive(Debug, Clone, Error)]
pub enum StageFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// A stage-attributed pipeline failure.
///
/// All variants are terminal for the owning pipeline; nothing is retried.
#[derive(Debug, Clone, Error)]
pub enum StageError {
    /// Search stage failed: no usable search result or the fetch itself
    /// failed.
    #[error("search stage failed: {0}")]
    Search(#[source] StageFailure),

    /// Summary stage failed: overview document missing, malformed, or the
    /// fetch itself failed.
    #[error("summary stage failed: {0}")]
    Summary(#[source] StageFailure),

    /// A review page request or its parse failed. Any single page failure
    /// fails the whole review stage.
    #[error("review page {page} failed: {source}")]
    Reviews {
        page: u32,
        #[source]
        source: StageFailure,
    },
}

impl StageError {
    pub(crate) fn search(failure: impl Into<StageFailure>) -> Self {
        StageError::Search(failure.into())
    }

    pub(crate) fn summary(failure: impl Into<StageFailure>) -> Self {
        StageError::Summary(failure.into())
    }

    pub(crate) fn review_page(page: u32, failure: impl Into<StageFailure>) -> Self {
        StageError::Reviews {
            page,
            source: failure.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_display() {
        let err = StageError::search(ExtractError::NoMatchFound);
        assert_eq!(
            format!("{}", err),
            "search stage failed: no matching search result"
        );

        let err = StageError::review_page(3, FetchError::Http("HTTP 500".to_string()));
        assert_eq!(
            format!("{}", err),
            "review page 3 failed: HTTP error: HTTP 500"
        );
    }

    #[test]
    fn test_failures_convert_from_both_boundaries() {
        let from_fetch: StageFailure = FetchError::Http("x".to_string()).into();
        assert!(matches!(from_fetch, StageFailure::Fetch(_)));

        let from_extract: StageFailure = ExtractError::EmptyDocument.into();
        assert!(matches!(from_extract, StageFailure::Extract(_)));
    }
}
