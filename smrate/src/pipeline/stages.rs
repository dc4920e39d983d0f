//! The three pipeline stages.
//!
//! Each stage is an async function taking the previous stage's result by
//! value and returning its own, so nothing is shared between concurrent
//! pipeline runs. Stages do no entity mutation; the runner commits their
//! results.

use crate::config::EngineConfig;
use crate::endpoints;
use crate::extract::{
    extract_rating_summary, extract_search_hit, parse_reviews_page, SearchHit,
};
use crate::fetch::PageFetcher;
use crate::pipeline::error::StageError;
use crate::professor::{RatingSummary, Review, SiteId};
use futures::future::try_join_all;
use tracing::debug;

/// Outcome of the summary stage: the search hit it was derived from plus the
/// aggregate ratings.
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub hit: SearchHit,
    pub summary: RatingSummary,
}

/// Outcome of the review stage: every review across every page, in page
/// order then in-page order.
#[derive(Debug, Clone)]
pub struct ReviewBatch {
    pub reviews: Vec<Review>,
}

/// Stage 1: resolve the instructor's site identifier from the search view.
pub async fn search_stage<F: PageFetcher>(
    fetcher: &F,
    config: &EngineConfig,
    full_name: &str,
) -> Result<SearchHit, StageError> {
    let url = endpoints::search_url(&config.base_url, full_name, &config.school_facet);
    let document = fetcher
        .fetch_document(&url)
        .await
        .map_err(|e| StageError::search(e))?;

    let hit = extract_search_hit(&document).map_err(|e| StageError::search(e))?;
    debug!(full_name, site_id = %hit.site_id, "search stage resolved site id");
    Ok(hit)
}

/// Stage 2: fetch the ratings overview for the hit and extract the three
/// aggregate dimensions.
pub async fn summary_stage<F: PageFetcher>(
    fetcher: &F,
    config: &EngineConfig,
    hit: SearchHit,
) -> Result<SummaryOutcome, StageError> {
    let url = endpoints::ratings_url(&config.base_url, &hit.site_id);
    let document = fetcher
        .fetch_document(&url)
        .await
        .map_err(|e| StageError::summary(e))?;

    let summary = extract_rating_summary(&document).map_err(|e| StageError::summary(e))?;
    debug!(site_id = %hit.site_id, "summary stage extracted rating summary");
    Ok(SummaryOutcome { hit, summary })
}

/// Stage 3: paginated review fan-out with an all-or-nothing join.
///
/// Page 1 is fetched once up front to learn the total page count from its
/// `remaining` field, then every page (page 1 included) is requested
/// concurrently. If any page fails, the whole stage fails and no review is
/// committed; results from faster pages are only buffered inside the join.
pub async fn reviews_stage<F: PageFetcher>(
    fetcher: &F,
    config: &EngineConfig,
    site_id: &SiteId,
) -> Result<ReviewBatch, StageError> {
    let probe = fetch_page(fetcher, config, site_id, 1).await?;
    let total = endpoints::total_pages(probe.remaining);
    debug!(site_id = %site_id, remaining = probe.remaining, total_pages = total, "review fan-out starting");

    let pages = try_join_all(
        (1..=total).map(|page| fetch_page(fetcher, config, site_id, page)),
    )
    .await?;

    let mut reviews = Vec::new();
    for page in pages {
        for record in page.ratings {
            reviews.push(record.into_review());
        }
    }

    debug!(site_id = %site_id, reviews = reviews.len(), "review fan-out joined");
    Ok(ReviewBatch { reviews })
}

async fn fetch_page<F: PageFetcher>(
    fetcher: &F,
    config: &EngineConfig,
    site_id: &SiteId,
    page: u32,
) -> Result<crate::extract::ReviewsPage, StageError> {
    let url = endpoints::review_page_url(&config.base_url, site_id, page);
    let json = fetcher
        .fetch_json(&url)
        .await
        .map_err(|e| StageError::review_page(page, e))?;

    parse_reviews_page(json).map_err(|e| StageError::review_page(page, e))
}
