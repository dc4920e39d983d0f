//! URL construction for the ratings site endpoints.
//!
//! Three endpoints are used, and their query parameters must match the
//! upstream service exactly:
//!
//! - search: `search.jsp?queryBy=teacherName&queryoption=HEADER&query=<name>&facetSearch=true&schoolName=<facet>`
//! - ratings overview: `ShowRatings.jsp?tid=<site id>`
//! - paginated reviews: `paginate/professors/ratings?tid=<site id>&page=<n>` (1-based)
//!
//! Review pages carry a fixed 12 records; the first page's `remaining` field
//! drives the total page count.

use crate::professor::SiteId;

/// Number of review records per page, fixed by the upstream service.
pub const PAGE_SIZE: u32 = 12;

/// Computes the total number of review pages from page 1's `remaining` count.
///
/// `remaining` is the number of records *after* the first page, so the first
/// page's own records are added back before dividing:
/// `ceil((remaining + PAGE_SIZE) / PAGE_SIZE)`. A professor with zero further
/// records still has one page.
pub fn total_pages(remaining: u32) -> u32 {
    (remaining + PAGE_SIZE).div_ceil(PAGE_SIZE)
}

/// Builds the search-results URL for an instructor name.
///
/// The name is percent-encoded; the school facet is passed through verbatim
/// (the upstream facet value uses `+` separators, e.g.
/// `rochester+institute+of+technology`).
pub fn search_url(base_url: &str, full_name: &str, school_facet: &str) -> String {
    format!(
        "{}/search.jsp?queryBy=teacherName&queryoption=HEADER&query={}&facetSearch=true&schoolName={}",
        base_url,
        urlencoding::encode(full_name),
        school_facet
    )
}

/// Builds the ratings-overview URL for a site identifier.
pub fn ratings_url(base_url: &str, site_id: &SiteId) -> String {
    format!("{}/ShowRatings.jsp?tid={}", base_url, site_id)
}

/// Builds the URL of one 1-based review page for a site identifier.
pub fn review_page_url(base_url: &str, site_id: &SiteId, page: u32) -> String {
    format!(
        "{}/paginate/professors/ratings?tid={}&page={}",
        base_url, site_id, page
    )
}
