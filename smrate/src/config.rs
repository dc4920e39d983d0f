//! Engine configuration.

use std::time::Duration;

/// Default ratings site base URL.
pub const DEFAULT_BASE_URL: &str = "http://www.ratemyprofessors.com";

/// Default school facet for search queries, in the site's own `+`-separated
/// form.
pub const DEFAULT_SCHOOL_FACET: &str = "rochester+institute+of+technology";

/// Configuration for the ratings engine.
///
/// # Example
///
/// ```
/// use smrate::config::EngineConfig;
///
/// let config = EngineConfig::default()
///     .with_school_facet("some+other+school")
///     .with_request_timeout(std::time::Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the ratings site. Overridable for tests and mirrors.
    pub base_url: String,

    /// School facet appended to search queries, verbatim.
    pub school_facet: String,

    /// Per-request timeout for the production fetcher. A stalled request
    /// fails its stage instead of leaving the entity in `Retrieving`.
    pub request_timeout: Duration,
}

impl EngineConfig {
    /// Replaces the base URL; a trailing slash is trimmed so endpoint
    /// builders can join paths unconditionally.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Replaces the school facet used in search queries.
    pub fn with_school_facet(mut self, school_facet: impl Into<String>) -> Self {
        self.school_facet = school_facet.into();
        self
    }

    /// Replaces the fetcher request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            school_facet: DEFAULT_SCHOOL_FACET.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}
