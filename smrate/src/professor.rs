//! Entity model for rated instructors.
//!
//! A [`Professor`] is the aggregate record of one instructor's fetched rating
//! data. It is created by the store in the `Retrieving` state and populated
//! exclusively by the fetch pipeline until it reaches a terminal state. All
//! other components read it through a [`SharedProfessor`] handle.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Shared handle to a professor entity.
///
/// The store owns the map of these; the pipeline holds one transiently while
/// populating it; subscribers receive clones at publish time. Write access
/// outside the pipeline is a bug.
pub type SharedProfessor = Arc<RwLock<Professor>>;

/// Normalized identity of an instructor: the case-folded full name.
///
/// Keys are stable for the lifetime of the store and serve as both the cache
/// lookup key and the per-entity notification topic. Two instructors whose
/// names case-fold identically share a key; the upstream search endpoint
/// cannot distinguish them either.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProfessorKey(String);

impl ProfessorKey {
    /// Creates a key by case-folding the full name.
    pub fn new(full_name: &str) -> Self {
        Self(full_name.to_lowercase())
    }

    /// Returns the normalized key string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProfessorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of an instructor on the ratings site.
///
/// Extracted from the first matching search result's link target; only ever
/// interpolated back into ratings and review-page URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteId(String);

impl SiteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SiteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Data-availability lifecycle of a professor entity.
///
/// Advances forward only: `Retrieving → Summary → Reviews`, or to the
/// terminal `NotAvailable` from any earlier state on a stage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Completion {
    /// Entity created, pipeline not yet produced data.
    Retrieving,
    /// Rating summary present; reviews still being fetched.
    Summary,
    /// All reviews ingested. Terminal success.
    Reviews,
    /// Retrieval failed or the name was a placeholder. Terminal.
    NotAvailable,
}

impl Completion {
    /// Returns true if no further transitions are possible from this state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Completion::Reviews | Completion::NotAvailable)
    }

    /// Returns true if a transition from `self` to `next` is legal.
    ///
    /// Legal transitions move one step forward through
    /// `Retrieving → Summary → Reviews`, or jump to `NotAvailable` from any
    /// non-terminal state. Everything else, including regressions, is
    /// rejected.
    pub fn can_advance_to(self, next: Completion) -> bool {
        match (self, next) {
            (Completion::Retrieving, Completion::Summary) => true,
            (Completion::Summary, Completion::Reviews) => true,
            (Completion::Retrieving | Completion::Summary, Completion::NotAvailable) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Completion::Retrieving => "retrieving",
            Completion::Summary => "summary",
            Completion::Reviews => "reviews",
            Completion::NotAvailable => "not-available",
        };
        f.write_str(s)
    }
}

/// Aggregate rating dimensions from the instructor's overview page.
///
/// All three values are on the site's 0.0–5.0 scale with one-decimal
/// granularity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub helpfulness: f64,
    pub clarity: f64,
    pub easiness: f64,
}

/// A single student review. Immutable once constructed by the review stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub helpfulness: f64,
    pub clarity: f64,
    pub easiness: f64,
    pub date: String,
    pub class_taken: String,
    pub comments: String,
    pub tags: Vec<String>,
}

/// Tag occurrence counter preserving first-seen order.
///
/// Counts live in a map for O(1) increment; the separate `order` list records
/// each tag the first time it appears. That order is the tie-break when tags
/// are ranked by count, so it must be kept exactly.
#[derive(Debug, Clone, Default)]
pub struct TagCounter {
    counts: HashMap<String, u32>,
    order: Vec<String>,
}

impl TagCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one occurrence of `tag`, creating the entry on first sight.
    pub fn add(&mut self, tag: &str) {
        match self.counts.get_mut(tag) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(tag.to_string(), 1);
                self.order.push(tag.to_string());
            }
        }
    }

    /// Returns the count for `tag`, zero if never seen.
    pub fn count(&self, tag: &str) -> u32 {
        self.counts.get(tag).copied().unwrap_or(0)
    }

    /// Iterates `(tag, count)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.order
            .iter()
            .map(|tag| (tag.as_str(), self.counts[tag]))
    }

    /// Number of distinct tags seen.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Sum of all occurrence counts.
    pub fn total(&self) -> u64 {
        self.counts.values().map(|&c| u64::from(c)).sum()
    }
}

/// The aggregate record of one instructor's fetched rating data.
#[derive(Debug, Clone)]
pub struct Professor {
    /// Normalized lookup key. Never changes after creation.
    key: ProfessorKey,

    /// Original-case full name as observed by the caller.
    pub display_name: String,

    /// Affiliated school label from the search results, if present.
    pub school_name: Option<String>,

    /// Site identifier from the first matching search result.
    pub site_id: Option<SiteId>,

    /// Aggregate dimensions, present once the summary stage succeeds.
    pub rating_summary: Option<RatingSummary>,

    /// Ingested reviews, append-only, in page order then in-page order.
    pub reviews: Vec<Review>,

    /// Tag occurrence counts across all ingested reviews.
    pub tag_counts: TagCounter,

    completion: Completion,
}

impl Professor {
    /// Creates a fresh entity in the `Retrieving` state.
    pub fn new(full_name: &str) -> Self {
        Self::with_completion(full_name, Completion::Retrieving)
    }

    /// Creates an entity already settled at `NotAvailable`.
    ///
    /// Used for placeholder names that must never trigger network activity.
    pub fn unavailable(full_name: &str) -> Self {
        Self::with_completion(full_name, Completion::NotAvailable)
    }

    fn with_completion(full_name: &str, completion: Completion) -> Self {
        Self {
            key: ProfessorKey::new(full_name),
            display_name: full_name.to_string(),
            school_name: None,
            site_id: None,
            rating_summary: None,
            reviews: Vec::new(),
            tag_counts: TagCounter::new(),
            completion,
        }
    }

    #[inline]
    pub fn key(&self) -> &ProfessorKey {
        &self.key
    }

    #[inline]
    pub fn completion(&self) -> Completion {
        self.completion
    }

    /// Attempts to advance the completion state.
    ///
    /// Returns false and leaves the entity untouched if the transition would
    /// regress or leave a terminal state. The pipeline is the only writer, so
    /// a refusal indicates a pipeline bug; callers log it.
    #[must_use]
    pub fn advance(&mut self, next: Completion) -> bool {
        if self.completion.can_advance_to(next) {
            self.completion = next;
            true
        } else {
            false
        }
    }

    /// Records the summary-stage outcome: aggregate ratings plus provenance.
    ///
    /// Returns false if the entity is not in `Retrieving`.
    #[must_use]
    pub fn record_summary(
        &mut self,
        summary: RatingSummary,
        site_id: SiteId,
        school_name: Option<String>,
    ) -> bool {
        if !self.advance(Completion::Summary) {
            return false;
        }
        self.rating_summary = Some(summary);
        self.site_id = Some(site_id);
        self.school_name = school_name;
        true
    }

    /// Ingests the full review set and advances to `Reviews`.
    ///
    /// Reviews are appended in the order given; every tag occurrence in every
    /// review increments exactly one counter entry. Returns false (ingesting
    /// nothing) if the entity is not in `Summary`.
    #[must_use]
    pub fn record_reviews(&mut self, reviews: Vec<Review>) -> bool {
        if !self.advance(Completion::Reviews) {
            return false;
        }
        for review in reviews {
            for tag in &review.tags {
                self.tag_counts.add(tag);
            }
            self.reviews.push(review);
        }
        true
    }

    /// Marks the entity terminally unavailable after a stage failure.
    ///
    /// Returns false if the entity had already settled.
    #[must_use]
    pub fn mark_unavailable(&mut self) -> bool {
        self.advance(Completion::NotAvailable)
    }
}

/// Returns true for placeholder names that denote no real instructor.
///
/// Schedules list entries like "To Be Determined" or "TBD" where staffing is
/// unresolved; requesting those must short-circuit to `NotAvailable` without
/// any network activity.
pub fn is_placeholder_name(full_name: &str) -> bool {
    let folded = full_name.to_lowercase();
    folded.contains("to be determined") || folded.contains("tbd")
}
