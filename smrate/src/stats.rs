//! Derived statistics over a populated entity.
//!
//! Everything here is a pure function of the entity's ingested reviews, so
//! results are memoized per entity key: an entity that has reached `Reviews`
//! never changes again, which makes key-based memoization sound.

use crate::professor::{Professor, ProfessorKey};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Statistics failures.
#[derive(Debug, Clone, Error)]
pub enum StatsError {
    /// The entity has no ingested reviews; averages are undefined.
    #[error("entity has no ingested reviews")]
    NoReviews,
}

/// Score and spread for one rating dimension, both rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionStats {
    /// Mean of the dimension across all reviews.
    pub score: f64,
    /// Population standard deviation of the dimension.
    pub sd: f64,
}

/// The per-dimension summary table computed from ingested reviews.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingTable {
    pub helpfulness: DimensionStats,
    pub clarity: DimensionStats,
    pub easiness: DimensionStats,
    pub total_reviews: usize,
}

/// One entry of the ranked tag list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedTag {
    pub name: String,
    pub count: u32,
}

/// Full derived statistics for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfessorStats {
    pub table: RatingTable,

    /// Tags ordered by descending count; equal counts keep the order in
    /// which the tags were first seen during ingestion.
    pub ranked_tags: Vec<RankedTag>,
}

/// Mean of the values.
fn average(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population (not sample) standard deviation.
fn population_std_dev(values: &[f64]) -> f64 {
    let avg = average(values);
    let avg_sq_diff = average(
        &values
            .iter()
            .map(|value| (value - avg) * (value - avg))
            .collect::<Vec<_>>(),
    );
    avg_sq_diff.sqrt()
}

/// Rounds to one decimal digit.
///
/// Uses `f64::round`, which rounds halfway cases away from zero; that is the
/// tie-break this engine commits to.
fn round1(n: f64) -> f64 {
    (n * 10.0).round() / 10.0
}

fn dimension_stats(values: &[f64]) -> DimensionStats {
    DimensionStats {
        score: round1(average(values)),
        sd: round1(population_std_dev(values)),
    }
}

/// Computes the full statistics for an entity.
///
/// # Errors
///
/// [`StatsError::NoReviews`] if the entity has no ingested reviews; callers
/// must not invoke this before the entity reaches `Reviews` completion.
pub fn compute(professor: &Professor) -> Result<ProfessorStats, StatsError> {
    if professor.reviews.is_empty() {
        return Err(StatsError::NoReviews);
    }

    let mut helpfulness = Vec::with_capacity(professor.reviews.len());
    let mut clarity = Vec::with_capacity(professor.reviews.len());
    let mut easiness = Vec::with_capacity(professor.reviews.len());
    for review in &professor.reviews {
        helpfulness.push(review.helpfulness);
        clarity.push(review.clarity);
        easiness.push(review.easiness);
    }

    let table = RatingTable {
        helpfulness: dimension_stats(&helpfulness),
        clarity: dimension_stats(&clarity),
        easiness: dimension_stats(&easiness),
        total_reviews: professor.reviews.len(),
    };

    let mut ranked_tags: Vec<RankedTag> = professor
        .tag_counts
        .iter()
        .map(|(name, count)| RankedTag {
            name: name.to_string(),
            count,
        })
        .collect();
    // Stable sort: first-seen order is the tie-break for equal counts
    ranked_tags.sort_by(|a, b| b.count.cmp(&a.count));

    Ok(ProfessorStats { table, ranked_tags })
}

/// Per-entity memoization of [`compute`].
///
/// Safe because entities are only ever consulted here after settling at
/// `Reviews`, at which point their reviews and tags are frozen.
pub struct StatsCache {
    computed: Mutex<HashMap<ProfessorKey, Arc<ProfessorStats>>>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self {
            computed: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the memoized statistics for the entity, computing on first
    /// request.
    pub fn stats_for(&self, professor: &Professor) -> Result<Arc<ProfessorStats>, StatsError> {
        let mut computed = self.computed.lock().expect("stats cache poisoned");

        if let Some(stats) = computed.get(professor.key()) {
            return Ok(Arc::clone(stats));
        }

        let stats = Arc::new(compute(professor)?);
        computed.insert(professor.key().clone(), Arc::clone(&stats));
        Ok(stats)
    }

    /// Number of entities with memoized statistics.
    pub fn entry_count(&self) -> usize {
        self.computed.lock().expect("stats cache poisoned").len()
    }
}

impl Default for StatsCache {
    fn default() -> Self {
        Self::new()
    }
}
