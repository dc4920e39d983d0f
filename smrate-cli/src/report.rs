//! Terminal rendering of settled entities.
//!
//! Renders the same information the engine's notifications carry: the
//! aggregate sliders, the score/SD table with its review count, the ranked
//! tag list, and on request the full review listing.

use smrate::professor::{Completion, Professor};
use smrate::stats::ProfessorStats;
use std::fmt::Write;

/// Renders one settled entity as a report block.
pub fn render_entity(professor: &Professor, stats: Option<&ProfessorStats>, top_tags: usize) -> String {
    let mut out = String::new();

    match professor.school_name.as_deref() {
        Some(school) => {
            let _ = writeln!(out, "{} – {}", professor.display_name, school);
        }
        None => {
            let _ = writeln!(out, "{}", professor.display_name);
        }
    }

    if professor.completion() == Completion::NotAvailable {
        let _ = writeln!(out, "  Ratings not available.");
        return out;
    }

    if let Some(summary) = &professor.rating_summary {
        let _ = writeln!(
            out,
            "  Helpfulness: {}  Clarity: {}  Easiness: {}",
            summary.helpfulness, summary.clarity, summary.easiness
        );
    }

    let Some(stats) = stats else {
        return out;
    };

    let _ = writeln!(out, "  {:<12} {:>6} {:>6}", "Item", "Score", "SD");
    for (label, dimension) in [
        ("Helpfulness", stats.table.helpfulness),
        ("Clarity", stats.table.clarity),
        ("Easiness", stats.table.easiness),
    ] {
        let _ = writeln!(
            out,
            "  {:<12} {:>6} {:>6}",
            label, dimension.score, dimension.sd
        );
    }

    let noun = if stats.table.total_reviews == 1 {
        "review"
    } else {
        "reviews"
    };
    let _ = writeln!(out, "  based on {} {}", stats.table.total_reviews, noun);

    if !stats.ranked_tags.is_empty() && top_tags > 0 {
        let tags: Vec<String> = stats
            .ranked_tags
            .iter()
            .take(top_tags)
            .map(|tag| format!("{} ({})", tag.name, tag.count))
            .collect();
        let _ = writeln!(out, "  Top tags: {}", tags.join(", "));
    }

    out
}

/// Renders the full review listing for an entity.
pub fn render_reviews(professor: &Professor) -> String {
    let mut out = String::new();

    let noun = if professor.reviews.len() == 1 {
        "review"
    } else {
        "reviews"
    };
    let _ = writeln!(
        out,
        "Listing {} {} for {}",
        professor.reviews.len(),
        noun,
        professor.display_name
    );

    for review in &professor.reviews {
        let _ = writeln!(
            out,
            "  [{} / {} / {}] {} – {}",
            review.helpfulness, review.clarity, review.easiness, review.date, review.class_taken
        );
        let _ = writeln!(out, "    {}", review.comments);
        if !review.tags.is_empty() {
            let _ = writeln!(out, "    Tags: {}", review.tags.join(", "));
        }
    }

    out
}
