//! Multi-stage asynchronous retrieval pipeline.
//!
//! One pipeline run populates one professor entity through three strictly
//! sequential stages:
//!
//! ```text
//! request → Search Stage → Summary Stage → Review Stage → Reviews (terminal)
//!               │               │               │
//!               └───────────────┴───────────────┴──► NotAvailable (terminal)
//! ```
//!
//! - **Search** resolves the instructor's site identifier (and school label)
//!   from the search results document.
//! - **Summary** fetches the ratings overview and records the three
//!   aggregate dimensions.
//! - **Reviews** probes page 1 for the total page count, fans out one
//!   request per page, and joins all-or-nothing: no review is committed
//!   unless every page succeeds.
//!
//! Stage results are threaded by value through explicit structs
//! ([`SearchHit`], [`SummaryOutcome`], [`ReviewBatch`]); concurrent pipeline
//! runs share no mutable state. Any stage failure settles the entity at
//! `NotAvailable`, is logged for diagnostics, and is never surfaced to the
//! caller of `request`.

mod error;
mod runner;
mod stages;

pub use crate::extract::SearchHit;
pub use error::{StageError, StageFailure};
pub use runner::run_pipeline;
pub use stages::{reviews_stage, search_stage, summary_stage, ReviewBatch, SummaryOutcome};
