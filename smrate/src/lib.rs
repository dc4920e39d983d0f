//! smrate - instructor ratings retrieval-and-cache engine.
//!
//! This library enriches instructor names with aggregate rating data fetched
//! from a third-party ratings site. Fetches are deduplicated per normalized
//! name, and interested observers are notified through a topic-keyed bus as
//! data becomes progressively available.
//!
//! # High-Level API
//!
//! ```ignore
//! use smrate::config::EngineConfig;
//! use smrate::engine::RatingsEngine;
//! use smrate::fetch::ReqwestFetcher;
//!
//! let fetcher = ReqwestFetcher::new()?;
//! let engine = RatingsEngine::new(EngineConfig::default(), fetcher);
//!
//! engine.subscribe_updates("Ada Lovelace", |entity| {
//!     let entity = entity.read().unwrap();
//!     println!("{}: {}", entity.display_name, entity.completion());
//! });
//!
//! // Results arrive via the subscription; request returns immediately.
//! engine.request("Ada Lovelace");
//! ```

pub mod bus;
pub mod config;
pub mod endpoints;
pub mod engine;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod pipeline;
pub mod professor;
pub mod stats;
pub mod store;

/// Version of the smrate library and CLI.
///
/// This is synchronized across all components in the workspace; the value is
/// defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
