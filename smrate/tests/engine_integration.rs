//! Integration tests for the retrieval engine.
//!
//! These tests drive the full engine - store, pipeline, bus, stats - over a
//! scripted fetcher and verify the engine's observable guarantees:
//! - request deduplication (at most one pipeline per key)
//! - monotonic completion transitions
//! - all-or-nothing review ingestion
//! - tag aggregation and derived statistics
//! - blacklist short-circuit without network activity

use serde_json::{json, Value};
use smrate::config::EngineConfig;
use smrate::endpoints;
use smrate::engine::RatingsEngine;
use smrate::fetch::{FetchError, PageFetcher};
use smrate::professor::{Completion, ProfessorKey, SiteId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

// =============================================================================
// Test Helpers
// =============================================================================

const BASE_URL: &str = "http://ratings.test";
const SCHOOL_FACET: &str = "tech+university";
const SITE_ID: &str = "123456";

/// Scripted fetcher routed by URL.
///
/// Requests optionally wait on a release gate, so tests can hold a pipeline
/// "in flight" while issuing further requests. Every request is counted.
struct ScriptedFetcher {
    documents: HashMap<String, Result<String, FetchError>>,
    json: HashMap<String, Result<Value, FetchError>>,
    requests: AtomicUsize,
    release: watch::Receiver<bool>,
}

impl ScriptedFetcher {
    /// Creates an ungated fetcher and its (already released) gate sender.
    fn new() -> (Self, watch::Sender<bool>) {
        Self::gated(true)
    }

    /// Creates a fetcher whose requests wait until the gate opens.
    fn gated(open: bool) -> (Self, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(open);
        (
            Self {
                documents: HashMap::new(),
                json: HashMap::new(),
                requests: AtomicUsize::new(0),
                release: rx,
            },
            tx,
        )
    }

    fn route_document(mut self, url: String, body: Result<String, FetchError>) -> Self {
        self.documents.insert(url, body);
        self
    }

    fn route_json(mut self, url: String, body: Result<Value, FetchError>) -> Self {
        self.json.insert(url, body);
        self
    }

    fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    async fn wait_released(&self) {
        let mut rx = self.release.clone();
        while !*rx.borrow_and_update() {
            rx.changed().await.expect("gate sender dropped");
        }
    }
}

impl PageFetcher for ScriptedFetcher {
    async fn fetch_document(&self, url: &str) -> Result<String, FetchError> {
        self.wait_released().await;
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.documents
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Http(format!("unrouted URL {}", url))))
    }

    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        self.wait_released().await;
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.json
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Http(format!("unrouted URL {}", url))))
    }
}

fn test_config() -> EngineConfig {
    EngineConfig::default()
        .with_base_url(BASE_URL)
        .with_school_facet(SCHOOL_FACET)
}

fn search_page() -> String {
    format!(
        r#"<div id="searchResultsBox">
             <span class="sub">Tech University</span>
             <li class="listing PROFESSOR">
               <a href="/ShowRatings.jsp?tid={}">Ada Lovelace</a>
             </li>
           </div>"#,
        SITE_ID
    )
}

fn overview_page() -> String {
    let sliders: String = ["4.2", "3.9", "2.8", "4.0", "55", "3.1"]
        .iter()
        .map(|v| format!(r#"<div class="rating-slider"><div class="rating">{}</div></div>"#, v))
        .collect();
    format!(r#"<div class="left-breakdown">{}</div>"#, sliders)
}

fn review(helpful: f64, tags: &[&str]) -> Value {
    json!({
        "rHelpful": helpful,
        "rClarity": 3.0,
        "rEasy": 2.0,
        "rDate": "01/02/2015",
        "rClass": "CSCI-141",
        "rComments": "Great lectures.",
        "teacherRatingTags": tags,
    })
}

fn review_page(remaining: u32, reviews: Vec<Value>) -> Value {
    json!({ "remaining": remaining, "ratings": reviews })
}

fn search_url(name: &str) -> String {
    endpoints::search_url(BASE_URL, name, SCHOOL_FACET)
}

fn ratings_url() -> String {
    endpoints::ratings_url(BASE_URL, &SiteId::new(SITE_ID))
}

fn page_url(page: u32) -> String {
    endpoints::review_page_url(BASE_URL, &SiteId::new(SITE_ID), page)
}

/// Routes a complete happy path for "Ada Lovelace": search, overview, and a
/// single review page with three reviews.
fn happy_path_fetcher(gate_open: bool) -> (ScriptedFetcher, watch::Sender<bool>) {
    let (fetcher, gate) = ScriptedFetcher::gated(gate_open);
    let fetcher = fetcher
        .route_document(search_url("Ada Lovelace"), Ok(search_page()))
        .route_document(ratings_url(), Ok(overview_page()))
        .route_json(
            page_url(1),
            Ok(review_page(
                0,
                vec![
                    review(3.0, &["A", "B"]),
                    review(4.0, &["A"]),
                    review(5.0, &["B", "B"]),
                ],
            )),
        );
    (fetcher, gate)
}

/// Subscribes to an instructor's updates, forwarding each published
/// completion state into a channel.
fn watch_completions<F: PageFetcher + 'static>(
    engine: &RatingsEngine<F>,
    name: &str,
) -> mpsc::UnboundedReceiver<Completion> {
    let (tx, rx) = mpsc::unbounded_channel();
    engine.subscribe_updates(name, move |entity| {
        let completion = entity.read().unwrap().completion();
        let _ = tx.send(completion);
    });
    rx
}

async fn next_completion(rx: &mut mpsc::UnboundedReceiver<Completion>) -> Completion {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for a publish")
        .expect("bus subscription dropped")
}

// =============================================================================
// Integration Tests
// =============================================================================

#[tokio::test]
async fn test_happy_path_publishes_summary_then_reviews() {
    let (fetcher, _gate) = happy_path_fetcher(true);
    let engine = RatingsEngine::new(test_config(), fetcher);
    let mut completions = watch_completions(&engine, "Ada Lovelace");

    engine.request("Ada Lovelace");

    assert_eq!(next_completion(&mut completions).await, Completion::Summary);
    assert_eq!(next_completion(&mut completions).await, Completion::Reviews);

    let entity = engine.entity(&ProfessorKey::new("Ada Lovelace")).unwrap();
    let entity = entity.read().unwrap();
    assert_eq!(entity.display_name, "Ada Lovelace");
    assert_eq!(entity.school_name.as_deref(), Some("Tech University"));
    assert_eq!(entity.site_id.as_ref().unwrap().as_str(), SITE_ID);

    let summary = entity.rating_summary.unwrap();
    assert_eq!(summary.helpfulness, 4.2);
    assert_eq!(summary.clarity, 3.9);
    assert_eq!(summary.easiness, 2.8);

    assert_eq!(entity.reviews.len(), 3);
    // Tags [A, B], [A], [B, B] → A: 2, B: 3
    assert_eq!(entity.tag_counts.count("A"), 2);
    assert_eq!(entity.tag_counts.count("B"), 3);
}

#[tokio::test]
async fn test_statistics_of_settled_entity() {
    let (fetcher, _gate) = happy_path_fetcher(true);
    let engine = RatingsEngine::new(test_config(), fetcher);
    let mut completions = watch_completions(&engine, "Ada Lovelace");

    engine.request("Ada Lovelace");
    while next_completion(&mut completions).await != Completion::Reviews {}

    let entity = engine.entity(&ProfessorKey::new("Ada Lovelace")).unwrap();
    let stats = engine.stats_for(&entity.read().unwrap()).unwrap();

    // helpfulness [3, 4, 5]: average 4.0, population SD ≈ 0.8165 → 0.8
    assert_eq!(stats.table.helpfulness.score, 4.0);
    assert_eq!(stats.table.helpfulness.sd, 0.8);
    assert_eq!(stats.table.total_reviews, 3);

    // Ranked tags: B (3) before A (2)
    let ranked: Vec<(&str, u32)> = stats
        .ranked_tags
        .iter()
        .map(|t| (t.name.as_str(), t.count))
        .collect();
    assert_eq!(ranked, vec![("B", 3), ("A", 2)]);

    // Memoized: the same table comes back for repeated queries
    let again = engine.stats_for(&entity.read().unwrap()).unwrap();
    assert!(Arc::ptr_eq(&stats, &again));
}

#[tokio::test]
async fn test_concurrent_requests_run_exactly_one_pipeline() {
    let (fetcher, gate) = happy_path_fetcher(false);
    let engine = Arc::new(RatingsEngine::new(test_config(), fetcher));
    let mut completions = watch_completions(&engine, "Ada Lovelace");

    // First request starts the pipeline; it blocks on the gate.
    engine.request("Ada Lovelace");

    // Re-requests while in flight observe the cached in-progress entity.
    engine.request("Ada Lovelace");
    engine.request("ADA LOVELACE");

    assert_eq!(
        next_completion(&mut completions).await,
        Completion::Retrieving
    );
    assert_eq!(
        next_completion(&mut completions).await,
        Completion::Retrieving
    );

    // Release the pipeline and let it settle.
    gate.send(true).unwrap();
    assert_eq!(next_completion(&mut completions).await, Completion::Summary);
    assert_eq!(next_completion(&mut completions).await, Completion::Reviews);

    // One search, one overview, one probe, one page: a second pipeline
    // would have at least doubled this.
    let entity = engine.entity(&ProfessorKey::new("Ada Lovelace")).unwrap();
    assert_eq!(entity.read().unwrap().reviews.len(), 3);

    // A request after settling re-publishes the terminal state, still with
    // no further network activity.
    engine.request("Ada Lovelace");
    assert_eq!(next_completion(&mut completions).await, Completion::Reviews);
}

#[tokio::test]
async fn test_request_counts_prove_single_pipeline() {
    let (fetcher, gate) = happy_path_fetcher(false);
    let request_count = {
        // Count through a shared handle before the engine takes ownership
        struct Counting<F>(Arc<F>);
        impl<F: PageFetcher> PageFetcher for Counting<F> {
            async fn fetch_document(&self, url: &str) -> Result<String, FetchError> {
                self.0.fetch_document(url).await
            }
            async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
                self.0.fetch_json(url).await
            }
        }

        let fetcher = Arc::new(fetcher);
        let counted = Counting(Arc::clone(&fetcher));
        let engine = Arc::new(RatingsEngine::new(test_config(), counted));
        let mut completions = watch_completions(&engine, "Ada Lovelace");

        for _ in 0..8 {
            engine.request("Ada Lovelace");
        }
        gate.send(true).unwrap();

        loop {
            let completion = next_completion(&mut completions).await;
            if completion == Completion::Reviews {
                break;
            }
            assert_ne!(completion, Completion::NotAvailable);
        }

        fetcher.request_count()
    };

    // search + overview + probe + one fan-out page
    assert_eq!(request_count, 4);
}

#[tokio::test]
async fn test_failed_page_aborts_review_ingestion() {
    // remaining = 25 → 4 pages; page 3 fails
    let (fetcher, _gate) = ScriptedFetcher::new();
    let fetcher = fetcher
        .route_document(search_url("Ada Lovelace"), Ok(search_page()))
        .route_document(ratings_url(), Ok(overview_page()))
        .route_json(page_url(1), Ok(review_page(25, vec![review(1.0, &[])])))
        .route_json(page_url(2), Ok(review_page(13, vec![review(2.0, &[])])))
        .route_json(page_url(3), Err(FetchError::Http("HTTP 502".to_string())))
        .route_json(page_url(4), Ok(review_page(0, vec![review(4.0, &[])])));

    let engine = RatingsEngine::new(test_config(), fetcher);
    let mut completions = watch_completions(&engine, "Ada Lovelace");

    engine.request("Ada Lovelace");

    assert_eq!(next_completion(&mut completions).await, Completion::Summary);
    assert_eq!(
        next_completion(&mut completions).await,
        Completion::NotAvailable
    );

    // No partial ingestion: faster pages were buffered, never committed
    let entity = engine.entity(&ProfessorKey::new("Ada Lovelace")).unwrap();
    let entity = entity.read().unwrap();
    assert_eq!(entity.completion(), Completion::NotAvailable);
    assert!(entity.reviews.is_empty());
    assert_eq!(entity.tag_counts.len(), 0);
}

#[tokio::test]
async fn test_search_miss_settles_not_available() {
    let (fetcher, _gate) = ScriptedFetcher::new();
    let fetcher = fetcher.route_document(
        search_url("Nobody Real"),
        Ok(r#"<div id="searchResultsBox"><p>No results.</p></div>"#.to_string()),
    );

    let engine = RatingsEngine::new(test_config(), fetcher);
    let mut completions = watch_completions(&engine, "Nobody Real");

    engine.request("Nobody Real");
    assert_eq!(
        next_completion(&mut completions).await,
        Completion::NotAvailable
    );
}

#[tokio::test]
async fn test_blacklisted_name_never_touches_network() {
    let (fetcher, _gate) = ScriptedFetcher::new();
    let fetcher = Arc::new(fetcher);

    struct Forwarding<F>(Arc<F>);
    impl<F: PageFetcher> PageFetcher for Forwarding<F> {
        async fn fetch_document(&self, url: &str) -> Result<String, FetchError> {
            self.0.fetch_document(url).await
        }
        async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
            self.0.fetch_json(url).await
        }
    }

    let engine = RatingsEngine::new(test_config(), Forwarding(Arc::clone(&fetcher)));
    let mut completions = watch_completions(&engine, "To Be Determined");

    engine.request("To Be Determined");
    assert_eq!(
        next_completion(&mut completions).await,
        Completion::NotAvailable
    );
    assert_eq!(fetcher.request_count(), 0);
}

#[tokio::test]
async fn test_publishes_never_regress() {
    let (fetcher, _gate) = happy_path_fetcher(true);
    let engine = RatingsEngine::new(test_config(), fetcher);

    let observed = Arc::new(Mutex::new(Vec::new()));
    let observed_clone = Arc::clone(&observed);
    let (tx, mut rx) = mpsc::unbounded_channel();
    engine.subscribe_updates("Ada Lovelace", move |entity| {
        let completion = entity.read().unwrap().completion();
        observed_clone.lock().unwrap().push(completion);
        if completion.is_terminal() {
            let _ = tx.send(());
        }
    });

    engine.request("Ada Lovelace");
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("pipeline never settled")
        .expect("bus subscription dropped");

    let states = observed.lock().unwrap().clone();
    for pair in states.windows(2) {
        assert!(
            pair[0] <= pair[1],
            "completion regressed: {:?} → {:?}",
            pair[0],
            pair[1]
        );
    }
    assert_eq!(states.last(), Some(&Completion::Reviews));
}

#[tokio::test]
async fn test_unsubscribed_handler_receives_nothing() {
    let (fetcher, _gate) = happy_path_fetcher(true);
    let engine = RatingsEngine::new(test_config(), fetcher);

    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = Arc::clone(&count);
    let token = engine.subscribe_updates("Ada Lovelace", move |_| {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });
    assert!(engine.unsubscribe(&token));

    let mut completions = watch_completions(&engine, "Ada Lovelace");
    engine.request("Ada Lovelace");
    while next_completion(&mut completions).await != Completion::Reviews {}

    assert_eq!(count.load(Ordering::SeqCst), 0);
}
