//! smrate CLI - looks up instructor ratings from the terminal.
//!
//! Requests every name given on the command line through the engine,
//! subscribes to the notification bus, and prints a report block per
//! instructor once their entity settles.

mod error;
mod report;

use clap::Parser;
use error::CliError;
use smrate::config::EngineConfig;
use smrate::engine::RatingsEngine;
use smrate::fetch::ReqwestFetcher;
use smrate::logging;
use smrate::professor::{Completion, ProfessorKey};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

#[derive(Parser)]
#[command(name = "smrate")]
#[command(about = "Fetch instructor ratings, deduplicated and cached", long_about = None)]
#[command(version = smrate::VERSION)]
struct Args {
    /// Instructor full names to look up
    #[arg(required = true)]
    names: Vec<String>,

    /// School facet for search queries, in the site's +-separated form
    #[arg(long)]
    school: Option<String>,

    /// Ratings site base URL (mirrors, test servers)
    #[arg(long)]
    base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Number of top tags to print per instructor
    #[arg(long, default_value = "5")]
    top_tags: usize,

    /// Also print the full review listing for each rated instructor
    #[arg(long)]
    reviews: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _guard = match logging::init_logging(logging::default_log_dir(), logging::default_log_file())
    {
        Ok(guard) => guard,
        Err(e) => CliError::LoggingInit(e).exit(),
    };

    let mut config =
        EngineConfig::default().with_request_timeout(Duration::from_secs(args.timeout));
    if let Some(school) = &args.school {
        config = config.with_school_facet(school);
    }
    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url);
    }

    let fetcher = match ReqwestFetcher::with_timeout(config.request_timeout) {
        Ok(fetcher) => fetcher,
        Err(e) => CliError::Fetcher(e).exit(),
    };

    let engine = RatingsEngine::new(config, fetcher);

    // The review popup of the engine's bus contract: the inspect topic
    // carries "selected for detailed view" events.
    if args.reviews {
        engine.subscribe_inspect(|entity| {
            let entity = entity.read().expect("entity lock poisoned");
            print!("{}", report::render_reviews(&entity));
        });
    }

    // Duplicate argument names share a normalized key and therefore a single
    // fetch; request each key once and await one terminal publish per key.
    let mut seen = HashSet::new();
    let unique: Vec<&String> = args
        .names
        .iter()
        .filter(|name| seen.insert(ProfessorKey::new(name)))
        .collect();
    debug!(requested = args.names.len(), unique = unique.len(), "requesting instructors");

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    for name in &unique {
        let tx = tx.clone();
        engine.subscribe_updates(name, move |entity| {
            let completion = entity.read().expect("entity lock poisoned").completion();
            if completion.is_terminal() {
                let _ = tx.send(());
            }
        });
    }
    drop(tx);

    for name in &unique {
        engine.request(name);
    }

    for _ in 0..unique.len() {
        if rx.recv().await.is_none() {
            break;
        }
    }

    for name in &unique {
        let key = ProfessorKey::new(name);
        let Some(entity) = engine.entity(&key) else {
            continue;
        };

        {
            let entity = entity.read().expect("entity lock poisoned");
            let stats = engine.stats_for(&entity).ok();
            print!("{}", report::render_entity(&entity, stats.as_deref(), args.top_tags));
        }

        let settled_with_reviews = entity
            .read()
            .expect("entity lock poisoned")
            .completion()
            == Completion::Reviews;
        if args.reviews && settled_with_reviews {
            engine.select_for_view(&key);
        }
        println!();
    }
}
