//! Engine facade: the entry point collaborators program against.
//!
//! The engine owns the entity store, the notification bus, the statistics
//! cache, and the injected fetch capability, and wires them together:
//!
//! - [`RatingsEngine::request`] is the side-effecting lookup contract;
//!   results arrive via bus notifications, never as return values.
//! - Presentation collaborators subscribe to per-entity update topics and to
//!   the fixed inspect topic, and read settled entities through the
//!   engine's accessors.

use crate::bus::{NotificationBus, SubscriptionToken};
use crate::config::EngineConfig;
use crate::fetch::PageFetcher;
use crate::pipeline::run_pipeline;
use crate::professor::{
    is_placeholder_name, Professor, ProfessorKey, SharedProfessor,
};
use crate::stats::{ProfessorStats, StatsCache, StatsError};
use crate::store::{ProfessorStore, StoreOutcome};
use std::sync::Arc;
use tracing::{debug, info};

/// Notification topics.
///
/// Entity state changes go out on the per-key `Update` family; the single
/// fixed `Inspect` topic carries "entity selected for detailed view" events
/// for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// State change of the entity with this key.
    Update(ProfessorKey),
    /// An already-presented entity was selected for detailed view.
    Inspect,
}

/// The engine's bus: topics route shared entity handles.
pub type RatingsBus = NotificationBus<Topic, SharedProfessor>;

/// The retrieval-and-cache engine.
///
/// Explicitly constructed and injected into callers; one instance lives for
/// the lifetime of the application. Cheap to share behind an `Arc`.
pub struct RatingsEngine<F> {
    config: Arc<EngineConfig>,
    fetcher: Arc<F>,
    store: ProfessorStore,
    bus: Arc<RatingsBus>,
    stats: StatsCache,
}

impl<F: PageFetcher + 'static> RatingsEngine<F> {
    /// Creates an engine over the given configuration and fetch capability.
    pub fn new(config: EngineConfig, fetcher: F) -> Self {
        Self {
            config: Arc::new(config),
            fetcher: Arc::new(fetcher),
            store: ProfessorStore::new(),
            bus: Arc::new(RatingsBus::new()),
            stats: StatsCache::new(),
        }
    }

    /// Requests rating data for an instructor name.
    ///
    /// Side-effecting: results arrive on the entity's update topic. If an
    /// entity already exists for the normalized name, its current state is
    /// re-published immediately and no network activity occurs - at most one
    /// pipeline ever runs per key. Placeholder names ("To Be Determined",
    /// "TBD") synthesize a `NotAvailable` entity without any network call.
    ///
    /// Must be called from within a tokio runtime; the pipeline for a new
    /// entity is spawned as a background task.
    pub fn request(&self, full_name: &str) {
        let key = ProfessorKey::new(full_name);
        let topic = Topic::Update(key.clone());

        if is_placeholder_name(full_name) {
            let outcome = self
                .store
                .get_or_insert_with(key.clone(), || Professor::unavailable(full_name));
            debug!(key = %key, "placeholder name; publishing not-available");
            self.bus.publish(&topic, outcome.entity());
            return;
        }

        match self
            .store
            .get_or_insert_with(key.clone(), || Professor::new(full_name))
        {
            StoreOutcome::Existing(entity) => {
                debug!(key = %key, "cache hit; re-publishing current state");
                self.bus.publish(&topic, &entity);
            }
            StoreOutcome::Created(entity) => {
                info!(key = %key, "starting retrieval");
                tokio::spawn(run_pipeline(
                    Arc::clone(&self.fetcher),
                    Arc::clone(&self.config),
                    entity,
                    Arc::clone(&self.bus),
                ));
            }
        }
    }

    /// Publishes an entity on the fixed inspect topic.
    ///
    /// Returns false if no entity exists for the key.
    pub fn select_for_view(&self, key: &ProfessorKey) -> bool {
        match self.store.get(key) {
            Some(entity) => {
                self.bus.publish(&Topic::Inspect, &entity);
                true
            }
            None => false,
        }
    }

    /// Registers a handler for state changes of one instructor's entity.
    pub fn subscribe_updates<H>(&self, full_name: &str, handler: H) -> SubscriptionToken<Topic>
    where
        H: Fn(&SharedProfessor) + Send + Sync + 'static,
    {
        self.bus
            .subscribe(Topic::Update(ProfessorKey::new(full_name)), handler)
    }

    /// Registers a handler for "selected for detailed view" events.
    pub fn subscribe_inspect<H>(&self, handler: H) -> SubscriptionToken<Topic>
    where
        H: Fn(&SharedProfessor) + Send + Sync + 'static,
    {
        self.bus.subscribe(Topic::Inspect, handler)
    }

    /// Removes a registration made through either subscribe method.
    pub fn unsubscribe(&self, token: &SubscriptionToken<Topic>) -> bool {
        self.bus.unsubscribe(token)
    }

    /// Returns the entity for a key, if one exists.
    pub fn entity(&self, key: &ProfessorKey) -> Option<SharedProfessor> {
        self.store.get(key)
    }

    /// Memoized derived statistics for a settled entity.
    ///
    /// # Errors
    ///
    /// [`StatsError::NoReviews`] when called before the entity reached
    /// `Reviews` completion.
    pub fn stats_for(&self, professor: &Professor) -> Result<Arc<ProfessorStats>, StatsError> {
        self.stats.stats_for(professor)
    }

    /// The underlying bus, for collaborators that need raw topic access.
    pub fn bus(&self) -> &Arc<RatingsBus> {
        &self.bus
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
