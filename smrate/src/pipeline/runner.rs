//! Pipeline runner - drives the stages and commits their results.
//!
//! The runner is the only writer to its entity between creation and a
//! terminal state. Each successful stage commit advances the completion
//! state and publishes the entity on its update topic; any failure settles
//! the entity at `NotAvailable` and publishes that instead. Errors never
//! escape the runner.

use crate::config::EngineConfig;
use crate::engine::{RatingsBus, Topic};
use crate::fetch::PageFetcher;
use crate::pipeline::error::StageError;
use crate::pipeline::stages::{reviews_stage, search_stage, summary_stage};
use crate::professor::SharedProfessor;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runs the full pipeline for one entity to a terminal state.
///
/// Spawned once per created entity; the store's check-or-create guarantees
/// no second runner ever starts for the same key.
pub async fn run_pipeline<F: PageFetcher>(
    fetcher: Arc<F>,
    config: Arc<EngineConfig>,
    professor: SharedProfessor,
    bus: Arc<RatingsBus>,
) {
    let (key, display_name) = {
        let entity = professor.read().expect("entity lock poisoned");
        (entity.key().clone(), entity.display_name.clone())
    };
    let topic = Topic::Update(key.clone());

    match drive_stages(fetcher.as_ref(), &config, &professor, &bus, &topic, &display_name).await {
        Ok(()) => {
            info!(key = %key, "retrieval complete");
        }
        Err(err) => {
            warn!(key = %key, error = %err, "retrieval failed");
            let settled = {
                let mut entity = professor.write().expect("entity lock poisoned");
                entity.mark_unavailable()
            };
            if settled {
                bus.publish(&topic, &professor);
            }
        }
    }
}

/// Runs the three stages in sequence, committing and publishing after the
/// summary and review stages.
async fn drive_stages<F: PageFetcher>(
    fetcher: &F,
    config: &EngineConfig,
    professor: &SharedProfessor,
    bus: &RatingsBus,
    topic: &Topic,
    display_name: &str,
) -> Result<(), StageError> {
    let hit = search_stage(fetcher, config, display_name).await?;
    let outcome = summary_stage(fetcher, config, hit).await?;

    let site_id = outcome.hit.site_id.clone();
    let committed = {
        let mut entity = professor.write().expect("entity lock poisoned");
        entity.record_summary(
            outcome.summary,
            outcome.hit.site_id,
            outcome.hit.school_name,
        )
    };
    if !committed {
        debug!(site_id = %site_id, "summary commit refused; entity already settled");
        return Ok(());
    }
    bus.publish(topic, professor);

    let batch = reviews_stage(fetcher, config, &site_id).await?;

    let committed = {
        let mut entity = professor.write().expect("entity lock poisoned");
        entity.record_reviews(batch.reviews)
    };
    if committed {
        bus.publish(topic, professor);
    }

    Ok(())
}
