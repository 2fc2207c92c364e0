use fest_scoring::error::AppError;
use fest_scoring::scoring::{FestivalSeed, InMemoryFestivalStore, ScoringService, TrophyAwards};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) type FestivalService =
    ScoringService<InMemoryFestivalStore, InMemoryFestivalStore, InMemoryFestivalStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Seeded store, or an empty one when no roster is configured.
pub(crate) fn load_store(
    seed_path: Option<&Path>,
) -> Result<Arc<InMemoryFestivalStore>, AppError> {
    let Some(path) = seed_path else {
        warn!("no festival seed configured; starting with an empty roster");
        return Ok(Arc::new(InMemoryFestivalStore::default()));
    };

    let seed = FestivalSeed::from_path(path)?;
    info!(
        path = %path.display(),
        events = seed.events.len(),
        teams = seed.teams.len(),
        "festival seed loaded"
    );
    store_from_seed(seed)
}

pub(crate) fn store_from_seed(seed: FestivalSeed) -> Result<Arc<InMemoryFestivalStore>, AppError> {
    Ok(Arc::new(InMemoryFestivalStore::from_seed(seed)?))
}

pub(crate) fn build_service(
    store: Arc<InMemoryFestivalStore>,
    awards: TrophyAwards,
) -> Arc<FestivalService> {
    Arc::new(ScoringService::new(
        store.clone(),
        store.clone(),
        store,
        awards,
    ))
}
