use std::sync::Arc;

use chrono::TimeDelta;
use tracing::info;

use crate::api::config::Config;
use crate::cache::{Clock, MemoryScoresCache, ScoresCache, SystemClock};
use crate::dataset::{Dataset, LocationStore, MemoryStore, StoreError};
use crate::ranking::Ranker;

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn LocationStore>,
    pub clock: Arc<dyn Clock>,
    pub ranker: Ranker,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn LocationStore>,
        cache: Arc<dyn ScoresCache>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        let ranker = Ranker::new(
            Arc::clone(&store),
            cache,
            Arc::clone(&clock),
            config.scoring_policy,
        );

        Arc::new(Self {
            config,
            store,
            clock,
            ranker,
        })
    }

    /// Production wiring: dataset file (or seed), in-memory cache, wall clock.
    pub fn from_config(config: Config) -> Result<Arc<Self>, StoreError> {
        let dataset = match &config.dataset_path {
            Some(path) => {
                info!("Loading dataset from {}", path.display());
                Dataset::from_path(path)?
            }
            None => {
                info!("No dataset configured, using built-in seed");
                Dataset::seed()
            }
        };
        info!(
            "Dataset loaded: {} locations, scoring policy {}",
            dataset.locations().len(),
            config.scoring_policy
        );

        let cache = MemoryScoresCache::new(TimeDelta::milliseconds(config.cache_ttl_ms));

        Ok(Self::new(
            config,
            Arc::new(MemoryStore::new(dataset)),
            Arc::new(cache),
            Arc::new(SystemClock),
        ))
    }
}
