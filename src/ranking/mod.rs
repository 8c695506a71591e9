pub mod pagination;
pub mod query;

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::cache::{CacheKey, Clock, ScoresCache};
use crate::dataset::{Location, LocationStore, StoreError};
use crate::scoring::{Profile, ScoringPolicy};
use crate::types::identifiers::LocationId;
use crate::types::ranked::{CacheStatus, PageInfo, RankedLocation, RankedPage};

pub use pagination::paginate;
pub use query::{ProfileQuery, SortDirection, SortField, ValidationError, DEFAULT_LIMIT, MAX_LIMIT};

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Score every location under `policy`, preserving input order.
pub fn score_all(locations: &[Location], profile: Profile, policy: ScoringPolicy) -> Vec<RankedLocation> {
    locations
        .iter()
        .map(|location| RankedLocation {
            id: location.id,
            name: location.name.clone(),
            state: location.state.clone(),
            result: policy.score(location, profile),
        })
        .collect()
}

/// Apply the sub-score thresholds and, when given, the bias-incident join,
/// then sort by `(field, direction)` with ascending id as the tie-break.
pub fn filter_and_sort(
    scored: Vec<RankedLocation>,
    query: &ProfileQuery,
    bias_incidents: Option<&BTreeMap<LocationId, u64>>,
) -> Vec<RankedLocation> {
    let mut results: Vec<RankedLocation> = scored
        .into_iter()
        .filter(|r| meets(query.min_safety, r.result.sub_scores.safety))
        .filter(|r| meets(query.min_community, r.result.sub_scores.community))
        .filter(|r| match bias_incidents {
            Some(incidents) => incidents.get(&r.id).is_some_and(|n| *n > 0),
            None => true,
        })
        .collect();

    results.sort_by(|a, b| compare(a, b, query.sort_by, query.sort_dir));

    debug_assert!(results
        .windows(2)
        .all(|w| compare(&w[0], &w[1], query.sort_by, query.sort_dir) != Ordering::Greater));

    results
}

fn meets(min: Option<f64>, value: u8) -> bool {
    min.map_or(true, |m| f64::from(value) >= m)
}

fn sort_value(r: &RankedLocation, field: SortField) -> u8 {
    match field {
        SortField::Score => r.result.score,
        SortField::Safety => r.result.sub_scores.safety,
        SortField::Community => r.result.sub_scores.community,
    }
}

fn compare(a: &RankedLocation, b: &RankedLocation, field: SortField, dir: SortDirection) -> Ordering {
    let (av, bv) = (sort_value(a, field), sort_value(b, field));
    let primary = match dir {
        SortDirection::Asc => av.cmp(&bv),
        SortDirection::Desc => bv.cmp(&av),
    };
    // Ascending id regardless of direction.
    primary.then_with(|| a.id.cmp(&b.id))
}

/// Fingerprint-keyed, cached ranking over a [`LocationStore`].
pub struct Ranker {
    store: Arc<dyn LocationStore>,
    cache: Arc<dyn ScoresCache>,
    clock: Arc<dyn Clock>,
    policy: ScoringPolicy,
}

impl Ranker {
    pub fn new(
        store: Arc<dyn LocationStore>,
        cache: Arc<dyn ScoresCache>,
        clock: Arc<dyn Clock>,
        policy: ScoringPolicy,
    ) -> Self {
        Self {
            store,
            cache,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> ScoringPolicy {
        self.policy
    }

    pub fn rank(&self, query: &ProfileQuery) -> Result<RankedPage, RankingError> {
        // 1. Key on the current dataset state
        let fingerprint = self.store.summary()?.fingerprint()?;
        let key = CacheKey::for_query(&fingerprint, query)?;
        let ttl_ms = self.cache.ttl().num_milliseconds();

        // 2. Serve from cache unless bypassed
        if !query.nocache {
            if let Some(results) = self.cache.get(&key, self.clock.now()) {
                debug!(key = %key, total = results.len(), "scores cache hit");
                return Ok(page(&results, query, key, true, ttl_ms));
            }
        }

        // 3. Score, filter, sort
        let locations = self.store.locations()?;
        let scored = score_all(&locations, query.profile(), self.policy);

        let incidents = if query.bias_types.is_empty() {
            None
        } else {
            Some(self.store.incidents_by_location(&query.bias_types)?)
        };

        let results = Arc::new(filter_and_sort(scored, query, incidents.as_ref()));
        debug!(
            key = %key,
            considered = locations.len(),
            total = results.len(),
            nocache = query.nocache,
            "scores cache miss"
        );

        // 4. Store the full sorted list, then paginate
        self.cache.put(key.clone(), Arc::clone(&results), self.clock.now());

        Ok(page(&results, query, key, false, ttl_ms))
    }
}

fn page(results: &[RankedLocation], query: &ProfileQuery, key: CacheKey, hit: bool, ttl_ms: i64) -> RankedPage {
    RankedPage {
        results: paginate(results, query.limit, query.offset),
        total: results.len(),
        page: PageInfo {
            limit: query.limit,
            offset: query.offset,
        },
        cache: CacheStatus {
            hit,
            key: key.as_str().to_string(),
            ttl_ms,
        },
    }
}
