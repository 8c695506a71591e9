// Stale entries are never evicted; freshness is only checked on read.
// Concurrent misses for the same key each recompute and the last put wins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, Utc};

use crate::cache::key::CacheKey;
use crate::types::ranked::RankedLocation;

/// Default time-to-live for cached rankings: 10 minutes.
pub const DEFAULT_TTL_MS: i64 = 10 * 60 * 1000;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub results: Arc<Vec<RankedLocation>>,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now.signed_duration_since(self.stored_at) < ttl
    }
}

/// Storage for full sorted rankings, keyed by [`CacheKey`].
pub trait ScoresCache: Send + Sync {
    fn ttl(&self) -> TimeDelta;

    /// The stored rankings, if present and younger than [`ScoresCache::ttl`].
    fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<Arc<Vec<RankedLocation>>>;

    /// Unconditionally overwrite the entry for `key`.
    fn put(&self, key: CacheKey, results: Arc<Vec<RankedLocation>>, now: DateTime<Utc>);
}

#[derive(Debug)]
pub struct MemoryScoresCache {
    ttl: TimeDelta,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl MemoryScoresCache {
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryScoresCache {
    fn default() -> Self {
        Self::new(TimeDelta::milliseconds(DEFAULT_TTL_MS))
    }
}

impl ScoresCache for MemoryScoresCache {
    fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<Arc<Vec<RankedLocation>>> {
        // A poisoned map only ever held whole entries; treat it as a miss.
        let entries = self.entries.lock().ok()?;
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .map(|entry| Arc::clone(&entry.results))
    }

    fn put(&self, key: CacheKey, results: Arc<Vec<RankedLocation>>, now: DateTime<Utc>) {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.insert(
            key,
            CacheEntry {
                results,
                stored_at: now,
            },
        );
    }
}
