mod common;

use std::sync::Arc;

use chrono::TimeDelta;
use trueplace::cache::{CacheKey, MemoryScoresCache, ScoresCache, DEFAULT_TTL_MS};
use trueplace::dataset::{Dataset, DatasetSummary, MemoryStore};
use trueplace::ranking::{ProfileQuery, Ranker, SortDirection, SortField};
use trueplace::scoring::ScoringPolicy;

use common::{epoch, texas_utah, ManualClock};

struct Fixture {
    store: Arc<MemoryStore>,
    cache: Arc<MemoryScoresCache>,
    clock: Arc<ManualClock>,
    ranker: Ranker,
}

fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new(texas_utah()));
    let cache = Arc::new(MemoryScoresCache::default());
    let clock = ManualClock::new(epoch());
    let ranker = Ranker::new(store.clone(), cache.clone(), clock.clone(), ScoringPolicy::ThreeDimension);
    Fixture {
        store,
        cache,
        clock,
        ranker,
    }
}

fn key(query: &ProfileQuery) -> CacheKey {
    let fp = DatasetSummary::of(&texas_utah()).fingerprint().unwrap();
    CacheKey::for_query(&fp, query).unwrap()
}

#[test]
fn invariant_entry_valid_only_within_ttl() {
    let cache = MemoryScoresCache::new(TimeDelta::seconds(60));
    let k = key(&ProfileQuery::default());
    cache.put(k.clone(), Arc::new(Vec::new()), epoch());

    assert!(cache.get(&k, epoch()).is_some());
    assert!(cache.get(&k, epoch() + TimeDelta::seconds(59)).is_some());
    assert!(cache.get(&k, epoch() + TimeDelta::seconds(60)).is_none());
    assert!(cache.get(&k, epoch() + TimeDelta::hours(1)).is_none());
}

#[test]
fn stale_entries_are_kept_until_overwritten() {
    let cache = MemoryScoresCache::new(TimeDelta::seconds(1));
    let k = key(&ProfileQuery::default());

    cache.put(k.clone(), Arc::new(Vec::new()), epoch());
    assert!(cache.get(&k, epoch() + TimeDelta::seconds(5)).is_none());
    assert_eq!(cache.len(), 1);

    cache.put(k.clone(), Arc::new(Vec::new()), epoch() + TimeDelta::seconds(5));
    assert!(cache.get(&k, epoch() + TimeDelta::seconds(5)).is_some());
    assert_eq!(cache.len(), 1);
}

#[test]
fn default_ttl_is_ten_minutes() {
    assert_eq!(DEFAULT_TTL_MS, 600_000);
    assert_eq!(MemoryScoresCache::default().ttl(), TimeDelta::minutes(10));
}

#[test]
fn cache_key_is_fingerprint_plus_canonical_params() {
    let query = ProfileQuery {
        values_diversity: true,
        min_safety: Some(40.0),
        ..ProfileQuery::default()
    };
    let fp = DatasetSummary::of(&texas_utah()).fingerprint().unwrap();

    let k = CacheKey::for_query(&fp, &query).unwrap();
    assert_eq!(
        k.as_str(),
        format!("{fp}:{{\"valuesDiversity\":true,\"minSafety\":40.0,\"sortBy\":\"score\",\"sortDir\":\"desc\"}}")
    );
}

#[test]
fn pagination_and_nocache_share_a_key() {
    let base = ProfileQuery::default();
    let paged = ProfileQuery {
        limit: 1,
        offset: 1,
        nocache: true,
        ..ProfileQuery::default()
    };
    assert_eq!(key(&base), key(&paged));

    let sorted = ProfileQuery {
        sort_by: SortField::Safety,
        sort_dir: SortDirection::Asc,
        ..ProfileQuery::default()
    };
    assert_ne!(key(&base), key(&sorted));

    let biased = ProfileQuery {
        bias_types: vec!["anti-Asian".to_string()],
        ..ProfileQuery::default()
    };
    assert_ne!(key(&base), key(&biased));
}

#[test]
fn repeated_request_within_ttl_hits() {
    let f = fixture();
    let query = ProfileQuery::default();

    let first = f.ranker.rank(&query).unwrap();
    assert!(!first.cache.hit);
    assert_eq!(first.cache.ttl_ms, 600_000);

    f.clock.advance(TimeDelta::minutes(9));
    let second = f.ranker.rank(&query).unwrap();
    assert!(second.cache.hit);
    assert_eq!(second.cache.key, first.cache.key);
    assert_eq!(second.results, first.results);
    assert_eq!(second.total, first.total);
}

#[test]
fn request_after_ttl_misses() {
    let f = fixture();
    let query = ProfileQuery::default();

    f.ranker.rank(&query).unwrap();
    f.clock.advance(TimeDelta::minutes(10));

    assert!(!f.ranker.rank(&query).unwrap().cache.hit);
}

#[test]
fn nocache_always_recomputes_but_still_stores() {
    let f = fixture();
    let bypass = ProfileQuery {
        nocache: true,
        ..ProfileQuery::default()
    };

    assert!(!f.ranker.rank(&bypass).unwrap().cache.hit);
    assert!(!f.ranker.rank(&bypass).unwrap().cache.hit);
    assert_eq!(f.cache.len(), 1);

    // The stored entry serves a normal request.
    assert!(f.ranker.rank(&ProfileQuery::default()).unwrap().cache.hit);
}

#[test]
fn dataset_change_invalidates_cached_rankings() {
    let f = fixture();
    let query = ProfileQuery::default();

    let before = f.ranker.rank(&query).unwrap();
    f.store.replace(Dataset::seed()).unwrap();
    let after = f.ranker.rank(&query).unwrap();

    assert!(!after.cache.hit);
    assert_ne!(after.cache.key, before.cache.key);
    assert_eq!(after.total, 3);
    // The old fingerprint's entry is not evicted.
    assert_eq!(f.cache.len(), 2);
}

#[test]
fn other_pages_are_served_from_the_same_entry() {
    let f = fixture();

    let first_page = f
        .ranker
        .rank(&ProfileQuery {
            limit: 1,
            ..ProfileQuery::default()
        })
        .unwrap();
    let second_page = f
        .ranker
        .rank(&ProfileQuery {
            limit: 1,
            offset: 1,
            ..ProfileQuery::default()
        })
        .unwrap();

    assert!(!first_page.cache.hit);
    assert!(second_page.cache.hit);
    assert_ne!(first_page.results[0].id, second_page.results[0].id);
    assert_eq!(second_page.total, 2);
}
