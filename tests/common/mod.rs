#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use trueplace::cache::Clock;
use trueplace::dataset::{
    CrimeStats, Dataset, DatasetSummary, Demographics, HateCrime, Location, LocationStats, LocationStore, StoreError,
};
use trueplace::types::LocationId;

pub fn location(id: i64, name: &str, state: &str, hate: f64, diversity: f64, crime: f64) -> Location {
    Location {
        id: LocationId::new(id),
        name: name.to_string(),
        state: state.to_string(),
        hate_crime_index: Some(hate),
        diversity_index: Some(diversity),
        crime_rate: Some(crime),
        policy_score: None,
    }
}

pub fn hate_crime(id: i64, bias_type: &str, incidents: u64) -> HateCrime {
    HateCrime {
        location_id: LocationId::new(id),
        bias_type: bias_type.to_string(),
        incidents,
        updated_at: None,
    }
}

pub fn crime_stats(id: i64, violent_rate: f64, property_rate: f64) -> CrimeStats {
    CrimeStats {
        location_id: LocationId::new(id),
        violent_rate,
        property_rate,
        updated_at: None,
    }
}

pub fn demographics(id: i64, diversity: f64) -> Demographics {
    Demographics {
        location_id: LocationId::new(id),
        diversity,
        updated_at: None,
    }
}

/// Two states with bias data on Texas only, mirroring a small import.
pub fn texas_utah() -> Dataset {
    Dataset::new(
        vec![
            location(1, "Texas", "TX", 0.3, 0.5, 0.4),
            location(2, "Utah", "UT", 0.2, 0.3, 0.3),
        ],
        vec![hate_crime(1, "anti-Asian", 5), hate_crime(1, "anti-Black", 0)],
        vec![crime_stats(1, 0.2, 0.4)],
        vec![demographics(1, 0.6)],
    )
    .unwrap()
}

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self { now: Mutex::new(start) })
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Store whose backend is always down.
pub struct FailingStore;

impl LocationStore for FailingStore {
    fn locations(&self) -> Result<Vec<Location>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    fn location(&self, _id: LocationId) -> Result<Option<Location>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    fn find_by_name(&self, _name: &str) -> Result<Option<Location>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    fn location_stats(&self, _id: LocationId) -> Result<LocationStats, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    fn incidents_by_location(&self, _bias_types: &[String]) -> Result<BTreeMap<LocationId, u64>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    fn summary(&self) -> Result<DatasetSummary, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}
