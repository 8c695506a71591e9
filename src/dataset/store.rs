use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use crate::dataset::records::{CrimeStats, Dataset, Demographics, HateCrime, Location};
use crate::dataset::summary::DatasetSummary;
use crate::types::identifiers::LocationId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Dataset lock poisoned")]
    Poisoned,
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Child rows attached to one location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationStats {
    /// Sorted by bias type.
    pub hate_crimes: Vec<HateCrime>,
    pub crime_stats: Option<CrimeStats>,
    pub demographics: Option<Demographics>,
}

/// Read access to location records and their aggregates.
///
/// Every call is attempted once; failures surface to the caller unchanged.
pub trait LocationStore: Send + Sync {
    fn locations(&self) -> Result<Vec<Location>, StoreError>;

    fn location(&self, id: LocationId) -> Result<Option<Location>, StoreError>;

    /// Case-insensitive exact name lookup.
    fn find_by_name(&self, name: &str) -> Result<Option<Location>, StoreError>;

    fn location_stats(&self, id: LocationId) -> Result<LocationStats, StoreError>;

    /// Summed incidents per location across `bias_types`. Locations with no
    /// matching rows are absent.
    fn incidents_by_location(&self, bias_types: &[String]) -> Result<BTreeMap<LocationId, u64>, StoreError>;

    fn summary(&self) -> Result<DatasetSummary, StoreError>;
}

/// In-process store over a [`Dataset`] snapshot.
///
/// Readers take a cheap `Arc` clone of the current snapshot, so a
/// [`MemoryStore::replace`] never tears a request's view of the data.
#[derive(Debug)]
pub struct MemoryStore {
    dataset: RwLock<Arc<Dataset>>,
}

impl MemoryStore {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset: RwLock::new(Arc::new(dataset)),
        }
    }

    pub fn snapshot(&self) -> Result<Arc<Dataset>, StoreError> {
        let guard = self.dataset.read().map_err(|_| StoreError::Poisoned)?;
        Ok(Arc::clone(&guard))
    }

    pub fn replace(&self, dataset: Dataset) -> Result<(), StoreError> {
        let mut guard = self.dataset.write().map_err(|_| StoreError::Poisoned)?;
        *guard = Arc::new(dataset);
        Ok(())
    }
}

impl LocationStore for MemoryStore {
    fn locations(&self) -> Result<Vec<Location>, StoreError> {
        Ok(self.snapshot()?.locations().to_vec())
    }

    fn location(&self, id: LocationId) -> Result<Option<Location>, StoreError> {
        Ok(self.snapshot()?.location(id).cloned())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Location>, StoreError> {
        Ok(self.snapshot()?.find_by_name(name).cloned())
    }

    fn location_stats(&self, id: LocationId) -> Result<LocationStats, StoreError> {
        let dataset = self.snapshot()?;

        let mut hate_crimes: Vec<HateCrime> = dataset
            .hate_crimes()
            .iter()
            .filter(|r| r.location_id == id)
            .cloned()
            .collect();
        hate_crimes.sort_by(|a, b| a.bias_type.cmp(&b.bias_type));

        Ok(LocationStats {
            hate_crimes,
            crime_stats: dataset.crime_stats().iter().find(|r| r.location_id == id).cloned(),
            demographics: dataset.demographics().iter().find(|r| r.location_id == id).cloned(),
        })
    }

    fn incidents_by_location(&self, bias_types: &[String]) -> Result<BTreeMap<LocationId, u64>, StoreError> {
        Ok(self.snapshot()?.incidents_by_location(bias_types))
    }

    fn summary(&self) -> Result<DatasetSummary, StoreError> {
        let dataset = self.snapshot()?;
        Ok(DatasetSummary::of(&dataset))
    }
}
