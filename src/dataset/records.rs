use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::identifiers::LocationId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("Duplicate location ID: {0}")]
    DuplicateLocationId(LocationId),
    #[error("{collection} row references unknown location {id}")]
    UnknownLocation { collection: &'static str, id: LocationId },
    #[error("Location {id} has more than one {collection} row")]
    DuplicateRow { collection: &'static str, id: LocationId },
    #[error("Location {id} has more than one hate crime row for bias type {bias_type}")]
    DuplicateBiasType { id: LocationId, bias_type: String },
    #[error("Total hate crime incidents overflow u64")]
    IncidentOverflow,
}

/// A scored place. Indices are normalized to `[0, 1]` by the import process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub state: String,
    pub hate_crime_index: Option<f64>,
    pub diversity_index: Option<f64>,
    pub crime_rate: Option<f64>,
    pub policy_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HateCrime {
    pub location_id: LocationId,
    pub bias_type: String,
    pub incidents: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeStats {
    pub location_id: LocationId,
    pub violent_rate: f64,
    pub property_rate: f64,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    pub location_id: LocationId,
    pub diversity: f64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Everything known about the locations served by this process.
///
/// Only constructible through [`Dataset::new`] (or deserialization, which
/// goes through it), so relational invariants always hold:
/// - location ids are unique
/// - every child row references an existing location
/// - at most one crime stats and one demographics row per location
/// - `(location, bias type)` pairs are unique
/// - total incidents fit in a `u64`, so every subset sum does too
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawDataset")]
pub struct Dataset {
    locations: Vec<Location>,
    hate_crimes: Vec<HateCrime>,
    crime_stats: Vec<CrimeStats>,
    demographics: Vec<Demographics>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDataset {
    locations: Vec<Location>,
    #[serde(default)]
    hate_crimes: Vec<HateCrime>,
    #[serde(default)]
    crime_stats: Vec<CrimeStats>,
    #[serde(default)]
    demographics: Vec<Demographics>,
}

impl TryFrom<RawDataset> for Dataset {
    type Error = DatasetError;

    fn try_from(raw: RawDataset) -> Result<Self, Self::Error> {
        Dataset::new(raw.locations, raw.hate_crimes, raw.crime_stats, raw.demographics)
    }
}

impl Dataset {
    pub fn new(
        locations: Vec<Location>,
        hate_crimes: Vec<HateCrime>,
        crime_stats: Vec<CrimeStats>,
        demographics: Vec<Demographics>,
    ) -> Result<Self, DatasetError> {
        let mut ids = BTreeSet::new();
        for location in &locations {
            if !ids.insert(location.id) {
                return Err(DatasetError::DuplicateLocationId(location.id));
            }
        }

        let mut bias_rows = BTreeSet::new();
        let mut incidents: u64 = 0;
        for row in &hate_crimes {
            check_known(&ids, "hate crime", row.location_id)?;
            incidents = incidents
                .checked_add(row.incidents)
                .ok_or(DatasetError::IncidentOverflow)?;
            if !bias_rows.insert((row.location_id, row.bias_type.as_str())) {
                return Err(DatasetError::DuplicateBiasType {
                    id: row.location_id,
                    bias_type: row.bias_type.clone(),
                });
            }
        }

        check_one_per_location(&ids, "crime stats", crime_stats.iter().map(|r| r.location_id))?;
        check_one_per_location(&ids, "demographics", demographics.iter().map(|r| r.location_id))?;

        Ok(Dataset {
            locations,
            hate_crimes,
            crime_stats,
            demographics,
        })
    }

    /// Load a dataset from a JSON file shaped like the serialized [`Dataset`].
    pub fn from_path(path: &Path) -> Result<Self, crate::dataset::StoreError> {
        let f = std::fs::File::open(path)?;
        let dataset = serde_json::from_reader(std::io::BufReader::new(f))?;
        Ok(dataset)
    }

    /// The built-in seed used when no dataset file is configured.
    pub fn seed() -> Self {
        let location = |id: i64, name: &str, state: &str, crime: f64, hate: f64, diversity: f64| Location {
            id: LocationId::new(id),
            name: name.to_string(),
            state: state.to_string(),
            hate_crime_index: Some(hate),
            diversity_index: Some(diversity),
            crime_rate: Some(crime),
            policy_score: None,
        };

        Dataset {
            locations: vec![
                location(1, "Texas", "TX", 0.6, 0.3, 0.7),
                location(2, "California", "CA", 0.5, 0.2, 0.85),
                location(3, "New York", "NY", 0.55, 0.25, 0.8),
            ],
            ..Dataset::default()
        }
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn hate_crimes(&self) -> &[HateCrime] {
        &self.hate_crimes
    }

    pub fn crime_stats(&self) -> &[CrimeStats] {
        &self.crime_stats
    }

    pub fn demographics(&self) -> &[Demographics] {
        &self.demographics
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    /// First location whose name matches, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<&Location> {
        let needle = name.to_lowercase();
        self.locations.iter().find(|l| l.name.to_lowercase() == needle)
    }

    /// Sum of incidents per location across the given bias types.
    pub fn incidents_by_location(&self, bias_types: &[String]) -> BTreeMap<LocationId, u64> {
        let mut sums = BTreeMap::new();
        for row in &self.hate_crimes {
            if bias_types.iter().any(|b| *b == row.bias_type) {
                *sums.entry(row.location_id).or_insert(0) += row.incidents;
            }
        }
        sums
    }
}

fn check_known(ids: &BTreeSet<LocationId>, collection: &'static str, id: LocationId) -> Result<(), DatasetError> {
    if ids.contains(&id) {
        Ok(())
    } else {
        Err(DatasetError::UnknownLocation { collection, id })
    }
}

fn check_one_per_location(
    ids: &BTreeSet<LocationId>,
    collection: &'static str,
    rows: impl Iterator<Item = LocationId>,
) -> Result<(), DatasetError> {
    let mut seen = BTreeSet::new();
    for id in rows {
        check_known(ids, collection, id)?;
        if !seen.insert(id) {
            return Err(DatasetError::DuplicateRow { collection, id });
        }
    }
    Ok(())
}
