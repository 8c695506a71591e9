use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dataset::records::Dataset;
use crate::types::identifiers::DatasetFingerprint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetCounts {
    pub locations: usize,
    pub hate_crimes: usize,
    pub crime_stats: usize,
    pub demographics: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSums {
    pub hate_crimes_incidents: u64,
    pub violent_rate: f64,
    pub property_rate: f64,
}

/// Latest `updatedAt` stamp per collection. Informational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastUpdated {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hate_crimes: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crime_stats: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demographics: Option<DateTime<Utc>>,
}

/// Aggregate counts and sums over a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    pub counts: DatasetCounts,
    pub sums: DatasetSums,
    pub last_updated: LastUpdated,
}

// Canonical hashed payload. Field order is the serialization order.
#[derive(Serialize)]
struct FingerprintPayload<'a> {
    counts: &'a DatasetCounts,
    sums: &'a DatasetSums,
}

impl DatasetSummary {
    pub fn of(dataset: &Dataset) -> Self {
        let counts = DatasetCounts {
            locations: dataset.locations().len(),
            hate_crimes: dataset.hate_crimes().len(),
            crime_stats: dataset.crime_stats().len(),
            demographics: dataset.demographics().len(),
        };

        let sums = DatasetSums {
            hate_crimes_incidents: dataset.hate_crimes().iter().map(|r| r.incidents).sum(),
            violent_rate: dataset.crime_stats().iter().map(|r| r.violent_rate).sum(),
            property_rate: dataset.crime_stats().iter().map(|r| r.property_rate).sum(),
        };

        let last_updated = LastUpdated {
            hate_crimes: dataset.hate_crimes().iter().filter_map(|r| r.updated_at).max(),
            crime_stats: dataset.crime_stats().iter().filter_map(|r| r.updated_at).max(),
            demographics: dataset.demographics().iter().filter_map(|r| r.updated_at).max(),
        };

        DatasetSummary {
            counts,
            sums,
            last_updated,
        }
    }

    /// Hash of counts and sums. Update stamps do not participate.
    pub fn fingerprint(&self) -> Result<DatasetFingerprint, serde_json::Error> {
        let payload = serde_json::to_vec(&FingerprintPayload {
            counts: &self.counts,
            sums: &self.sums,
        })?;
        Ok(DatasetFingerprint::from_payload(&payload))
    }
}

/// Swap the fingerprint stored at `path` for `next`, returning the previous
/// one if the file existed and was non-empty.
pub fn record_fingerprint(path: &Path, next: &DatasetFingerprint) -> io::Result<Option<String>> {
    let previous = match fs::read_to_string(path) {
        Ok(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(e),
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format!("{next}\n"))?;

    Ok(previous)
}
