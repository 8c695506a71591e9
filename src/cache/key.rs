use std::fmt;

use serde::Serialize;

use crate::ranking::query::{ProfileQuery, SortDirection, SortField};
use crate::types::identifiers::DatasetFingerprint;

/// `<fingerprint>:<canonical JSON of the result-shaping parameters>`.
///
/// Pagination and `nocache` are not part of the key: the cached value is the
/// full sorted list, so every page of one ranking shares an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

// Field order is the serialization order. Unset filters are omitted.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyParams<'a> {
    values_diversity: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_safety: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_community: Option<f64>,
    sort_by: SortField,
    sort_dir: SortDirection,
    #[serde(skip_serializing_if = "no_bias_types")]
    bias_types: &'a [String],
}

fn no_bias_types(bias_types: &&[String]) -> bool {
    bias_types.is_empty()
}

impl CacheKey {
    pub fn for_query(fingerprint: &DatasetFingerprint, query: &ProfileQuery) -> Result<Self, serde_json::Error> {
        let params = serde_json::to_string(&KeyParams {
            values_diversity: query.values_diversity,
            min_safety: query.min_safety,
            min_community: query.min_community,
            sort_by: query.sort_by,
            sort_dir: query.sort_dir,
            bias_types: &query.bias_types,
        })?;
        Ok(CacheKey(format!("{fingerprint}:{params}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
