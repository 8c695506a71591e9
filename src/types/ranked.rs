use serde::{Deserialize, Serialize};

use crate::types::identifiers::LocationId;

/// Raw indices echoed back alongside a score, after defaults are applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub hate_crime_index: f64,
    pub diversity_index: f64,
}

/// Per-dimension percentages in `0..=100`.
///
/// `policy` is absent under the two-dimension policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubScores {
    pub safety: u8,
    pub community: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<u8>,
}

/// Derived score for one location. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub score: u8,
    pub breakdown: ScoreBreakdown,
    pub sub_scores: SubScores,
    pub citations: Vec<String>,
}

/// A scored location as it appears in ranking output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedLocation {
    pub id: LocationId,
    pub name: String,
    pub state: String,
    #[serde(flatten)]
    pub result: ScoreResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub limit: usize,
    pub offset: usize,
}

/// Cache outcome reported to the caller of a ranking request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub hit: bool,
    pub key: String,
    pub ttl_ms: i64,
}

/// One page of a ranking, plus the size of the full filtered list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPage {
    pub results: Vec<RankedLocation>,
    pub total: usize,
    pub page: PageInfo,
    pub cache: CacheStatus,
}
