use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::dataset::{DatasetSummary, Location, LocationStats};
use crate::ranking::query::parse_bool;
use crate::ranking::{ProfileQuery, ValidationError};
use crate::scoring::{Profile, CITATIONS};
use crate::types::identifiers::{DatasetFingerprint, LocationId};
use crate::types::ranked::{RankedPage, ScoreResult};

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

type RawPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LocationSummary {
    pub id: LocationId,
    pub name: String,
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct LocationList {
    pub locations: Vec<LocationSummary>,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub location: String,
    pub state: String,
    #[serde(flatten)]
    pub result: ScoreResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BiasCount {
    pub bias_type: String,
    pub incidents: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HateCrimeStats {
    pub by_bias: Vec<BiasCount>,
    pub total: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeRates {
    pub violent_rate: f64,
    pub property_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct DiversityStat {
    pub diversity: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailStats {
    pub hate_crimes: HateCrimeStats,
    pub crime_stats: Option<CrimeRates>,
    pub demographics: Option<DiversityStat>,
}

#[derive(Debug, Serialize)]
pub struct LocationDetail {
    #[serde(flatten)]
    pub location: Location,
    pub stats: DetailStats,
    #[serde(flatten)]
    pub result: ScoreResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetReport {
    #[serde(flatten)]
    pub summary: DatasetSummary,
    pub citations: Vec<&'static str>,
    pub fingerprint: DatasetFingerprint,
    pub generated_at: DateTime<Utc>,
}

impl From<LocationStats> for DetailStats {
    fn from(stats: LocationStats) -> Self {
        let by_bias: Vec<BiasCount> = stats
            .hate_crimes
            .into_iter()
            .map(|r| BiasCount {
                bias_type: r.bias_type,
                incidents: r.incidents,
            })
            .collect();
        let total = by_bias.iter().map(|b| b.incidents).sum();

        DetailStats {
            hate_crimes: HateCrimeStats { by_bias, total },
            crime_stats: stats.crime_stats.map(|c| CrimeRates {
                violent_rate: c.violent_rate,
                property_rate: c.property_rate,
            }),
            demographics: stats.demographics.map(|d| DiversityStat { diversity: d.diversity }),
        }
    }
}

fn pairs(query: RawPairs) -> Result<Vec<(String, String)>, ApiError> {
    query.map(|Query(pairs)| pairs).map_err(|_| ApiError::MalformedQuery)
}

/// Compares SHA-256 digests without an early exit.
fn tokens_match(presented: &str, expected: &str) -> bool {
    let a = Sha256::digest(presented.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Last non-empty value of `key`, if any.
fn param<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .rev()
        .find(|(k, v)| k == key && !v.trim().is_empty())
        .map(|(_, v)| v.trim())
}

fn profile_from(pairs: &[(String, String)]) -> Result<Profile, ValidationError> {
    let values_diversity = match param(pairs, "valuesDiversity") {
        Some(v) => parse_bool("valuesDiversity", v)?,
        None => false,
    };
    Ok(Profile::new(values_diversity))
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn list_locations(State(state): State<Arc<AppState>>) -> Result<Json<LocationList>, ApiError> {
    let locations = state
        .store
        .locations()?
        .into_iter()
        .map(|l| LocationSummary {
            id: l.id,
            name: l.name,
            state: l.state,
        })
        .collect();

    Ok(Json(LocationList { locations }))
}

pub async fn location_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    query: RawPairs,
) -> Result<Json<LocationDetail>, ApiError> {
    let pairs = pairs(query)?;
    let id = id
        .trim()
        .parse::<i64>()
        .map(LocationId::new)
        .map_err(|_| ValidationError::InvalidNumber { field: "id", value: id.clone() })?;
    let profile = profile_from(&pairs)?;

    let location = state.store.location(id)?.ok_or(ApiError::NotFound("Location not found"))?;
    let stats = state.store.location_stats(id)?;
    let result = state.ranker.policy().score(&location, profile);

    Ok(Json(LocationDetail {
        location,
        stats: stats.into(),
        result,
    }))
}

pub async fn score(State(state): State<Arc<AppState>>, query: RawPairs) -> Result<Json<ScoreResponse>, ApiError> {
    let pairs = pairs(query)?;
    let name = param(&pairs, "location").ok_or(ValidationError::Missing { field: "location" })?;
    let profile = profile_from(&pairs)?;

    let location = state
        .store
        .find_by_name(name)?
        .ok_or(ApiError::NotFound("Location not found"))?;
    let result = state.ranker.policy().score(&location, profile);

    Ok(Json(ScoreResponse {
        location: location.name,
        state: location.state,
        result,
    }))
}

pub async fn profile_scores(
    State(state): State<Arc<AppState>>,
    query: RawPairs,
) -> Result<Json<RankedPage>, ApiError> {
    let pairs = pairs(query)?;
    let query = ProfileQuery::from_pairs(&pairs)?;
    Ok(Json(state.ranker.rank(&query)?))
}

pub async fn admin_dataset(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<DatasetReport>, ApiError> {
    if let Some(token) = &state.config.admin_token {
        let presented = headers.get(ADMIN_TOKEN_HEADER).and_then(|v| v.to_str().ok());
        if !presented.is_some_and(|p| tokens_match(p, token)) {
            return Err(ApiError::Forbidden);
        }
    }

    let summary = state.store.summary()?;
    let fingerprint = summary.fingerprint()?;

    Ok(Json(DatasetReport {
        summary,
        citations: CITATIONS.to_vec(),
        fingerprint,
        generated_at: state.clock.now(),
    }))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not found")
}
