use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scoring::Profile;

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} must be a finite number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} must be true or false, got {value:?}")]
    InvalidBoolean { field: &'static str, value: String },

    #[error("{field} must be one of {expected}, got {value:?}")]
    InvalidChoice {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl ValidationError {
    /// The query parameter that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Missing { field }
            | ValidationError::InvalidNumber { field, .. }
            | ValidationError::InvalidBoolean { field, .. }
            | ValidationError::InvalidChoice { field, .. } => *field,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Score,
    Safety,
    Community,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortField::Score => "score",
            SortField::Safety => "safety",
            SortField::Community => "community",
        })
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        })
    }
}

/// Validated parameters of a ranking request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileQuery {
    pub values_diversity: bool,
    pub min_safety: Option<f64>,
    pub min_community: Option<f64>,
    pub sort_by: SortField,
    pub sort_dir: SortDirection,
    /// Always within `1..=MAX_LIMIT`.
    pub limit: usize,
    pub offset: usize,
    pub nocache: bool,
    /// Sorted and de-duplicated.
    pub bias_types: Vec<String>,
}

impl Default for ProfileQuery {
    fn default() -> Self {
        Self {
            values_diversity: false,
            min_safety: None,
            min_community: None,
            sort_by: SortField::default(),
            sort_dir: SortDirection::default(),
            limit: DEFAULT_LIMIT,
            offset: 0,
            nocache: false,
            bias_types: Vec::new(),
        }
    }
}

impl ProfileQuery {
    /// Parse raw query-string pairs.
    ///
    /// Empty values count as unset. For scalar parameters the last
    /// occurrence wins; `biasType` (or `biasType[]`) may repeat and may hold
    /// comma-separated values. Unknown keys are ignored.
    pub fn from_pairs<K, V>(pairs: &[(K, V)]) -> Result<Self, ValidationError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = ProfileQuery::default();

        for (key, value) in pairs {
            let value = value.as_ref().trim();
            match key.as_ref() {
                "biasType" | "biasType[]" => {
                    query.bias_types.extend(
                        value
                            .split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(str::to_string),
                    );
                }
                _ if value.is_empty() => {}
                "valuesDiversity" => query.values_diversity = parse_bool("valuesDiversity", value)?,
                "nocache" => query.nocache = parse_bool("nocache", value)?,
                "minSafety" => query.min_safety = Some(parse_number("minSafety", value)?),
                "minCommunity" => query.min_community = Some(parse_number("minCommunity", value)?),
                "limit" => {
                    let n = parse_number("limit", value)?.trunc();
                    query.limit = n.clamp(1.0, MAX_LIMIT as f64) as usize;
                }
                "offset" => {
                    let n = parse_number("offset", value)?.trunc();
                    query.offset = n.max(0.0) as usize;
                }
                "sortBy" => {
                    query.sort_by = match value {
                        "score" => SortField::Score,
                        "safety" => SortField::Safety,
                        "community" => SortField::Community,
                        _ => return Err(choice("sortBy", value, "score, safety, community")),
                    }
                }
                "sortDir" => {
                    query.sort_dir = match value {
                        "asc" => SortDirection::Asc,
                        "desc" => SortDirection::Desc,
                        _ => return Err(choice("sortDir", value, "asc, desc")),
                    }
                }
                _ => {}
            }
        }

        query.bias_types.sort();
        query.bias_types.dedup();

        Ok(query)
    }

    pub fn profile(&self) -> Profile {
        Profile::new(self.values_diversity)
    }
}

/// `true`/`false`/`1`/`0`, case-insensitive.
pub fn parse_bool(field: &'static str, value: &str) -> Result<bool, ValidationError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ValidationError::InvalidBoolean {
            field,
            value: value.to_string(),
        }),
    }
}

pub fn parse_number(field: &'static str, value: &str) -> Result<f64, ValidationError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ValidationError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn choice(field: &'static str, value: &str, expected: &'static str) -> ValidationError {
    ValidationError::InvalidChoice {
        field,
        value: value.to_string(),
        expected,
    }
}
