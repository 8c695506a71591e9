//! The TruePlace livability score.
//!
//! A score is a weighted sum of normalized sub-dimensions, reported as an
//! integer percentage. Two formulas exist and are mutually inconsistent, so
//! each is a distinct [`ScoringPolicy`] variant and callers pick one
//! explicitly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dataset::Location;
use crate::types::ranked::{ScoreBreakdown, ScoreResult, SubScores};

/// Data-source attributions returned with every score.
pub const CITATIONS: [&str; 2] = [
    "Safety: FBI Crime Data API (UCR/Hate Crimes)",
    "Community: U.S. Census Bureau ACS (Diversity Index)",
];

const DEFAULT_POLICY_SCORE: f64 = 0.5;
const POLICY_WEIGHT: f64 = 0.15;

/// User preferences that shift the weighting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Profile {
    pub values_diversity: bool,
}

impl Profile {
    pub fn new(values_diversity: bool) -> Self {
        Self { values_diversity }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub safety: f64,
    pub community: f64,
    pub policy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringPolicy {
    /// Safety, community and policy. Safety blends hate-crime and general
    /// crime; a missing policy score counts as 0.5.
    ThreeDimension,
    /// Legacy safety-vs-community model. Safety is `1 - hateCrimeIndex`;
    /// crime rate and policy are ignored.
    TwoDimension,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown scoring policy: {0}")]
pub struct UnknownPolicy(pub String);

impl ScoringPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            ScoringPolicy::ThreeDimension => "three-dimension",
            ScoringPolicy::TwoDimension => "two-dimension",
        }
    }

    pub fn weights(self, profile: Profile) -> Weights {
        match self {
            ScoringPolicy::ThreeDimension => {
                let community = if profile.values_diversity { 0.6 } else { 0.45 };
                Weights {
                    safety: 1.0 - community - POLICY_WEIGHT,
                    community,
                    policy: POLICY_WEIGHT,
                }
            }
            ScoringPolicy::TwoDimension => {
                let community = if profile.values_diversity { 0.65 } else { 0.5 };
                Weights {
                    safety: 1.0 - community,
                    community,
                    policy: 0.0,
                }
            }
        }
    }

    pub fn score(self, location: &Location, profile: Profile) -> ScoreResult {
        let hate_crime_index = location.hate_crime_index.unwrap_or(0.0);
        let diversity_index = location.diversity_index.unwrap_or(0.0);
        let crime_rate = location.crime_rate.unwrap_or(0.0);
        let policy_score = location.policy_score.unwrap_or(DEFAULT_POLICY_SCORE);

        let w = self.weights(profile);

        let safety01 = match self {
            ScoringPolicy::ThreeDimension => clamp01((1.0 - hate_crime_index) * 0.6 + (1.0 - crime_rate) * 0.4),
            ScoringPolicy::TwoDimension => clamp01(1.0 - hate_crime_index),
        };
        let community01 = clamp01(diversity_index);
        let policy01 = match self {
            ScoringPolicy::ThreeDimension => Some(clamp01(policy_score)),
            ScoringPolicy::TwoDimension => None,
        };

        let score01 = safety01 * w.safety + community01 * w.community + policy01.unwrap_or(0.0) * w.policy;
        debug_assert!((0.0..=1.0 + 1e-9).contains(&score01), "score {score01} out of range [0.0, 1.0]");

        ScoreResult {
            score: percent(score01),
            breakdown: ScoreBreakdown {
                hate_crime_index,
                diversity_index,
            },
            sub_scores: SubScores {
                safety: percent(safety01),
                community: percent(community01),
                policy: policy01.map(percent),
            },
            citations: CITATIONS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl fmt::Display for ScoringPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "three-dimension" | "v2" => Ok(ScoringPolicy::ThreeDimension),
            "two-dimension" | "v1" => Ok(ScoringPolicy::TwoDimension),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

/// Score one location under `policy`.
pub fn compute_score(location: &Location, profile: Profile, policy: ScoringPolicy) -> ScoreResult {
    policy.score(location, profile)
}

// NaN maps to 0.
fn clamp01(x: f64) -> f64 {
    x.max(0.0).min(1.0)
}

fn percent(x01: f64) -> u8 {
    (clamp01(x01) * 100.0).round() as u8
}
