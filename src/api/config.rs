use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

use crate::cache::DEFAULT_TTL_MS;
use crate::scoring::ScoringPolicy;

/// Keys for the live FBI/Census fetchers. Only their presence is checked.
pub const LIVE_DATA_KEYS: [&str; 2] = ["FBI_API_KEY", "CENSUS_API_KEY"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    /// When set, `/api/admin/dataset` requires a matching `x-admin-token`.
    pub admin_token: Option<String>,
    /// JSON dataset file; the built-in seed is used when absent.
    pub dataset_path: Option<PathBuf>,
    pub scoring_policy: ScoringPolicy,
    pub cache_ttl_ms: i64,
    pub fingerprint_file: Option<PathBuf>,
    pub missing_live_keys: Vec<&'static str>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 4000,
            admin_token: None,
            dataset_path: None,
            scoring_policy: ScoringPolicy::ThreeDimension,
            cache_ttl_ms: DEFAULT_TTL_MS,
            fingerprint_file: None,
            missing_live_keys: Vec::new(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let cache_ttl_ms: i64 = try_load(&lookup, "TRUEPLACE_CACHE_TTL_MS", defaults.cache_ttl_ms)?;
        if cache_ttl_ms <= 0 {
            return Err(ConfigError::Invalid {
                key: "TRUEPLACE_CACHE_TTL_MS",
                value: cache_ttl_ms.to_string(),
                reason: "must be positive".to_string(),
            });
        }

        Ok(Self {
            port: try_load(&lookup, "PORT", defaults.port)?,
            admin_token: optional(&lookup, "ADMIN_TOKEN"),
            dataset_path: optional(&lookup, "TRUEPLACE_DATASET").map(PathBuf::from),
            scoring_policy: try_load(&lookup, "TRUEPLACE_SCORING_POLICY", defaults.scoring_policy)?,
            cache_ttl_ms,
            fingerprint_file: optional(&lookup, "TRUEPLACE_FINGERPRINT_FILE").map(PathBuf::from),
            missing_live_keys: LIVE_DATA_KEYS
                .into_iter()
                .filter(|key| optional(&lookup, key).is_none())
                .collect(),
        })
    }
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = optional(lookup, key) else {
        info!("{key} not set, using default: {default}");
        return Ok(default);
    };

    raw.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn unset_environment_yields_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(
            config,
            Config {
                missing_live_keys: vec!["FBI_API_KEY", "CENSUS_API_KEY"],
                ..Config::default()
            }
        );
    }

    #[test]
    fn values_are_parsed() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("ADMIN_TOKEN", "s3cret"),
            ("TRUEPLACE_DATASET", "/data/trueplace.json"),
            ("TRUEPLACE_SCORING_POLICY", "two-dimension"),
            ("TRUEPLACE_CACHE_TTL_MS", "1000"),
            ("FBI_API_KEY", "k"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.admin_token.as_deref(), Some("s3cret"));
        assert_eq!(config.dataset_path, Some(PathBuf::from("/data/trueplace.json")));
        assert_eq!(config.scoring_policy, ScoringPolicy::TwoDimension);
        assert_eq!(config.cache_ttl_ms, 1000);
        assert_eq!(config.missing_live_keys, vec!["CENSUS_API_KEY"]);
    }

    #[test]
    fn blank_admin_token_counts_as_unset() {
        let config = config_from(&[("ADMIN_TOKEN", "  ")]).unwrap();
        assert_eq!(config.admin_token, None);
    }

    #[test]
    fn malformed_values_name_the_variable() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let err = config_from(&[("TRUEPLACE_SCORING_POLICY", "weighted")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "TRUEPLACE_SCORING_POLICY", .. }));

        let err = config_from(&[("TRUEPLACE_CACHE_TTL_MS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "TRUEPLACE_CACHE_TTL_MS", .. }));
    }
}
