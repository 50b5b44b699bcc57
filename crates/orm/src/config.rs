//! Hydration and database configuration loaded from the environment

use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::backends::DatabasePoolConfig;

/// Default number of foreign-key hops followed from a root row
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Configuration for foreign-key resolution during hydration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydrationConfig {
    /// Maximum number of foreign-key hops followed from the root row
    pub max_depth: usize,
    /// Stop when an edge `(table, field, value)` repeats on the current path
    pub detect_cycles: bool,
}

impl Default for HydrationConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            detect_cycles: true,
        }
    }
}

impl HydrationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_cycle_detection(mut self, detect_cycles: bool) -> Self {
        self.detect_cycles = detect_cycles;
        self
    }

    /// Load from `STRATA_HYDRATE_MAX_DEPTH` and `STRATA_HYDRATE_DETECT_CYCLES`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_depth = value_or_default(
            &lookup,
            "STRATA_HYDRATE_MAX_DEPTH",
            &defaults.max_depth.to_string(),
        );
        let max_depth = parse_value::<usize>("max_depth", max_depth, "a positive integer")?;

        let detect_cycles = value_or_default(
            &lookup,
            "STRATA_HYDRATE_DETECT_CYCLES",
            &defaults.detect_cycles.to_string(),
        );
        let detect_cycles = parse_bool("detect_cycles", detect_cycles)?;

        let config = Self {
            max_depth,
            detect_cycles,
        };
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "max_depth".to_string(),
                reason: "At least one foreign-key hop must be allowed".to_string(),
            });
        }

        Ok(())
    }
}

/// Connection settings for the PostgreSQL backend
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool: DatabasePoolConfig,
}

impl DatabaseConfig {
    /// Load from `DATABASE_URL` and the `DATABASE_*` pool variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL").ok_or_else(|| ConfigError::MissingEnvVar {
            var: "DATABASE_URL".to_string(),
        })?;

        let defaults = DatabasePoolConfig::default();

        let max_connections = value_or_default(
            &lookup,
            "DATABASE_MAX_CONNECTIONS",
            &defaults.max_connections.to_string(),
        );
        let max_connections = parse_value::<u32>("max_connections", max_connections, "a number")?;

        let min_connections = value_or_default(
            &lookup,
            "DATABASE_MIN_CONNECTIONS",
            &defaults.min_connections.to_string(),
        );
        let min_connections = parse_value::<u32>("min_connections", min_connections, "a number")?;

        let acquire_timeout = value_or_default(
            &lookup,
            "DATABASE_ACQUIRE_TIMEOUT",
            &defaults.acquire_timeout_seconds.to_string(),
        );
        let acquire_timeout_seconds =
            parse_value::<u64>("acquire_timeout_seconds", acquire_timeout, "seconds")?;

        let config = Self {
            url,
            pool: DatabasePoolConfig {
                max_connections,
                min_connections,
                acquire_timeout_seconds,
                ..defaults
            },
        };
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "url".to_string(),
                reason: "Database URL cannot be empty".to_string(),
            });
        }

        if self.pool.max_connections == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "max_connections".to_string(),
                reason: "Pool must allow at least one connection".to_string(),
            });
        }

        if self.pool.min_connections > self.pool.max_connections {
            return Err(ConfigError::ValidationFailed {
                field: "min_connections".to_string(),
                reason: format!(
                    "min_connections ({}) exceeds max_connections ({})",
                    self.pool.min_connections, self.pool.max_connections
                ),
            });
        }

        Ok(())
    }
}

fn value_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| default.to_string())
}

fn parse_value<T: FromStr>(field: &str, value: String, expected: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        value,
        expected: expected.to_string(),
    })
}

fn parse_bool(field: &str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value,
            expected: "true or false".to_string(),
        }),
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}")]
    MissingEnvVar { var: String },

    #[error("Invalid value for {field}: '{value}', expected {expected}")]
    InvalidValue { field: String, value: String, expected: String },

    #[error("Validation failed for {field}: {reason}")]
    ValidationFailed { field: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_hydration_defaults() {
        let config = HydrationConfig::from_source(source(&[])).unwrap();
        assert_eq!(config, HydrationConfig::default());
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.detect_cycles);
    }

    #[test]
    fn test_hydration_from_source() {
        let config = HydrationConfig::from_source(source(&[
            ("STRATA_HYDRATE_MAX_DEPTH", "3"),
            ("STRATA_HYDRATE_DETECT_CYCLES", "off"),
        ]))
        .unwrap();

        assert_eq!(config.max_depth, 3);
        assert!(!config.detect_cycles);
    }

    #[test]
    fn test_hydration_rejects_zero_depth() {
        let err = HydrationConfig::from_source(source(&[("STRATA_HYDRATE_MAX_DEPTH", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "max_depth"));
    }

    #[test]
    fn test_hydration_rejects_garbage() {
        let err = HydrationConfig::from_source(source(&[("STRATA_HYDRATE_DETECT_CYCLES", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "detect_cycles"));
    }

    #[test]
    fn test_database_config_requires_url() {
        let err = DatabaseConfig::from_source(source(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar { ref var } if var == "DATABASE_URL"));
    }

    #[test]
    fn test_database_config_pool_bounds() {
        let err = DatabaseConfig::from_source(source(&[
            ("DATABASE_URL", "postgres://localhost/app"),
            ("DATABASE_MAX_CONNECTIONS", "2"),
            ("DATABASE_MIN_CONNECTIONS", "5"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "min_connections"));

        let config = DatabaseConfig::from_source(source(&[
            ("DATABASE_URL", "postgres://localhost/app"),
            ("DATABASE_MAX_CONNECTIONS", "20"),
        ]))
        .unwrap();
        assert_eq!(config.pool.max_connections, 20);
        assert_eq!(config.pool.min_connections, 1);
    }
}
