//! Handler configuration.
//!
//! # Environment variables
//!
//! - `TABLE_NAME`: name of the DynamoDB table that stores crew members.
//! - `REGION`: AWS region of the table. Falls back to the SDK defaults.
//! - `ROLE_INDEX_NAME`: secondary index ordered by role. `roleIx` by default.
//! - `QUERY_POLICY`: `exact-match`, `role-prefix` (default), or
//!   `role-prefix-only`.
//! - `INVALID_PARAMS`: `fallback` (default) or `reject`.

use std::env;
use std::str::FromStr;

use crate::error::Error;
use crate::query::{DEFAULT_ROLE_INDEX_NAME, QueryPolicy};

/// What to do with query parameters that violate the schema.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SchemaViolationPolicy {
    /// Drops the filter and runs the unfiltered lookup.
    #[default]
    Fallback,
    /// Fails the request and echoes the schema.
    Reject,
}

impl FromStr for SchemaViolationPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fallback" => Ok(SchemaViolationPolicy::Fallback),
            "reject" => Ok(SchemaViolationPolicy::Reject),
            _ => Err(Error::InvalidConfig(format!(
                "unknown invalid-params policy: {}",
                s,
            ))),
        }
    }
}

/// Handler configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Table name.
    pub table_name: String,
    /// Optional region override.
    pub region: Option<String>,
    /// Secondary index ordered by role.
    pub role_index_name: String,
    /// Query policy.
    pub query_policy: QueryPolicy,
    /// Schema violation policy.
    pub schema_violation_policy: SchemaViolationPolicy,
}

impl Config {
    /// Creates a configuration with defaults for a table.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            region: None,
            role_index_name: DEFAULT_ROLE_INDEX_NAME.to_string(),
            query_policy: QueryPolicy::default(),
            schema_violation_policy: SchemaViolationPolicy::default(),
        }
    }

    /// Loads the configuration from the environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads the configuration from an arbitrary variable source.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let table_name = var("TABLE_NAME")
            .ok_or_else(|| Error::InvalidConfig("no TABLE_NAME set".to_string()))?;
        let mut config = Config::new(table_name);
        config.region = var("REGION");
        if let Some(index) = var("ROLE_INDEX_NAME") {
            config.role_index_name = index;
        }
        if let Some(policy) = var("QUERY_POLICY") {
            config.query_policy = policy.parse()?;
        }
        if let Some(policy) = var("INVALID_PARAMS") {
            config.schema_violation_policy = policy.parse()?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn from_lookup_applies_defaults() {
        let config = load(&[("TABLE_NAME", "Crew")]).unwrap();
        assert_eq!(config, Config::new("Crew"));
        assert_eq!(config.role_index_name, "roleIx");
        assert_eq!(config.query_policy, QueryPolicy::RolePrefix);
        assert_eq!(config.schema_violation_policy, SchemaViolationPolicy::Fallback);
    }

    #[test]
    fn from_lookup_reads_every_variable() {
        let config = load(&[
            ("TABLE_NAME", "Crew"),
            ("REGION", "eu-west-1"),
            ("ROLE_INDEX_NAME", "byRole"),
            ("QUERY_POLICY", "exact-match"),
            ("INVALID_PARAMS", "reject"),
        ]).unwrap();
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.role_index_name, "byRole");
        assert_eq!(config.query_policy, QueryPolicy::ExactMatch);
        assert_eq!(config.schema_violation_policy, SchemaViolationPolicy::Reject);
    }

    #[test]
    fn from_lookup_requires_table_name() {
        assert!(matches!(load(&[]), Err(Error::InvalidConfig(_))));
        assert!(matches!(
            load(&[("TABLE_NAME", " ")]),
            Err(Error::InvalidConfig(_)),
        ));
    }

    #[test]
    fn from_lookup_rejects_unknown_policies() {
        assert!(load(&[("TABLE_NAME", "Crew"), ("QUERY_POLICY", "fast")]).is_err());
        assert!(load(&[("TABLE_NAME", "Crew"), ("INVALID_PARAMS", "maybe")]).is_err());
        assert!(load(&[("TABLE_NAME", "Crew"), ("INVALID_PARAMS", "ignore")]).is_err());
    }
}
