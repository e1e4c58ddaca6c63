// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Persistence Configuration
//!
//! YAML-backed settings for the marshaller, the key-value store and the
//! event bus.
//!
//! ```yaml
//! decode_policy: strict
//! table_prefix: staging_
//! event_bus_capacity: 500
//! ```
//!
//! Environment overrides (applied by [`PersistenceConfig::load_or_default`]):
//!
//! | Variable | Field |
//! |----------|-------|
//! | `KEYSTONE_DECODE_POLICY` | `decode_policy` |
//! | `KEYSTONE_TABLE_PREFIX` | `table_prefix` |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::marshal::{DecodePolicy, Marshaller};

pub const DECODE_POLICY_ENV: &str = "KEYSTONE_DECODE_POLICY";
pub const TABLE_PREFIX_ENV: &str = "KEYSTONE_TABLE_PREFIX";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default)]
    pub decode_policy: DecodePolicy,

    /// Prepended to every table name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_prefix: Option<String>,

    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

fn default_event_bus_capacity() -> usize {
    1000
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            decode_policy: DecodePolicy::default(),
            table_prefix: None,
            event_bus_capacity: default_event_bus_capacity(),
        }
    }
}

impl PersistenceConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parses and validates.
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads from `path` when given (failing if it cannot be read), otherwise
    /// starts from defaults. Environment overrides apply either way.
    pub fn load_or_default(path: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => {
                tracing::info!("Loading persistence configuration from {:?}", path);
                Self::from_yaml_file(&path).map_err(|e| {
                    anyhow::anyhow!("Failed to load persistence config at {:?}: {}", path, e)
                })?
            }
            None => {
                tracing::info!("No persistence configuration file given, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(DECODE_POLICY_ENV) {
            match val.parse::<DecodePolicy>() {
                Ok(policy) => {
                    tracing::info!("Environment override: {}={}", DECODE_POLICY_ENV, policy);
                    self.decode_policy = policy;
                }
                Err(_) => {
                    tracing::warn!(
                        "Invalid value for {}: '{}'. Expected lenient/strict. Ignoring.",
                        DECODE_POLICY_ENV,
                        val
                    );
                }
            }
        }

        if let Ok(val) = std::env::var(TABLE_PREFIX_ENV) {
            tracing::info!("Environment override: {}={}", TABLE_PREFIX_ENV, val);
            self.table_prefix = Some(val);
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.event_bus_capacity == 0 {
            anyhow::bail!("event_bus_capacity must be greater than zero");
        }

        if let Some(prefix) = &self.table_prefix {
            if prefix.trim().is_empty() {
                anyhow::bail!("table_prefix cannot be blank; omit it instead");
            }
        }

        Ok(())
    }

    /// Marshaller with a fresh descriptor cache and the configured policy.
    pub fn marshaller(&self) -> Marshaller {
        Marshaller::with_policy(self.decode_policy)
    }
}
