//! Configuration types for keyscope.
//!
//! Configuration can be loaded from a YAML file (`keyscope.yaml`) and is then
//! overridden field by field from the command line.
//!
//! ```yaml
//! service:
//!   url: https://xyz.supabase.co
//!   api_key_env: SUPABASE_KEY
//! probe:
//!   include: [users, posts]
//!   skip: [delete]
//!   seed: 42
//! ```

pub mod service;

use crate::error::ConfigError;
use crate::model::CheckKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use service::ServiceConfig;

/// Complete keyscope configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyscopeConfig {
    /// Data service connection.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Which tables and checks to run.
    #[serde(default)]
    pub probe: ProbeSettings,
}

/// Table selection and check settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProbeSettings {
    /// Only probe these tables. Empty means all.
    #[serde(default)]
    pub include: Vec<String>,

    /// Never probe these tables.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Checks that are not attempted.
    #[serde(default)]
    pub skip: Vec<CheckKind>,

    /// Seed for the record generator. Random when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl ProbeSettings {
    /// Whether `table` passes the include/exclude filters.
    pub fn selects(&self, table: &str) -> bool {
        if self.exclude.iter().any(|t| t == table) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|t| t == table)
    }

    pub fn skips(&self, check: CheckKind) -> bool {
        self.skip.contains(&check)
    }
}

impl KeyscopeConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Check the settings that can be verified without touching the network.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.service.base_url()?;
        self.service.resolve_api_key()?;

        if let Some(table) = self
            .probe
            .include
            .iter()
            .find(|t| self.probe.exclude.contains(t))
        {
            return Err(ConfigError::ConflictingFilter(table.clone()));
        }
        Ok(())
    }
}
