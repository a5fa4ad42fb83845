//! Scenario configuration.
//!
//! ```ignore
//! let config = ScenarioConfig::new()
//!     .with_epoch(7)
//!     .with_ownership_enforcement(false);
//! let scenario = Scenario::begin_with_config(sender, &config);
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use sui_oracle_types::env_utils::{env_flag, env_var, harness_key};

/// Default epoch of a fresh scenario.
pub const DEFAULT_EPOCH: u64 = 0;

/// Default epoch start timestamp of a fresh scenario.
pub const DEFAULT_EPOCH_TIMESTAMP_MS: u64 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Epoch of the first transaction (default: 0).
    pub epoch: u64,

    /// Epoch start timestamp of the first transaction in milliseconds (default: 0).
    pub epoch_timestamp_ms: u64,

    /// Fail the transaction boundary on shared/immutable misuse (default: true).
    ///
    /// When false, misuse is logged with `warn!` and the transaction commits.
    pub enforce_ownership: bool,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            epoch: DEFAULT_EPOCH,
            epoch_timestamp_ms: DEFAULT_EPOCH_TIMESTAMP_MS,
            enforce_ownership: true,
        }
    }
}

impl ScenarioConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `ORACLE_HARNESS_EPOCH`,
    /// `ORACLE_HARNESS_EPOCH_TIMESTAMP_MS` and `ORACLE_HARNESS_ENFORCE_OWNERSHIP`.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of this config. Unparseable values
    /// are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(epoch) = env_var(&harness_key("EPOCH")) {
            self.epoch = epoch;
        }
        if let Some(ts) = env_var(&harness_key("EPOCH_TIMESTAMP_MS")) {
            self.epoch_timestamp_ms = ts;
        }
        if let Some(enforce) = env_flag(&harness_key("ENFORCE_OWNERSHIP")) {
            self.enforce_ownership = enforce;
        }
        self
    }

    pub fn with_epoch(mut self, epoch: u64) -> Self {
        self.epoch = epoch;
        self
    }

    pub fn with_epoch_timestamp(mut self, timestamp_ms: u64) -> Self {
        self.epoch_timestamp_ms = timestamp_ms;
        self
    }

    pub fn with_ownership_enforcement(mut self, enforce: bool) -> Self {
        self.enforce_ownership = enforce;
        self
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Write this config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScenarioConfig::default();
        assert_eq!(config.epoch, 0);
        assert_eq!(config.epoch_timestamp_ms, 0);
        assert!(config.enforce_ownership);
    }

    #[test]
    fn test_builders() {
        let config = ScenarioConfig::new()
            .with_epoch(3)
            .with_epoch_timestamp(1_000)
            .with_ownership_enforcement(false);
        assert_eq!(config.epoch, 3);
        assert_eq!(config.epoch_timestamp_ms, 1_000);
        assert!(!config.enforce_ownership);
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scenario.json");
        let config = ScenarioConfig::new().with_epoch(9);
        config.save(&path).expect("save");
        assert_eq!(ScenarioConfig::from_json_file(&path).expect("load"), config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ScenarioConfig = serde_json::from_str(r#"{"epoch": 4}"#).unwrap();
        assert_eq!(config.epoch, 4);
        assert!(config.enforce_ownership);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = ScenarioConfig::from_json_file(dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
