//! Runner configuration
//!
//! Loaded from JSON or YAML. `from_env` reads the file named by
//! `TENNIS_SIM_CONFIG_PATH`; the simulation entry points never touch the
//! filesystem themselves.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::{env, fs};

use crate::error::{Result, SimError};

pub const CONFIG_PATH_ENV: &str = "TENNIS_SIM_CONFIG_PATH";

pub const DEFAULT_TRIALS: u32 = 1000;
pub const DEFAULT_MAX_TRIALS: u32 = 1_000_000;

fn default_trials() -> u32 {
    DEFAULT_TRIALS
}
fn default_max_trials() -> u32 {
    DEFAULT_MAX_TRIALS
}
fn default_parallel() -> bool {
    true
}
fn default_parallel_threshold() -> u32 {
    512
}
fn default_batch_size() -> u32 {
    1024
}
fn default_verify_invariants() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    /// Trials used when a request does not name a count.
    #[serde(default = "default_trials")]
    pub default_trials: u32,

    #[serde(default = "default_max_trials")]
    pub max_trials: u32,

    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Runs with fewer trials stay on the calling thread.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: u32,

    /// Trials per batch; cancellation is checked between batches.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Dedicated worker pool size. `None` uses the global rayon pool.
    #[serde(default)]
    pub threads: Option<usize>,

    /// Reject noisy profiles instead of clamping them.
    #[serde(default)]
    pub strict_profiles: bool,

    /// Check every finished trial's structure before scoring it.
    #[serde(default = "default_verify_invariants")]
    pub verify_invariants: bool,

    /// Wall-clock budget for one run, in milliseconds.
    #[serde(default)]
    pub time_budget_ms: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            default_trials: default_trials(),
            max_trials: default_max_trials(),
            parallel: default_parallel(),
            parallel_threshold: default_parallel_threshold(),
            batch_size: default_batch_size(),
            threads: None,
            strict_profiles: false,
            verify_invariants: default_verify_invariants(),
            time_budget_ms: None,
        }
    }
}

impl SimConfig {
    /// Single-threaded preset.
    pub fn sequential() -> Self {
        Self { parallel: false, ..Self::default() }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_trials == 0 {
            return Err(SimError::InvalidConfig("max_trials must be at least 1".to_string()));
        }
        if self.default_trials == 0 || self.default_trials > self.max_trials {
            return Err(SimError::InvalidConfig(format!(
                "default_trials must be 1..={}, got {}",
                self.max_trials, self.default_trials
            )));
        }
        if self.batch_size == 0 {
            return Err(SimError::InvalidConfig("batch_size must be at least 1".to_string()));
        }
        if self.threads == Some(0) {
            return Err(SimError::InvalidConfig("threads must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)
            .map_err(|e| SimError::InvalidConfig(format!("invalid JSON config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: SimConfig = serde_yaml::from_str(yaml)
            .map_err(|e| SimError::InvalidConfig(format!("invalid YAML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file; `.yaml`/`.yml` parse as YAML, anything else as JSON.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SimError::InvalidConfig(format!("failed to read config '{}': {e}", path.display()))
        })?;
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    /// Config from [`CONFIG_PATH_ENV`] when set, defaults otherwise.
    pub fn from_env() -> Result<Self> {
        let Ok(path) = env::var(CONFIG_PATH_ENV) else {
            return Ok(Self::default());
        };
        let path = path.trim();
        if path.is_empty() {
            return Ok(Self::default());
        }
        Self::from_path(Path::new(path))
            .map_err(|e| SimError::InvalidConfig(format!("{CONFIG_PATH_ENV}='{path}': {e}")))
    }
}
