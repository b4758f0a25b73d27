use thiserror::Error;

use crate::engine::EngineError;
use crate::models::{PlayerSlot, ProfileField};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid profile for {player} ({field}): {reason}")]
    InvalidProfile { player: PlayerSlot, field: ProfileField, reason: String },

    #[error("Invalid trial count: {0} (must be between 1 and the configured maximum)")]
    InvalidTrialCount(u32),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Match cannot be decided: {0}")]
    UndecidableMatch(String),

    #[error("Ruleset parse error: {0}")]
    RulesetParse(String),

    #[error("Trial {trial} failed: {source}")]
    Engine {
        trial: u64,
        #[source]
        source: EngineError,
    },

    #[error("Trial {trial} violated a match invariant: {reason}")]
    TrialInvariant { trial: u64, reason: String },

    #[error("Worker pool error: {0}")]
    ThreadPool(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SimError {
    /// Errors raised while checking inputs, before any trial ran.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SimError::InvalidProfile { .. }
                | SimError::InvalidTrialCount(_)
                | SimError::InvalidConfig(_)
                | SimError::UndecidableMatch(_)
                | SimError::RulesetParse(_)
        )
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
