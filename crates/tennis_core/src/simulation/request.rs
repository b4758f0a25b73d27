use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::models::{MatchFormat, PlayerProfile, ServeOrder};

pub const REQUEST_SCHEMA_VERSION: u8 = 1;

fn default_schema_version() -> u8 {
    REQUEST_SCHEMA_VERSION
}

fn default_surface() -> String {
    "Hard".to_string()
}

/// One simulation run: two profiles and how to play them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SimulationRequest {
    #[serde(default = "default_schema_version")]
    pub schema_version: u8,
    pub player1: PlayerProfile,
    pub player2: PlayerProfile,
    /// Display label only; never read by the simulator.
    #[serde(default = "default_surface")]
    pub surface: String,
    #[serde(default, alias = "match_format")]
    pub format: MatchFormat,
    /// Legacy form of `format` (2 → best of 3, 3 → best of 5). Wins when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets_to_win: Option<u8>,
    /// Defaults to the runner's configured trial count.
    #[serde(default, alias = "n_sims", alias = "simulations")]
    pub trials: Option<u32>,
    /// Defaults to the registry default (`best_of_3`).
    #[serde(default)]
    pub ruleset: Option<String>,
    /// Fixed seed for reproducible runs. Drawn from OS entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub walkover: bool,
    #[serde(default)]
    pub first_server: ServeOrder,
}

impl SimulationRequest {
    pub fn new(player1: PlayerProfile, player2: PlayerProfile) -> Self {
        Self {
            schema_version: REQUEST_SCHEMA_VERSION,
            player1,
            player2,
            surface: default_surface(),
            format: MatchFormat::default(),
            sets_to_win: None,
            trials: None,
            ruleset: None,
            seed: None,
            walkover: false,
            first_server: ServeOrder::default(),
        }
    }

    pub fn with_trials(mut self, trials: u32) -> Self {
        self.trials = Some(trials);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_format(mut self, format: MatchFormat) -> Self {
        self.format = format;
        self.sets_to_win = None;
        self
    }

    pub fn with_ruleset(mut self, ruleset: impl Into<String>) -> Self {
        self.ruleset = Some(ruleset.into());
        self
    }

    pub fn with_walkover(mut self, walkover: bool) -> Self {
        self.walkover = walkover;
        self
    }

    pub fn with_first_server(mut self, first_server: ServeOrder) -> Self {
        self.first_server = first_server;
        self
    }

    /// `format`, overridden by the legacy `sets_to_win` field when present.
    pub fn resolved_format(&self) -> Result<MatchFormat> {
        match self.sets_to_win {
            None => Ok(self.format),
            Some(sets) => MatchFormat::from_sets_to_win(sets).ok_or_else(|| {
                SimError::InvalidConfig(format!("sets_to_win must be 2 or 3, got {sets}"))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_request_defaults() {
        let json = r#"{
            "player1": {"name": "A", "first_serve_in_pct": 0.6, "first_serve_won_pct": 0.7,
                        "second_serve_won_pct": 0.5, "ace_rate": 0.05, "double_fault_rate": 0.03},
            "player2": {"name": "B", "first_serve_in_pct": 0.6, "first_serve_won_pct": 0.7,
                        "second_serve_won_pct": 0.5, "ace_rate": 0.05, "double_fault_rate": 0.03}
        }"#;
        let request: SimulationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.schema_version, 1);
        assert_eq!(request.surface, "Hard");
        assert_eq!(request.format, MatchFormat::BestOf3);
        assert_eq!(request.trials, None);
        assert_eq!(request.first_server, ServeOrder::Player1);
        assert!(!request.walkover);
    }

    #[test]
    fn test_legacy_fields() {
        let json = r#"{
            "player1": {"name": "A", "serve_1_in_pct": 0.6, "serve_1_won_pct": 0.7,
                        "serve_2_won_pct": 0.5, "ace_pct": 0.05, "df_pct": 0.03},
            "player2": {"name": "B", "serve_1_in_pct": 0.6, "serve_1_won_pct": 0.7,
                        "serve_2_won_pct": 0.5, "ace_pct": 0.05, "df_pct": 0.03},
            "n_sims": 250,
            "sets_to_win": 3
        }"#;
        let request: SimulationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.trials, Some(250));
        assert_eq!(request.resolved_format().unwrap(), MatchFormat::BestOf5);
    }

    #[test]
    fn test_bad_sets_to_win() {
        let p = PlayerProfile::new("A", 0.6, 0.7, 0.5, 0.05, 0.03, 0.3);
        let mut request = SimulationRequest::new(p.clone(), p);
        request.sets_to_win = Some(4);
        assert!(request.resolved_format().unwrap_err().is_input_error());
    }
}
