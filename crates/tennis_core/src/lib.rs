//! # tennis_core - Monte Carlo Tennis Match Simulation Engine
//!
//! Simulates singles matches point by point from per-player serve/return
//! statistics and reduces thousands of trials into win probabilities and
//! fantasy-scoring distributions.
//!
//! ## Features
//! - Point → game → tiebreak → set → match state machine
//! - Reproducible runs: same seed = same result, on any thread count
//! - Parallel trials with cooperative cancellation and deadlines
//! - Table-driven fantasy scoring with pluggable rulesets
//! - JSON API for easy integration
//!
//! The core does no I/O of its own; see `tennis_cli` for a file-based driver.

// Doc formatting lints - purely cosmetic
#![allow(clippy::doc_lazy_continuation)]
// Struct initialization pattern used intentionally in tests
#![allow(clippy::field_reassign_with_default)]
// Slot-indexed arrays read clearer with explicit indices
#![allow(clippy::needless_range_loop)]

pub mod api;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod models;
pub mod scoring;
pub mod simulation;

// Re-export main API functions
pub use api::{score_json, simulate_json, simulate_json_with_config, SimulationResponse};
pub use config::SimConfig;
pub use error::{Result, SimError};

pub use engine::{EngineError, MatchSimulator, PointOutcome};
pub use models::{
    MatchCounters, MatchFormat, MatchResult, PlayerProfile, PlayerSlot, ProfileAdjustment,
    ServeOrder, SetScore,
};
pub use scoring::{score, ResolvedRuleset, RulesetRegistry, ScoringTable};
pub use simulation::{
    run, AggregateResult, CancelToken, FlatSummary, MonteCarloRunner, PlayerSummary,
    SimulationRequest,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = simulation::REQUEST_SCHEMA_VERSION;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_end_to_end_flat_record() {
        let p1 = PlayerProfile::new("Server", 0.65, 0.78, 0.55, 0.12, 0.02, 0.36);
        let p2 = PlayerProfile::new("Returner", 0.60, 0.70, 0.52, 0.04, 0.04, 0.42);
        let request = SimulationRequest::new(p1, p2)
            .with_trials(200)
            .with_seed(42)
            .with_ruleset("best_of_3");

        let result = MonteCarloRunner::default().run(&request).unwrap();
        let flat = result.to_flat();
        assert_eq!(flat.p1_name, "Server");
        assert_eq!(flat.p2_name, "Returner");
        assert_eq!(flat.simulations, 200);
        assert_eq!(flat.surface, "Hard");
        assert_eq!(flat.p1_win_pct, result.player1.win_rate);
        assert_eq!(flat.p2_avg_dfs, result.player2.avg_double_faults);
        // The big server should out-ace the returner.
        assert!(flat.p1_avg_aces > flat.p2_avg_aces);
    }

    #[test]
    fn test_json_entry_point_is_deterministic() {
        let profile = |name: &str| {
            json!({
                "name": name,
                "serve_1_in_pct": 0.61, "serve_1_won_pct": 0.73, "serve_2_won_pct": 0.52,
                "ace_pct": 0.07, "df_pct": 0.03
            })
        };
        let request = json!({
            "schema_version": SCHEMA_VERSION,
            "player1": profile("A"),
            "player2": profile("B"),
            "n_sims": 120,
            "seed": 99
        })
        .to_string();

        assert_eq!(simulate_json(&request).unwrap(), simulate_json(&request).unwrap());
    }

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
        assert_eq!(SCHEMA_VERSION, 1);
    }
}
