use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::data::builtin_rulesets;
use crate::error::SimError;
use crate::models::MatchCounters;
use crate::simulation::{AggregateResult, MonteCarloRunner, SimulationRequest, REQUEST_SCHEMA_VERSION};

pub mod error_codes {
    pub const INVALID_JSON: &str = "E_INVALID_JSON";
    pub const UNSUPPORTED_SCHEMA: &str = "E_UNSUPPORTED_SCHEMA";
    pub const INVALID_INPUT: &str = "E_INVALID_INPUT";
    pub const SIMULATION_FAILED: &str = "E_SIMULATION_FAILED";
}

fn err_code(code: &str, message: impl std::fmt::Display) -> String {
    format!("{code}: {message}")
}

fn sim_err(err: SimError) -> String {
    if err.is_input_error() {
        err_code(error_codes::INVALID_INPUT, err)
    } else {
        err_code(error_codes::SIMULATION_FAILED, err)
    }
}

fn check_schema(version: u8) -> Result<(), String> {
    if version == REQUEST_SCHEMA_VERSION {
        Ok(())
    } else {
        Err(err_code(
            error_codes::UNSUPPORTED_SCHEMA,
            format!("Unsupported schema version: {version}"),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SimulationResponse {
    pub schema_version: u8,
    pub result: AggregateResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoreRequest {
    #[serde(default = "default_schema_version")]
    pub schema_version: u8,
    pub counters: MatchCounters,
    #[serde(default)]
    pub ruleset: Option<String>,
}

fn default_schema_version() -> u8 {
    REQUEST_SCHEMA_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoreResponse {
    pub schema_version: u8,
    pub points: f64,
    pub ruleset_requested: String,
    pub ruleset: String,
    pub ruleset_fallback: bool,
}

/// Run a simulation request given as JSON, with default settings.
pub fn simulate_json(request_json: &str) -> Result<String, String> {
    simulate_json_with_config(request_json, &SimConfig::default())
}

pub fn simulate_json_with_config(request_json: &str, config: &SimConfig) -> Result<String, String> {
    let request: SimulationRequest = serde_json::from_str(request_json)
        .map_err(|e| err_code(error_codes::INVALID_JSON, format!("Invalid JSON request: {e}")))?;
    check_schema(request.schema_version)?;

    let runner = MonteCarloRunner::new(config.clone()).map_err(sim_err)?;
    let result = runner.run(&request).map_err(sim_err)?;

    let response = SimulationResponse { schema_version: REQUEST_SCHEMA_VERSION, result };
    serde_json::to_string(&response).map_err(|e| sim_err(e.into()))
}

/// Score one counters record given as JSON against a built-in ruleset.
pub fn score_json(request_json: &str) -> Result<String, String> {
    let request: ScoreRequest = serde_json::from_str(request_json)
        .map_err(|e| err_code(error_codes::INVALID_JSON, format!("Invalid JSON request: {e}")))?;
    check_schema(request.schema_version)?;

    let ruleset = builtin_rulesets().resolve(request.ruleset.as_deref());
    let response = ScoreResponse {
        schema_version: REQUEST_SCHEMA_VERSION,
        points: ruleset.table.score(&request.counters),
        ruleset_requested: ruleset.requested,
        ruleset: ruleset.resolved,
        ruleset_fallback: ruleset.fell_back,
    };
    serde_json::to_string(&response).map_err(|e| sim_err(e.into()))
}
