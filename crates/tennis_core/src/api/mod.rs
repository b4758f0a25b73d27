pub mod json_api;

pub use json_api::{
    error_codes, score_json, simulate_json, simulate_json_with_config, ScoreRequest, ScoreResponse,
    SimulationResponse,
};
