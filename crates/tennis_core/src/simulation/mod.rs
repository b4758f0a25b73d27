//! Monte Carlo aggregation over independent trials.

pub mod aggregate;
pub mod budget;
pub mod request;
pub mod runner;

pub use aggregate::{AggregateResult, FlatSummary, PlayerSummary, PlayerTally, TrialAccumulator};
pub use budget::{CancelToken, RunBudget, StopReason};
pub use request::{SimulationRequest, REQUEST_SCHEMA_VERSION};
pub use runner::{run, MonteCarloRunner};
