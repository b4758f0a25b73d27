//! Hierarchical match engine: point → game → tiebreak → set → match.
//!
//! Every level takes the trial's own RNG explicitly; nothing here holds global
//! state, so one [`MatchSimulator`] can drive trials on any number of threads.

pub mod error;
pub mod game;
pub mod match_sim;
pub mod point;
pub mod probability;
pub mod set;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{EngineError, EngineResult};
pub use game::{play_service_game, play_tiebreak, tiebreak_server, GameOutcome, TiebreakOutcome};
pub use match_sim::{MatchSimulator, MatchState};
pub use point::{simulate_point, PointOutcome};
pub use probability::{rally_win_probability, ConditionalServeProbabilities, Matchup, ServeModel};
pub use set::{play_set, SetOutcome};
