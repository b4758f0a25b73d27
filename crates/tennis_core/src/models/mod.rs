pub mod counters;
pub mod match_format;
pub mod match_result;
pub mod player;
pub mod validation;

pub use counters::MatchCounters;
pub use match_format::{MatchFormat, ServeOrder};
pub use match_result::{MatchResult, SetScore, WALKOVER_LABEL};
pub use player::{PlayerProfile, PlayerSlot, DEFAULT_RETURN_WON_PCT};
pub use validation::{
    AdjustmentKind, ProfileAdjustment, ProfileField, ProfileValidator, SanitizedProfile,
};
