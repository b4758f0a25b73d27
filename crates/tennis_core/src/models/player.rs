use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Return points won when the upstream source has no return stats.
pub const DEFAULT_RETURN_WON_PCT: f64 = 0.30;

fn default_return_won_pct() -> f64 {
    DEFAULT_RETURN_WON_PCT
}

/// Serve/return statistics for one player on one surface.
///
/// Immutable for the whole simulation run. All rates are fractions in `[0, 1]`:
/// - `first_serve_won_pct` is conditional on the first serve landing in
/// - `second_serve_won_pct` is conditional on reaching a second serve
/// - `ace_rate` and `double_fault_rate` are per total service points
///
/// Field aliases accept the stat-source column names (`serve_1_in_pct`, `ace_pct`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlayerProfile {
    pub name: String,
    #[serde(alias = "serve_1_in_pct")]
    pub first_serve_in_pct: f64,
    #[serde(alias = "serve_1_won_pct")]
    pub first_serve_won_pct: f64,
    #[serde(alias = "serve_2_won_pct")]
    pub second_serve_won_pct: f64,
    #[serde(alias = "ace_pct")]
    pub ace_rate: f64,
    #[serde(alias = "df_pct")]
    pub double_fault_rate: f64,
    #[serde(default = "default_return_won_pct")]
    pub return_won_pct: f64,
}

impl PlayerProfile {
    pub fn new(
        name: impl Into<String>,
        first_serve_in_pct: f64,
        first_serve_won_pct: f64,
        second_serve_won_pct: f64,
        ace_rate: f64,
        double_fault_rate: f64,
        return_won_pct: f64,
    ) -> Self {
        Self {
            name: name.into(),
            first_serve_in_pct,
            first_serve_won_pct,
            second_serve_won_pct,
            ace_rate,
            double_fault_rate,
            return_won_pct,
        }
    }
}

/// Stable per-trial position of a player. Counters are addressed by slot,
/// never by name, so two players sharing a display name stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum PlayerSlot {
    #[serde(rename = "player1")]
    One,
    #[serde(rename = "player2")]
    Two,
}

impl PlayerSlot {
    pub const BOTH: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            PlayerSlot::One => 0,
            PlayerSlot::Two => 1,
        }
    }

    #[inline]
    pub fn opponent(self) -> PlayerSlot {
        match self {
            PlayerSlot::One => PlayerSlot::Two,
            PlayerSlot::Two => PlayerSlot::One,
        }
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerSlot::One => write!(f, "player1"),
            PlayerSlot::Two => write!(f, "player2"),
        }
    }
}
