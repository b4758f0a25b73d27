use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Per-player raw counters for one simulated match.
///
/// Created fresh for every trial, owned by that trial, consumed by scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MatchCounters {
    pub aces: u32,
    pub double_faults: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub sets_won: u32,
    pub sets_lost: u32,
    /// Return games won.
    pub breaks: u32,
    /// Sets won while the opponent took at most 3 games.
    pub clean_sets: u32,
    pub tiebreaks_won: u32,
    pub match_won: bool,
    pub straight_sets: bool,
    pub walkover: bool,
}

impl MatchCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters for a match that ended without play.
    pub fn walkover() -> Self {
        Self { walkover: true, ..Self::default() }
    }

    #[inline]
    pub fn record_game(&mut self, won: bool) {
        if won {
            self.games_won += 1;
        } else {
            self.games_lost += 1;
        }
    }

    #[inline]
    pub fn record_set(&mut self, won: bool) {
        if won {
            self.sets_won += 1;
        } else {
            self.sets_lost += 1;
        }
    }

    pub fn total_games(&self) -> u32 {
        self.games_won + self.games_lost
    }
}
