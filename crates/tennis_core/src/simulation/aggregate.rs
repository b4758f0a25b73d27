//! Reduction of per-trial results into run-level statistics.
//!
//! Everything is tallied in integers (fantasy points as milli-points), so
//! merging partial tallies is associative and commutative bit-for-bit.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::{MatchFormat, MatchResult, PlayerSlot, ProfileAdjustment};
use crate::scoring::from_milli_points;

/// Percentile reported as a player's fantasy floor.
pub const FLOOR_PERCENTILE: f64 = 0.25;
/// Percentile reported as a player's fantasy ceiling.
pub const CEILING_PERCENTILE: f64 = 0.85;

/// Running sums for one player slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerTally {
    pub wins: u64,
    pub fantasy_milli: i64,
    pub fantasy_milli_sq: i128,
    /// Fantasy score (milli-points) → trials with that score.
    pub histogram: BTreeMap<i64, u64>,
    pub aces: u64,
    pub double_faults: u64,
    pub games_won: u64,
    pub games_lost: u64,
    pub sets_won: u64,
    pub breaks: u64,
    pub clean_sets: u64,
    pub tiebreaks_won: u64,
    pub straight_sets_wins: u64,
}

impl PlayerTally {
    fn record(&mut self, result: &MatchResult, slot: PlayerSlot, fantasy_milli: i64) {
        let c = result.counters(slot);
        if result.winner == Some(slot) {
            self.wins += 1;
        }
        if c.match_won && c.straight_sets {
            self.straight_sets_wins += 1;
        }
        self.fantasy_milli += fantasy_milli;
        self.fantasy_milli_sq += i128::from(fantasy_milli) * i128::from(fantasy_milli);
        *self.histogram.entry(fantasy_milli).or_insert(0) += 1;
        self.aces += u64::from(c.aces);
        self.double_faults += u64::from(c.double_faults);
        self.games_won += u64::from(c.games_won);
        self.games_lost += u64::from(c.games_lost);
        self.sets_won += u64::from(c.sets_won);
        self.breaks += u64::from(c.breaks);
        self.clean_sets += u64::from(c.clean_sets);
        self.tiebreaks_won += u64::from(c.tiebreaks_won);
    }

    fn merge(&mut self, other: PlayerTally) {
        self.wins += other.wins;
        self.fantasy_milli += other.fantasy_milli;
        self.fantasy_milli_sq += other.fantasy_milli_sq;
        for (score, count) in other.histogram {
            *self.histogram.entry(score).or_insert(0) += count;
        }
        self.aces += other.aces;
        self.double_faults += other.double_faults;
        self.games_won += other.games_won;
        self.games_lost += other.games_lost;
        self.sets_won += other.sets_won;
        self.breaks += other.breaks;
        self.clean_sets += other.clean_sets;
        self.tiebreaks_won += other.tiebreaks_won;
        self.straight_sets_wins += other.straight_sets_wins;
    }

    /// Nearest-rank percentile of the fantasy distribution.
    fn percentile(&self, trials: u64, p: f64) -> f64 {
        if trials == 0 {
            return 0.0;
        }
        let rank = ((p * trials as f64).ceil() as u64).clamp(1, trials);
        let mut seen = 0;
        for (&score, &count) in &self.histogram {
            seen += count;
            if seen >= rank {
                return from_milli_points(score);
            }
        }
        0.0
    }

    /// Population standard deviation of the fantasy score.
    fn std_dev(&self, trials: u64) -> f64 {
        if trials == 0 {
            return 0.0;
        }
        let n = i128::from(trials);
        let sum = i128::from(self.fantasy_milli);
        // n^2 * variance, in milli-points squared; exact and never negative.
        let scaled_var = (n * self.fantasy_milli_sq - sum * sum).max(0);
        (scaled_var as f64).sqrt() / trials as f64 / 1000.0
    }

    pub fn summarize(
        &self,
        name: &str,
        trials: u64,
        adjustments: Vec<ProfileAdjustment>,
    ) -> PlayerSummary {
        let avg = |total: u64| if trials == 0 { 0.0 } else { total as f64 / trials as f64 };
        let avg_fantasy_points =
            if trials == 0 { 0.0 } else { from_milli_points(self.fantasy_milli) / trials as f64 };

        PlayerSummary {
            name: name.to_string(),
            wins: self.wins,
            win_rate: avg(self.wins),
            avg_fantasy_points,
            fantasy_std_dev: self.std_dev(trials),
            fantasy_floor: self.percentile(trials, FLOOR_PERCENTILE),
            fantasy_ceiling: self.percentile(trials, CEILING_PERCENTILE),
            avg_aces: avg(self.aces),
            avg_double_faults: avg(self.double_faults),
            avg_games_won: avg(self.games_won),
            avg_games_lost: avg(self.games_lost),
            avg_sets_won: avg(self.sets_won),
            avg_breaks: avg(self.breaks),
            avg_clean_sets: avg(self.clean_sets),
            avg_tiebreaks_won: avg(self.tiebreaks_won),
            straight_sets_rate: avg(self.straight_sets_wins),
            profile_adjusted: !adjustments.is_empty(),
            adjustments,
        }
    }
}

/// Partial reduction over any subset of trials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrialAccumulator {
    pub trials: u64,
    pub walkovers: u64,
    pub players: [PlayerTally; 2],
    /// `"p1_sets-p2_sets"` (or `W/O`) → trials.
    pub set_scores: BTreeMap<String, u64>,
}

impl TrialAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one scored trial in.
    pub fn record(&mut self, result: &MatchResult, fantasy_milli: [i64; 2]) {
        self.trials += 1;
        if result.walkover {
            self.walkovers += 1;
        }
        for slot in PlayerSlot::BOTH {
            self.players[slot.index()].record(result, slot, fantasy_milli[slot.index()]);
        }
        *self.set_scores.entry(result.set_score_label()).or_insert(0) += 1;
    }

    /// Combine two partial reductions. Associative and commutative.
    pub fn merge(mut self, other: TrialAccumulator) -> Self {
        let TrialAccumulator { trials, walkovers, players, set_scores } = other;
        self.trials += trials;
        self.walkovers += walkovers;
        for (mine, theirs) in self.players.iter_mut().zip(players) {
            mine.merge(theirs);
        }
        for (label, count) in set_scores {
            *self.set_scores.entry(label).or_insert(0) += count;
        }
        self
    }
}

/// Per-player output of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlayerSummary {
    pub name: String,
    pub wins: u64,
    pub win_rate: f64,
    pub avg_fantasy_points: f64,
    pub fantasy_std_dev: f64,
    /// 25th percentile fantasy score.
    pub fantasy_floor: f64,
    /// 85th percentile fantasy score.
    pub fantasy_ceiling: f64,
    pub avg_aces: f64,
    pub avg_double_faults: f64,
    pub avg_games_won: f64,
    pub avg_games_lost: f64,
    pub avg_sets_won: f64,
    pub avg_breaks: f64,
    pub avg_clean_sets: f64,
    pub avg_tiebreaks_won: f64,
    pub straight_sets_rate: f64,
    /// Some input value was clamped before simulating.
    pub profile_adjusted: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adjustments: Vec<ProfileAdjustment>,
}

/// Result of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AggregateResult {
    pub player1: PlayerSummary,
    pub player2: PlayerSummary,
    /// Carried through from the request for display.
    pub surface: String,
    pub format: MatchFormat,
    pub trials_requested: u32,
    /// Lower than `trials_requested` only when `cancelled`.
    pub trials_completed: u64,
    pub cancelled: bool,
    pub seed: u64,
    pub ruleset_requested: String,
    pub ruleset: String,
    pub ruleset_fallback: bool,
    pub walkovers: u64,
    pub set_score_distribution: BTreeMap<String, u64>,
}

/// Flat record in the shape downstream match records store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlatSummary {
    pub p1_name: String,
    pub p2_name: String,
    pub surface: String,
    pub simulations: u64,
    pub p1_win_pct: f64,
    pub p1_avg_fantasy_points: f64,
    pub p1_avg_aces: f64,
    pub p1_avg_dfs: f64,
    pub p2_win_pct: f64,
    pub p2_avg_fantasy_points: f64,
    pub p2_avg_aces: f64,
    pub p2_avg_dfs: f64,
}

impl AggregateResult {
    pub fn player(&self, slot: PlayerSlot) -> &PlayerSummary {
        match slot {
            PlayerSlot::One => &self.player1,
            PlayerSlot::Two => &self.player2,
        }
    }

    pub fn to_flat(&self) -> FlatSummary {
        FlatSummary {
            p1_name: self.player1.name.clone(),
            p2_name: self.player2.name.clone(),
            surface: self.surface.clone(),
            simulations: self.trials_completed,
            p1_win_pct: self.player1.win_rate,
            p1_avg_fantasy_points: self.player1.avg_fantasy_points,
            p1_avg_aces: self.player1.avg_aces,
            p1_avg_dfs: self.player1.avg_double_faults,
            p2_win_pct: self.player2.win_rate,
            p2_avg_fantasy_points: self.player2.avg_fantasy_points,
            p2_avg_aces: self.player2.avg_aces,
            p2_avg_dfs: self.player2.avg_double_faults,
        }
    }
}
