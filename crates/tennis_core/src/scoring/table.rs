use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::MatchCounters;
use crate::scoring::MILLI_POINTS_PER_POINT;

/// Slack for weights like 0.4 whose f64 is not exactly 400 milli-points.
const MILLI_TOLERANCE: f64 = 1e-6;

fn is_whole_milli(weight: f64) -> bool {
    let milli = weight * MILLI_POINTS_PER_POINT;
    (milli - milli.round()).abs() <= MILLI_TOLERANCE
}

fn default_ace_bonus_threshold() -> u32 {
    10
}

/// Weights for one fantasy ruleset.
///
/// Every ruleset shares this shape. Terms a ruleset does not use stay at 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringTable {
    /// Always awarded to both players of a played match.
    pub match_played: f64,
    pub match_won: f64,
    pub set_won: f64,
    pub set_lost: f64,
    pub game_won: f64,
    pub game_lost: f64,
    pub ace: f64,
    pub double_fault: f64,
    /// Per return game won.
    pub break_won: f64,
    /// Per set won while the opponent took at most 3 games.
    pub clean_set: f64,
    /// Once, for winning without dropping a set.
    pub straight_sets: f64,
    /// Once, for a match without double faults.
    pub no_double_fault_bonus: f64,
    /// Once, when `aces >= ace_bonus_threshold`.
    pub ace_bonus: f64,
    #[serde(default = "default_ace_bonus_threshold")]
    pub ace_bonus_threshold: u32,
    /// Fixed award for each player of a walkover; replaces every other term.
    pub walkover: f64,
}

impl Default for ScoringTable {
    fn default() -> Self {
        Self {
            match_played: 0.0,
            match_won: 0.0,
            set_won: 0.0,
            set_lost: 0.0,
            game_won: 0.0,
            game_lost: 0.0,
            ace: 0.0,
            double_fault: 0.0,
            break_won: 0.0,
            clean_set: 0.0,
            straight_sets: 0.0,
            no_double_fault_bonus: 0.0,
            ace_bonus: 0.0,
            ace_bonus_threshold: default_ace_bonus_threshold(),
            walkover: 0.0,
        }
    }
}

impl ScoringTable {
    fn weights(&self) -> [(&'static str, f64); 14] {
        [
            ("match_played", self.match_played),
            ("match_won", self.match_won),
            ("set_won", self.set_won),
            ("set_lost", self.set_lost),
            ("game_won", self.game_won),
            ("game_lost", self.game_lost),
            ("ace", self.ace),
            ("double_fault", self.double_fault),
            ("break_won", self.break_won),
            ("clean_set", self.clean_set),
            ("straight_sets", self.straight_sets),
            ("no_double_fault_bonus", self.no_double_fault_bonus),
            ("ace_bonus", self.ace_bonus),
            ("walkover", self.walkover),
        ]
    }

    /// Names of weights that are NaN or infinite.
    pub(crate) fn non_finite_weights(&self) -> Vec<&'static str> {
        self.weights()
            .into_iter()
            .filter(|(_, w)| !w.is_finite())
            .map(|(name, _)| name)
            .collect()
    }

    /// Names of finite weights that are not whole milli-points.
    ///
    /// Aggregates tally scores in milli-points, so a finer weight would be
    /// rounded away on every trial.
    pub(crate) fn sub_milli_weights(&self) -> Vec<&'static str> {
        self.weights()
            .into_iter()
            .filter(|(_, w)| w.is_finite() && !is_whole_milli(*w))
            .map(|(name, _)| name)
            .collect()
    }

    /// Fantasy points for one player's counters. Pure and deterministic.
    pub fn score(&self, c: &MatchCounters) -> f64 {
        if c.walkover {
            return self.walkover;
        }

        let mut points = self.match_played;
        if c.match_won {
            points += self.match_won;
        }
        points += self.set_won * f64::from(c.sets_won);
        points += self.set_lost * f64::from(c.sets_lost);
        points += self.game_won * f64::from(c.games_won);
        points += self.game_lost * f64::from(c.games_lost);
        points += self.ace * f64::from(c.aces);
        points += self.double_fault * f64::from(c.double_faults);
        points += self.break_won * f64::from(c.breaks);
        points += self.clean_set * f64::from(c.clean_sets);
        if c.match_won && c.straight_sets {
            points += self.straight_sets;
        }

        // Bonuses
        if c.double_faults == 0 {
            points += self.no_double_fault_bonus;
        }
        if c.aces >= self.ace_bonus_threshold {
            points += self.ace_bonus;
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_omitted_weights_default_to_zero() {
        let table: ScoringTable = serde_yaml::from_str("match_played: 10\nace: 1.5\n").unwrap();
        assert_eq!(table.match_played, 10.0);
        assert_eq!(table.ace, 1.5);
        assert_eq!(table.break_won, 0.0);
        assert_eq!(table.ace_bonus_threshold, 10);
    }

    #[test]
    fn test_unknown_weight_is_rejected() {
        assert!(serde_yaml::from_str::<ScoringTable>("match_playd: 10\n").is_err());
    }

    #[test]
    fn test_walkover_replaces_all_terms() {
        let table = ScoringTable { match_played: 30.0, walkover: 1.25, ..ScoringTable::default() };
        assert_eq!(table.score(&MatchCounters::walkover()), 1.25);
    }

    #[test]
    fn test_non_finite_weights_are_listed() {
        let table = ScoringTable { ace: f64::NAN, walkover: f64::INFINITY, ..ScoringTable::default() };
        assert_eq!(table.non_finite_weights(), vec!["ace", "walkover"]);
    }

    #[test]
    fn test_sub_milli_weights_are_listed() {
        let table = ScoringTable {
            match_played: 0.0004,
            ace: 0.4,
            double_fault: -0.001,
            break_won: 0.75,
            clean_set: 1.0005,
            ..ScoringTable::default()
        };
        assert_eq!(table.sub_milli_weights(), vec!["match_played", "clean_set"]);
    }
}
