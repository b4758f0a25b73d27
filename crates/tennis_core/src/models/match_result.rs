use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::counters::MatchCounters;
use super::match_format::MatchFormat;
use super::player::PlayerSlot;

/// Label used in set-score distributions for matches that were never played.
pub const WALKOVER_LABEL: &str = "W/O";

/// Final game score of one set, indexed by player slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SetScore {
    pub games: [u8; 2],
    /// Tiebreak point score when the set was decided 7-6.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiebreak: Option<[u32; 2]>,
}

impl SetScore {
    pub fn winner(&self) -> PlayerSlot {
        if self.games[0] > self.games[1] {
            PlayerSlot::One
        } else {
            PlayerSlot::Two
        }
    }

    /// Loser took at most 3 games.
    pub fn is_clean(&self) -> bool {
        self.games[0].min(self.games[1]) <= 3
    }

    /// 6-0..6-4, 7-5, or 7-6 with a finished tiebreak.
    pub fn is_complete(&self) -> bool {
        let hi = self.games[0].max(self.games[1]);
        let lo = self.games[0].min(self.games[1]);
        match (hi, lo, self.tiebreak) {
            (6, 0..=4, None) => true,
            (7, 5, None) => true,
            (7, 6, Some(points)) => {
                let tb_hi = points[0].max(points[1]);
                let tb_lo = points[0].min(points[1]);
                let tb_winner = if points[0] > points[1] { 0 } else { 1 };
                tb_hi >= 7
                    && tb_hi - tb_lo >= 2
                    && (tb_hi == 7 || tb_hi - tb_lo == 2)
                    && self.games[tb_winner] == 7
            }
            _ => false,
        }
    }
}

/// Immutable snapshot of one finished trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MatchResult {
    /// `None` only for walkovers.
    pub winner: Option<PlayerSlot>,
    pub counters: [MatchCounters; 2],
    pub sets: Vec<SetScore>,
    pub walkover: bool,
}

impl MatchResult {
    pub fn walkover() -> Self {
        Self {
            winner: None,
            counters: [MatchCounters::walkover(), MatchCounters::walkover()],
            sets: Vec::new(),
            walkover: true,
        }
    }

    #[inline]
    pub fn counters(&self, slot: PlayerSlot) -> &MatchCounters {
        &self.counters[slot.index()]
    }

    /// Sets won by player1 and player2, e.g. `"2-1"`. Walkovers map to [`WALKOVER_LABEL`].
    pub fn set_score_label(&self) -> String {
        if self.walkover {
            return WALKOVER_LABEL.to_string();
        }
        format!("{}-{}", self.counters[0].sets_won, self.counters[1].sets_won)
    }

    /// Structural checks on a finished match.
    pub fn check_invariants(&self, format: MatchFormat) -> Result<(), String> {
        if self.walkover {
            return if self.winner.is_none() && self.sets.is_empty() {
                Ok(())
            } else {
                Err("walkover must have no winner and no sets".to_string())
            };
        }

        let winner = self.winner.ok_or("completed match has no winner")?;
        let w = self.counters(winner);
        let l = self.counters(winner.opponent());
        let needed = u32::from(format.sets_to_win());

        if w.sets_won != needed || l.sets_won >= needed {
            return Err(format!(
                "set tally {}-{} does not finish a {} match",
                w.sets_won, l.sets_won, format
            ));
        }
        if !w.match_won || l.match_won {
            return Err("match_won flag must be set on the winner only".to_string());
        }
        if self.sets.len() != (w.sets_won + l.sets_won) as usize {
            return Err(format!("{} set scores for {} sets", self.sets.len(), w.sets_won + l.sets_won));
        }
        if let Some(bad) = self.sets.iter().find(|s| !s.is_complete()) {
            return Err(format!("incomplete set {}-{}", bad.games[0], bad.games[1]));
        }

        for slot in PlayerSlot::BOTH {
            let mine = self.counters(slot);
            let theirs = self.counters(slot.opponent());
            if mine.games_won != theirs.games_lost || mine.sets_won != theirs.sets_lost {
                return Err(format!("{slot} counters disagree with opponent"));
            }
            let games: u32 = self.sets.iter().map(|s| u32::from(s.games[slot.index()])).sum();
            if games != mine.games_won {
                return Err(format!("{slot} won {} games but set scores show {}", mine.games_won, games));
            }
            let sets = self.sets.iter().filter(|s| s.winner() == slot).count() as u32;
            if sets != mine.sets_won {
                return Err(format!("{slot} won {} sets but set scores show {}", mine.sets_won, sets));
            }
        }

        if w.straight_sets != (l.sets_won == 0) || l.straight_sets {
            return Err("straight_sets flag inconsistent with set tally".to_string());
        }
        Ok(())
    }
}
