//! Match engine: best-of-N sets over a shared [`Matchup`].

use rand::Rng;

use super::error::EngineResult;
use super::probability::Matchup;
use super::set::play_set;
use crate::models::{MatchCounters, MatchFormat, MatchResult, PlayerProfile, PlayerSlot, ServeOrder};

/// Progress of a single trial. Never observable between trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    NotStarted,
    InProgress { sets_played: u8, sets_won: [u8; 2], server: PlayerSlot },
    Completed(PlayerSlot),
}

/// Immutable per-run match setup; `simulate` may be called from many threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchSimulator {
    matchup: Matchup,
    format: MatchFormat,
    serve_order: ServeOrder,
    walkover: bool,
}

impl MatchSimulator {
    pub fn new(player1: &PlayerProfile, player2: &PlayerProfile, format: MatchFormat) -> Self {
        Self {
            matchup: Matchup::new(player1, player2),
            format,
            serve_order: ServeOrder::default(),
            walkover: false,
        }
    }

    pub fn with_serve_order(mut self, serve_order: ServeOrder) -> Self {
        self.serve_order = serve_order;
        self
    }

    pub fn with_walkover(mut self, walkover: bool) -> Self {
        self.walkover = walkover;
        self
    }

    pub fn format(&self) -> MatchFormat {
        self.format
    }

    pub fn matchup(&self) -> &Matchup {
        &self.matchup
    }

    fn opening_server<R: Rng + ?Sized>(&self, rng: &mut R) -> PlayerSlot {
        match self.serve_order {
            ServeOrder::Player1 => PlayerSlot::One,
            ServeOrder::Player2 => PlayerSlot::Two,
            ServeOrder::CoinToss => {
                if rng.gen::<bool>() {
                    PlayerSlot::One
                } else {
                    PlayerSlot::Two
                }
            }
        }
    }

    /// Run one trial to completion.
    ///
    /// Walkovers return immediately without touching `rng`.
    pub fn simulate<R: Rng + ?Sized>(&self, rng: &mut R) -> EngineResult<MatchResult> {
        if self.walkover {
            return Ok(MatchResult::walkover());
        }

        let sets_to_win = self.format.sets_to_win();
        let mut counters = [MatchCounters::new(), MatchCounters::new()];
        let mut sets = Vec::with_capacity(usize::from(self.format.max_sets()));
        let mut state = MatchState::NotStarted;

        let winner = loop {
            state = match state {
                MatchState::NotStarted => MatchState::InProgress {
                    sets_played: 0,
                    sets_won: [0, 0],
                    server: self.opening_server(rng),
                },
                MatchState::InProgress { sets_played, mut sets_won, server } => {
                    let set = play_set(rng, &self.matchup, server, &mut counters)?;
                    sets.push(set.score);
                    sets_won[set.winner.index()] += 1;

                    if sets_won[set.winner.index()] == sets_to_win {
                        MatchState::Completed(set.winner)
                    } else {
                        MatchState::InProgress {
                            sets_played: sets_played + 1,
                            sets_won,
                            server: set.next_server,
                        }
                    }
                }
                MatchState::Completed(winner) => break winner,
            };
        };

        let loser = winner.opponent();
        counters[winner.index()].match_won = true;
        counters[winner.index()].straight_sets = counters[loser.index()].sets_won == 0;

        Ok(MatchResult { winner: Some(winner), counters, sets, walkover: false })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn p1() -> PlayerProfile {
        PlayerProfile::new("Player One", 0.63, 0.76, 0.54, 0.09, 0.03, 0.38)
    }

    fn p2() -> PlayerProfile {
        PlayerProfile::new("Player Two", 0.59, 0.70, 0.50, 0.05, 0.05, 0.35)
    }

    #[test]
    fn test_matches_satisfy_invariants_in_both_formats() {
        for format in [MatchFormat::BestOf3, MatchFormat::BestOf5] {
            let sim = MatchSimulator::new(&p1(), &p2(), format).with_serve_order(ServeOrder::CoinToss);
            let mut rng = ChaCha8Rng::seed_from_u64(123);
            for _ in 0..500 {
                let result = sim.simulate(&mut rng).unwrap();
                assert_eq!(result.check_invariants(format), Ok(()));
                assert!(result.sets.len() <= usize::from(format.max_sets()));
            }
        }
    }

    #[test]
    fn test_same_seed_same_match() {
        let sim = MatchSimulator::new(&p1(), &p2(), MatchFormat::BestOf5);
        let a = sim.simulate(&mut ChaCha8Rng::seed_from_u64(77)).unwrap();
        let b = sim.simulate(&mut ChaCha8Rng::seed_from_u64(77)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_walkover_short_circuits() {
        let sim = MatchSimulator::new(&p1(), &p2(), MatchFormat::BestOf3).with_walkover(true);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = sim.simulate(&mut rng).unwrap();
        assert!(result.walkover);
        assert_eq!(result.winner, None);
        for c in &result.counters {
            assert_eq!(c.total_games() + c.sets_won + c.aces + c.double_faults, 0);
        }
    }

    #[test]
    fn test_dominant_player_wins_in_straight_sets() {
        let dominant = PlayerProfile::new("Dominant", 1.0, 1.0, 1.0, 0.0, 0.0, 1.0);
        let hapless = PlayerProfile::new("Hapless", 0.5, 0.0, 0.0, 0.0, 0.0, 0.0);
        let sim = MatchSimulator::new(&hapless, &dominant, MatchFormat::BestOf5);
        let result = sim.simulate(&mut ChaCha8Rng::seed_from_u64(9)).unwrap();

        assert_eq!(result.winner, Some(PlayerSlot::Two));
        let c = result.counters(PlayerSlot::Two);
        assert_eq!((c.sets_won, c.games_won, c.games_lost), (3, 18, 0));
        assert!(c.straight_sets && c.match_won);
        assert_eq!(c.clean_sets, 3);
        assert_eq!(result.set_score_label(), "0-3");
    }

    #[test]
    fn test_serve_order_picks_opening_server() {
        let sim = MatchSimulator::new(&p1(), &p2(), MatchFormat::BestOf3);
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        assert_eq!(sim.opening_server(&mut rng), PlayerSlot::One);
        let p2_first = sim.with_serve_order(ServeOrder::Player2);
        assert_eq!(p2_first.opening_server(&mut rng), PlayerSlot::Two);

        let toss = sim.with_serve_order(ServeOrder::CoinToss);
        let ones = (0..200)
            .filter(|_| toss.opening_server(&mut rng) == PlayerSlot::One)
            .count();
        assert!(ones > 50 && ones < 150, "coin toss picked player1 {ones}/200 times");
    }
}
