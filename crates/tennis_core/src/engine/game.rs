//! Game engine: standard service games and 7-point tiebreaks.

use rand::Rng;

use super::error::{EngineError, EngineResult};
use super::point::simulate_point;
use super::probability::Matchup;
use crate::models::{MatchCounters, PlayerSlot};

/// Points after which a tiebreak is treated as stuck. Only reachable when
/// serve probabilities sit a rounding error away from certainty.
pub const MAX_TIEBREAK_POINTS: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    pub winner: PlayerSlot,
    /// Points won, indexed by player slot.
    pub points: [u32; 2],
    pub break_of_serve: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiebreakOutcome {
    pub winner: PlayerSlot,
    pub points: [u32; 2],
}

#[inline]
fn decided(points: [u32; 2], target: u32) -> Option<PlayerSlot> {
    let (a, b) = (points[0], points[1]);
    if a >= target && a >= b + 2 {
        Some(PlayerSlot::One)
    } else if b >= target && b >= a + 2 {
        Some(PlayerSlot::Two)
    } else {
        None
    }
}

/// One service game: first to 4 points with a 2-point lead.
///
/// Records the game for both players and a break for the returner when the
/// server loses.
pub fn play_service_game<R: Rng + ?Sized>(
    rng: &mut R,
    matchup: &Matchup,
    server: PlayerSlot,
    counters: &mut [MatchCounters; 2],
) -> GameOutcome {
    let model = matchup.serving(server);
    let returner = server.opponent();
    let mut points = [0u32; 2];

    let winner = loop {
        let outcome = simulate_point(rng, model, &mut counters[server.index()]);
        let point_winner = if outcome.server_won() { server } else { returner };
        points[point_winner.index()] += 1;

        if let Some(winner) = decided(points, 4) {
            break winner;
        }
    };

    counters[winner.index()].record_game(true);
    counters[winner.opponent().index()].record_game(false);
    let break_of_serve = winner == returner;
    if break_of_serve {
        counters[returner.index()].breaks += 1;
    }

    GameOutcome { winner, points, break_of_serve }
}

/// Server of the k-th tiebreak point (0-indexed): A, B, B, A, A, B, B, ...
#[inline]
pub fn tiebreak_server(first_server: PlayerSlot, point_index: u32) -> PlayerSlot {
    if ((point_index + 1) / 2) % 2 == 0 {
        first_server
    } else {
        first_server.opponent()
    }
}

/// A 6-6 tiebreak: first to 7 points with a 2-point lead.
///
/// The winner is credited one game and one tiebreak. Fails with
/// [`EngineError::StalledTiebreak`] past [`MAX_TIEBREAK_POINTS`].
pub fn play_tiebreak<R: Rng + ?Sized>(
    rng: &mut R,
    matchup: &Matchup,
    first_server: PlayerSlot,
    counters: &mut [MatchCounters; 2],
) -> EngineResult<TiebreakOutcome> {
    let mut points = [0u32; 2];

    for k in 0..MAX_TIEBREAK_POINTS {
        let server = tiebreak_server(first_server, k);
        let outcome = simulate_point(rng, matchup.serving(server), &mut counters[server.index()]);
        let point_winner = if outcome.server_won() { server } else { server.opponent() };
        points[point_winner.index()] += 1;

        if let Some(winner) = decided(points, 7) {
            counters[winner.index()].record_game(true);
            counters[winner.opponent().index()].record_game(false);
            counters[winner.index()].tiebreaks_won += 1;
            return Ok(TiebreakOutcome { winner, points });
        }
    }

    Err(EngineError::StalledTiebreak { points: MAX_TIEBREAK_POINTS, score: points })
}
