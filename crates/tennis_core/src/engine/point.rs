//! Point engine: one serve decision tree per call.

use rand::Rng;

use super::probability::ServeModel;
use crate::models::MatchCounters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointOutcome {
    Ace,
    DoubleFault,
    ServerWin,
    ReturnerWin,
}

impl PointOutcome {
    #[inline]
    pub fn server_won(self) -> bool {
        matches!(self, PointOutcome::Ace | PointOutcome::ServerWin)
    }
}

/// Play one point.
///
/// Draw order is fixed: first-serve-in, then ace/double-fault, then the rally
/// (only when the point reaches one). Aces and double faults are charged to
/// `server_counters`; who won the point is left to the caller.
pub fn simulate_point<R: Rng + ?Sized>(
    rng: &mut R,
    model: &ServeModel,
    server_counters: &mut MatchCounters,
) -> PointOutcome {
    let first_in = rng.gen::<f64>() < model.first_serve_in;

    let rally_win = if first_in {
        if rng.gen::<f64>() < model.ace_given_first_in {
            server_counters.aces += 1;
            return PointOutcome::Ace;
        }
        model.first_serve_rally_win
    } else {
        if rng.gen::<f64>() < model.double_fault_given_second {
            server_counters.double_faults += 1;
            return PointOutcome::DoubleFault;
        }
        model.second_serve_rally_win
    };

    if rng.gen::<f64>() < rally_win {
        PointOutcome::ServerWin
    } else {
        PointOutcome::ReturnerWin
    }
}
