//! Probability calculation utilities for point simulation
//!
//! All functions are pure - they take profile stats as input and return
//! probabilities. This allows easy unit testing without running a match.

use crate::models::player::{PlayerProfile, PlayerSlot};
use crate::models::validation::{AdjustmentKind, ProfileAdjustment, ProfileField};

// ============================================================================
// Conditional serve probabilities
// ============================================================================

/// Ace/double-fault probabilities conditioned on the serve branch already taken.
///
/// Stat sources report aces and double faults per total service point, but the
/// point engine first draws "first serve in?" and only then "ace?" / "double
/// fault?", so the raw rates are divided by the probability of reaching the branch.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalServeProbabilities {
    /// P(ace | first serve in), clamped to `[0, 1]`.
    pub ace_given_first_in: f64,
    /// P(double fault | first serve faulted), clamped to `[0, 1]`.
    pub double_fault_given_second: f64,
    /// Clamps applied while deriving the two values above.
    pub adjustments: Vec<ProfileAdjustment>,
}

impl ConditionalServeProbabilities {
    pub fn derive(profile: &PlayerProfile) -> Self {
        let mut adjustments = Vec::new();

        let ace_given_first_in = conditional(
            ProfileField::AceGivenFirstIn,
            profile.ace_rate,
            profile.first_serve_in_pct,
            &mut adjustments,
        );
        let double_fault_given_second = conditional(
            ProfileField::DoubleFaultGivenSecond,
            profile.double_fault_rate,
            1.0 - profile.first_serve_in_pct,
            &mut adjustments,
        );

        Self { ace_given_first_in, double_fault_given_second, adjustments }
    }
}

/// `numerator / denominator` clamped to `[0, 1]`; 0 when the denominator is not positive.
fn conditional(
    field: ProfileField,
    numerator: f64,
    denominator: f64,
    adjustments: &mut Vec<ProfileAdjustment>,
) -> f64 {
    if denominator <= 0.0 {
        adjustments.push(ProfileAdjustment {
            field,
            kind: AdjustmentKind::UndefinedRatio,
            raw: numerator,
            adjusted: 0.0,
        });
        return 0.0;
    }

    let raw = numerator / denominator;
    if raw > 1.0 {
        adjustments.push(ProfileAdjustment {
            field,
            kind: AdjustmentKind::DerivedAboveOne,
            raw,
            adjusted: 1.0,
        });
    }
    raw.clamp(0.0, 1.0)
}

// ============================================================================
// Rally probabilities
// ============================================================================

/// Chance the server wins a point that reached a rally.
///
/// Averages the server's serve-points-won rate with the returner's
/// return-points-lost rate.
#[inline]
pub fn rally_win_probability(serve_points_won_pct: f64, returner_return_won_pct: f64) -> f64 {
    ((serve_points_won_pct + (1.0 - returner_return_won_pct)) / 2.0).clamp(0.0, 1.0)
}

// ============================================================================
// Serve model
// ============================================================================

/// Everything the point engine needs for one server facing one returner.
///
/// Built once per simulation run from the (immutable) profiles; shared
/// read-only by every trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServeModel {
    pub first_serve_in: f64,
    pub ace_given_first_in: f64,
    pub double_fault_given_second: f64,
    pub first_serve_rally_win: f64,
    pub second_serve_rally_win: f64,
}

impl ServeModel {
    pub fn new(server: &PlayerProfile, returner: &PlayerProfile) -> Self {
        let conditionals = ConditionalServeProbabilities::derive(server);
        Self {
            first_serve_in: server.first_serve_in_pct.clamp(0.0, 1.0),
            ace_given_first_in: conditionals.ace_given_first_in,
            double_fault_given_second: conditionals.double_fault_given_second,
            first_serve_rally_win: rally_win_probability(
                server.first_serve_won_pct,
                returner.return_won_pct,
            ),
            second_serve_rally_win: rally_win_probability(
                server.second_serve_won_pct,
                returner.return_won_pct,
            ),
        }
    }

    /// Probability the server wins a single point, ignoring draw order.
    pub fn point_win_probability(&self) -> f64 {
        let first = self.first_serve_in
            * (self.ace_given_first_in
                + (1.0 - self.ace_given_first_in) * self.first_serve_rally_win);
        let second = (1.0 - self.first_serve_in)
            * (1.0 - self.double_fault_given_second)
            * self.second_serve_rally_win;
        first + second
    }
}

/// Serve models for both players, indexed by the serving slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matchup {
    serve: [ServeModel; 2],
}

impl Matchup {
    pub fn new(player1: &PlayerProfile, player2: &PlayerProfile) -> Self {
        Self { serve: [ServeModel::new(player1, player2), ServeModel::new(player2, player1)] }
    }

    #[inline]
    pub fn serving(&self, server: PlayerSlot) -> &ServeModel {
        &self.serve[server.index()]
    }

    /// False when both players hold (or both drop) every service point with
    /// certainty. Such a tiebreak alternates leads of one point forever.
    pub fn tiebreak_can_finish(&self) -> bool {
        let p1 = self.serve[0].point_win_probability();
        let p2 = self.serve[1].point_win_probability();
        let certain = |p: f64| p <= 0.0 || p >= 1.0;
        !(certain(p1) && certain(p2) && (p1 >= 1.0) == (p2 >= 1.0))
    }
}
