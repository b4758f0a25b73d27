//! Fantasy scoring
//!
//! `score` maps one player's match counters to a point total under a named
//! ruleset. Unknown names fall back to the registry default (`best_of_3` for
//! the built-ins); use [`RulesetRegistry::resolve`] to observe the fallback.

pub mod registry;
pub mod table;

pub use registry::{ResolvedRuleset, RulesetRegistry};
pub use table::ScoringTable;

use crate::data::builtin_rulesets;
use crate::models::MatchCounters;

/// Fantasy points for `counters` under a built-in ruleset.
pub fn score(counters: &MatchCounters, ruleset: &str) -> f64 {
    builtin_rulesets().resolve(Some(ruleset)).table.score(counters)
}

pub fn score_with_table(counters: &MatchCounters, table: &ScoringTable) -> f64 {
    table.score(counters)
}

/// Resolution aggregates are summed at. Registry weights must be whole
/// multiples of one milli-point.
pub const MILLI_POINTS_PER_POINT: f64 = 1000.0;

/// Fantasy points in thousandths, the unit aggregates are summed in.
#[inline]
pub fn to_milli_points(points: f64) -> i64 {
    (points * MILLI_POINTS_PER_POINT).round() as i64
}

#[inline]
pub fn from_milli_points(milli: i64) -> f64 {
    milli as f64 / MILLI_POINTS_PER_POINT
}
