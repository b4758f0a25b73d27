//! Monte Carlo runner
//!
//! Trial `i` of a run draws from a ChaCha8 stream keyed by `(seed, i)`, so a
//! seeded run produces the same aggregate on any number of threads.

use std::ops::Range;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::aggregate::{AggregateResult, TrialAccumulator};
use super::budget::{CancelToken, RunBudget, StopReason};
use super::request::SimulationRequest;
use crate::config::SimConfig;
use crate::data::builtin_rulesets;
use crate::engine::MatchSimulator;
use crate::error::{Result, SimError};
use crate::models::{MatchFormat, MatchResult, PlayerProfile, PlayerSlot, ProfileValidator};
use crate::scoring::{to_milli_points, RulesetRegistry, ScoringTable};

/// Everything a single trial needs, shared read-only across workers.
struct TrialPlan<'a> {
    simulator: MatchSimulator,
    table: &'a ScoringTable,
    seed: u64,
    verify: bool,
}

impl TrialPlan<'_> {
    fn run_trial(&self, trial: u64) -> Result<(MatchResult, [i64; 2])> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(trial);

        let result = self
            .simulator
            .simulate(&mut rng)
            .map_err(|source| SimError::Engine { trial, source })?;
        if self.verify {
            result
                .check_invariants(self.simulator.format())
                .map_err(|reason| SimError::TrialInvariant { trial, reason })?;
        }

        let fantasy = [
            to_milli_points(self.table.score(result.counters(PlayerSlot::One))),
            to_milli_points(self.table.score(result.counters(PlayerSlot::Two))),
        ];
        Ok((result, fantasy))
    }

    fn run_sequential(&self, trials: Range<u64>) -> Result<TrialAccumulator> {
        let mut acc = TrialAccumulator::new();
        for trial in trials {
            let (result, fantasy) = self.run_trial(trial)?;
            acc.record(&result, fantasy);
        }
        Ok(acc)
    }

    fn run_parallel(&self, trials: Range<u64>) -> Result<TrialAccumulator> {
        trials
            .into_par_iter()
            .try_fold(TrialAccumulator::new, |mut acc, trial| {
                let (result, fantasy) = self.run_trial(trial)?;
                acc.record(&result, fantasy);
                Ok::<_, SimError>(acc)
            })
            .try_reduce(TrialAccumulator::new, |a, b| Ok(a.merge(b)))
    }
}

/// Runs many independent trials of one matchup and reduces them.
#[derive(Debug, Clone)]
pub struct MonteCarloRunner {
    config: SimConfig,
    registry: RulesetRegistry,
    cancel: Option<CancelToken>,
}

impl Default for MonteCarloRunner {
    fn default() -> Self {
        Self {
            config: SimConfig::default(),
            registry: builtin_rulesets().clone(),
            cancel: None,
        }
    }
}

impl MonteCarloRunner {
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, ..Self::default() })
    }

    pub fn with_registry(mut self, registry: RulesetRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn registry(&self) -> &RulesetRegistry {
        &self.registry
    }

    /// Run a request to completion, cancellation or deadline.
    ///
    /// All input checks happen before the first trial. A failed trial aborts
    /// the whole run.
    pub fn run(&self, request: &SimulationRequest) -> Result<AggregateResult> {
        let trials = request.trials.unwrap_or(self.config.default_trials);
        if trials == 0 || trials > self.config.max_trials {
            return Err(SimError::InvalidTrialCount(trials));
        }
        let format = request.resolved_format()?;

        let strict = self.config.strict_profiles;
        let p1 = ProfileValidator::sanitize(PlayerSlot::One, &request.player1, strict)?;
        let p2 = ProfileValidator::sanitize(PlayerSlot::Two, &request.player2, strict)?;

        let simulator = MatchSimulator::new(&p1.profile, &p2.profile, format)
            .with_serve_order(request.first_server)
            .with_walkover(request.walkover);
        if !request.walkover && !simulator.matchup().tiebreak_can_finish() {
            return Err(SimError::UndecidableMatch(format!(
                "{} and {} both hold (or both lose) every service point",
                p1.profile.name, p2.profile.name
            )));
        }

        let ruleset = self.registry.resolve(request.ruleset.as_deref());
        let seed = request.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let parallel = self.config.parallel && trials >= self.config.parallel_threshold;

        info!(
            player1 = %p1.profile.name,
            player2 = %p2.profile.name,
            %format,
            trials,
            seed,
            ruleset = %ruleset.resolved,
            parallel,
            "starting simulation run"
        );

        let plan = TrialPlan {
            simulator,
            table: &ruleset.table,
            seed,
            verify: self.config.verify_invariants,
        };
        let budget = RunBudget::new(self.config.time_budget_ms, self.cancel.clone());

        let (acc, stopped) = match self.config.threads {
            Some(threads) if parallel => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| SimError::ThreadPool(e.to_string()))?;
                pool.install(|| self.run_batches(&plan, u64::from(trials), parallel, &budget))?
            }
            _ => self.run_batches(&plan, u64::from(trials), parallel, &budget)?,
        };

        if let Some(reason) = stopped {
            warn!(
                ?reason,
                completed = acc.trials,
                requested = trials,
                "simulation stopped early"
            );
        }
        info!(
            completed = acc.trials,
            elapsed_ms = budget.elapsed_ms(),
            "simulation run finished"
        );

        Ok(AggregateResult {
            player1: acc.players[0].summarize(&p1.profile.name, acc.trials, p1.adjustments),
            player2: acc.players[1].summarize(&p2.profile.name, acc.trials, p2.adjustments),
            surface: request.surface.clone(),
            format,
            trials_requested: trials,
            trials_completed: acc.trials,
            cancelled: stopped.is_some(),
            seed,
            ruleset_requested: ruleset.requested,
            ruleset: ruleset.resolved,
            ruleset_fallback: ruleset.fell_back,
            walkovers: acc.walkovers,
            set_score_distribution: acc.set_scores,
        })
    }

    fn run_batches(
        &self,
        plan: &TrialPlan<'_>,
        trials: u64,
        parallel: bool,
        budget: &RunBudget,
    ) -> Result<(TrialAccumulator, Option<StopReason>)> {
        let batch_size = u64::from(self.config.batch_size);
        let mut acc = TrialAccumulator::new();
        let mut start = 0;

        while start < trials {
            if let Some(reason) = budget.stop_reason() {
                return Ok((acc, Some(reason)));
            }
            let end = (start + batch_size).min(trials);
            let batch = if parallel {
                plan.run_parallel(start..end)?
            } else {
                plan.run_sequential(start..end)?
            };
            acc = acc.merge(batch);
            debug!(completed = acc.trials, total = trials, "batch finished");
            start = end;
        }

        Ok((acc, None))
    }
}

/// Run `trial_count` trials of a best-of-3 match with default settings.
pub fn run(
    player1: &PlayerProfile,
    player2: &PlayerProfile,
    trial_count: u32,
) -> Result<AggregateResult> {
    let request = SimulationRequest::new(player1.clone(), player2.clone())
        .with_format(MatchFormat::BestOf3)
        .with_trials(trial_count);
    MonteCarloRunner::default().run(&request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServeOrder;

    fn federer() -> PlayerProfile {
        PlayerProfile::new("Roger Federer", 0.63, 0.77, 0.57, 0.11, 0.03, 0.40)
    }

    fn nadal() -> PlayerProfile {
        PlayerProfile::new("Rafael Nadal", 0.68, 0.72, 0.57, 0.04, 0.02, 0.42)
    }

    fn request(trials: u32, seed: u64) -> SimulationRequest {
        SimulationRequest::new(federer(), nadal()).with_trials(trials).with_seed(seed)
    }

    #[test]
    fn test_basic_run_shape() {
        let result = MonteCarloRunner::default().run(&request(400, 42)).unwrap();
        assert_eq!(result.trials_completed, 400);
        assert!(!result.cancelled);
        assert_eq!(result.seed, 42);
        assert!((result.player1.win_rate + result.player2.win_rate - 1.0).abs() < 1e-12);
        assert_eq!(result.player1.wins + result.player2.wins, 400);
        assert!(result.player1.avg_fantasy_points > 30.0);
        assert!(result.player1.fantasy_floor <= result.player1.fantasy_ceiling);
        assert_eq!(result.set_score_distribution.values().sum::<u64>(), 400);
        assert_eq!(result.ruleset, "best_of_3");
        assert!(!result.ruleset_fallback);
        assert_eq!(result.surface, "Hard");
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let runner = MonteCarloRunner::default();
        let a = runner.run(&request(300, 7)).unwrap();
        let b = runner.run(&request(300, 7)).unwrap();
        assert_eq!(a, b);
        let c = runner.run(&request(300, 8)).unwrap();
        assert_ne!(a.set_score_distribution, c.set_score_distribution);
    }

    #[test]
    fn test_parallel_matches_sequential_bit_for_bit() {
        let sequential = MonteCarloRunner::new(SimConfig::sequential()).unwrap();
        let parallel = MonteCarloRunner::new(SimConfig {
            parallel_threshold: 1,
            batch_size: 97,
            threads: Some(4),
            ..SimConfig::default()
        })
        .unwrap();

        let req = request(1_000, 2024).with_first_server(ServeOrder::CoinToss);
        assert_eq!(sequential.run(&req).unwrap(), parallel.run(&req).unwrap());
    }

    #[test]
    fn test_batch_size_does_not_change_result() {
        let small = MonteCarloRunner::new(SimConfig { batch_size: 1, ..SimConfig::sequential() }).unwrap();
        let large = MonteCarloRunner::new(SimConfig::sequential()).unwrap();
        let req = request(200, 5);
        assert_eq!(small.run(&req).unwrap(), large.run(&req).unwrap());
    }

    #[test]
    fn test_dominant_player_wins_almost_always() {
        let dominant = PlayerProfile::new("Dominant", 1.0, 1.0, 1.0, 0.0, 0.0, 1.0);
        let hapless = PlayerProfile::new("Hapless", 0.5, 0.0, 0.0, 0.0, 0.0, 0.0);
        let result = run(&dominant, &hapless, 1_000).unwrap();
        assert!(result.player1.win_rate > 0.99);
        assert_eq!(result.player1.straight_sets_rate, 1.0);
    }

    #[test]
    fn test_free_run_uses_default_settings() {
        let result = run(&federer(), &nadal(), 50).unwrap();
        assert_eq!(result.trials_requested, 50);
        assert_eq!(result.trials_completed, 50);
        assert_eq!(result.format, MatchFormat::BestOf3);
    }

    #[test]
    fn test_walkover_run() {
        let req = request(100, 1).with_walkover(true);
        let result = MonteCarloRunner::default().run(&req).unwrap();
        assert_eq!(result.walkovers, 100);
        for p in [&result.player1, &result.player2] {
            assert_eq!(p.wins, 0);
            assert_eq!(p.avg_aces + p.avg_double_faults + p.avg_games_won + p.avg_sets_won, 0.0);
            assert_eq!(p.avg_fantasy_points, 0.0);
            assert_eq!(p.fantasy_std_dev, 0.0);
        }
    }

    #[test]
    fn test_invalid_trial_counts_fail_fast() {
        let runner = MonteCarloRunner::new(SimConfig { max_trials: 10, default_trials: 5, ..SimConfig::default() })
            .unwrap();
        assert_eq!(runner.run(&request(0, 1)), Err(SimError::InvalidTrialCount(0)));
        assert_eq!(runner.run(&request(11, 1)), Err(SimError::InvalidTrialCount(11)));

        let defaulted = runner.run(&SimulationRequest::new(federer(), nadal()).with_seed(3)).unwrap();
        assert_eq!(defaulted.trials_completed, 5);
    }

    #[test]
    fn test_unknown_ruleset_is_flagged() {
        let req = request(50, 3).with_ruleset("best_of_7");
        let result = MonteCarloRunner::default().run(&req).unwrap();
        assert!(result.ruleset_fallback);
        assert_eq!(result.ruleset_requested, "best_of_7");
        assert_eq!(result.ruleset, "best_of_3");

        let same = MonteCarloRunner::default().run(&request(50, 3)).unwrap();
        assert_eq!(result.player1.avg_fantasy_points, same.player1.avg_fantasy_points);
    }

    #[test]
    fn test_custom_milli_weights_average_exactly() {
        let registry = RulesetRegistry::from_yaml(
            "default: tiny\nrulesets:\n  tiny:\n    match_played: 0.001\n    ace: 0.003\n",
        )
        .unwrap();
        let result = MonteCarloRunner::default()
            .with_registry(registry)
            .run(&request(200, 11))
            .unwrap();

        for p in [&result.player1, &result.player2] {
            let exact = 0.001 + 0.003 * p.avg_aces;
            assert!((p.avg_fantasy_points - exact).abs() < 1e-9, "{} vs {exact}", p.avg_fantasy_points);
        }
    }

    #[test]
    fn test_clamped_profile_is_reported() {
        let mut noisy = federer();
        noisy.first_serve_won_pct = 1.05;
        let req = SimulationRequest::new(noisy.clone(), nadal()).with_trials(20).with_seed(1);
        let result = MonteCarloRunner::default().run(&req).unwrap();
        assert!(result.player1.profile_adjusted);
        assert!(!result.player2.profile_adjusted);

        let strict = MonteCarloRunner::new(SimConfig { strict_profiles: true, ..SimConfig::default() }).unwrap();
        assert!(matches!(strict.run(&req), Err(SimError::InvalidProfile { player: PlayerSlot::One, .. })));
    }

    #[test]
    fn test_pre_cancelled_run_returns_zeroed_partial() {
        let token = CancelToken::new();
        token.cancel();
        let runner = MonteCarloRunner::default().with_cancel_token(token);
        let result = runner.run(&request(500, 9)).unwrap();
        assert!(result.cancelled);
        assert_eq!(result.trials_requested, 500);
        assert_eq!(result.trials_completed, 0);
        assert_eq!(result.player1.win_rate, 0.0);
        assert_eq!(result.player1.avg_fantasy_points, 0.0);
    }

    #[test]
    fn test_deadline_stops_between_batches() {
        let runner = MonteCarloRunner::new(SimConfig {
            time_budget_ms: Some(0),
            ..SimConfig::sequential()
        })
        .unwrap();
        let result = runner.run(&request(100, 9)).unwrap();
        assert!(result.cancelled);
        assert_eq!(result.trials_completed, 0);
    }

    #[test]
    fn test_undecidable_matchup_is_rejected() {
        let perfect = PlayerProfile::new("Perfect", 1.0, 1.0, 1.0, 1.0, 0.0, 0.0);
        let req = SimulationRequest::new(perfect.clone(), perfect).with_trials(10);
        assert!(matches!(MonteCarloRunner::default().run(&req), Err(SimError::UndecidableMatch(_))));
    }

    #[test]
    fn test_unseeded_run_reports_its_seed() {
        let req = SimulationRequest::new(federer(), nadal()).with_trials(30);
        let first = MonteCarloRunner::default().run(&req).unwrap();
        let replay = MonteCarloRunner::default().run(&req.clone().with_seed(first.seed)).unwrap();
        assert_eq!(first.set_score_distribution, replay.set_score_distribution);
        assert_eq!(first.player1.avg_fantasy_points, replay.player1.avg_fantasy_points);
    }
}
