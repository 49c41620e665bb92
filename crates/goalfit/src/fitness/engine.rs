//! Suite Fitness Engine
//!
//! Turns one generation's execution results into a scalar fitness and a
//! coverage count, and shrinks the goal set as goals get satisfied.
//!
//! Removal is two-phase: [`SuiteFitness::evaluate`] only queues satisfied
//! goals, [`SuiteFitness::update_covered_goals`] moves them out of the
//! active set between generations.

use super::violation::{check_round, sanitise_distance, RoundTotals};
use super::{Evaluation, FitnessReport, Observation, StatusTracker, ViolationAction};
use crate::archive::Archive;
use crate::config::FitnessConfig;
use crate::execution::{ExecutionResult, TestCase, TestExecutor, TestSuite};
use crate::goals::{CoverageGoal, GoalFactory, GoalSet};
use crate::result::{GoalfitError, GoalfitResult};
use std::collections::HashSet;
use tracing::{debug, info, trace, warn};

/// Fitness function over one goal criterion
#[derive(Debug, Clone)]
pub struct SuiteFitness<G> {
    criterion: &'static str,
    config: FitnessConfig,
    goals: GoalSet<G>,
    /// First-satisfied order
    pending_removal: Vec<G>,
    /// Same members as `pending_removal`
    pending_index: HashSet<G>,
    status: StatusTracker,
}

impl<G: CoverageGoal> SuiteFitness<G> {
    /// Build from every goal the factory enumerates
    pub fn new<F>(factory: &F, config: FitnessConfig) -> Self
    where
        F: GoalFactory<Goal = G> + ?Sized,
    {
        let goals = GoalSet::from_factory(factory);
        debug!(
            criterion = factory.criterion(),
            total_goals = goals.total_goals(),
            "Initialised suite fitness"
        );
        Self {
            criterion: factory.criterion(),
            config,
            goals,
            pending_removal: Vec::new(),
            pending_index: HashSet::new(),
            status: StatusTracker::new(),
        }
    }

    /// Build and, in archive mode, register every goal as an archive target
    pub fn with_archive<F, A>(factory: &F, config: FitnessConfig, archive: &mut A) -> Self
    where
        F: GoalFactory<Goal = G> + ?Sized,
        A: Archive<G> + ?Sized,
    {
        let fitness = Self::new(factory, config);
        if config.archive_enabled {
            for goal in fitness.goals.active_goals() {
                archive.add_target(goal);
            }
        }
        fitness
    }

    /// Criterion name used for suite annotations
    #[must_use]
    pub const fn criterion(&self) -> &'static str {
        self.criterion
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &FitnessConfig {
        &self.config
    }

    /// Current goal set
    #[must_use]
    pub const fn goals(&self) -> &GoalSet<G> {
        &self.goals
    }

    /// Number of distinct goals
    #[must_use]
    pub const fn total_goals(&self) -> usize {
        self.goals.total_goals()
    }

    /// Goals satisfied but not yet removed
    #[must_use]
    pub fn pending_removals(&self) -> &[G] {
        &self.pending_removal
    }

    /// Best-so-far status
    #[must_use]
    pub const fn status(&self) -> &StatusTracker {
        &self.status
    }

    /// Score one batch of execution results
    ///
    /// A batch containing any timeout or uncaught exception scores
    /// `total_goals` and satisfies nothing. Otherwise every active goal's
    /// minimum distance over all clean results is summed; goals reaching
    /// distance 0 contribute nothing and are queued for removal.
    pub fn evaluate(&mut self, results: &[ExecutionResult]) -> GoalfitResult<Evaluation<G>> {
        let evaluation = self.compute(results)?;
        self.queue_satisfied(&evaluation);
        Ok(evaluation)
    }

    /// Score a batch without touching the removal queue
    fn compute(&self, results: &[ExecutionResult]) -> GoalfitResult<Evaluation<G>> {
        trace!(criterion = self.criterion, results = results.len(), "Calculating test suite fitness");
        let total = self.goals.total_goals();

        if results.iter().any(ExecutionResult::aborts_round) {
            info!(
                criterion = self.criterion,
                "Test suite has timed out, setting fitness to max value {}", total
            );
            let evaluation = Evaluation::short_circuit(total, self.goals.removed_count());
            self.check(&evaluation)?;
            return Ok(evaluation);
        }

        // None once the goal is satisfied this round
        let mut minima: Vec<Option<f64>> = vec![Some(1.0); self.goals.active_count()];
        let mut newly_satisfied = Vec::new();
        let mut covering_tests = Vec::new();
        let mut observations = Vec::new();
        let mut warnings = Vec::new();

        for (result_index, result) in results.iter().enumerate() {
            if !result.is_clean() {
                continue;
            }
            for (slot, goal) in self.goals.active_goals().iter().enumerate() {
                let Some(current) = minima[slot] else {
                    continue;
                };

                let (distance, violation) = sanitise_distance(goal, goal.distance(result));
                if let Some(violation) = violation {
                    warn!(criterion = self.criterion, "{}", violation.description());
                    warnings.push(violation);
                }

                if distance == 0.0 {
                    minima[slot] = None;
                    newly_satisfied.push(goal.clone());
                    covering_tests.push((goal.clone(), result.test));
                } else {
                    minima[slot] = Some(current.min(distance));
                }

                if self.config.archive_enabled {
                    observations.push(Observation {
                        goal: goal.clone(),
                        result_index,
                        test: result.test,
                        distance,
                    });
                }
            }
        }

        let fitness: f64 = minima.iter().flatten().sum();
        let evaluation = Evaluation {
            fitness,
            covered_goals: newly_satisfied.len() + self.goals.removed_count(),
            total_goals: total,
            newly_satisfied,
            covering_tests,
            observations,
            short_circuited: false,
            warnings,
        };
        self.check(&evaluation)?;
        Ok(evaluation)
    }

    fn queue_satisfied(&mut self, evaluation: &Evaluation<G>) {
        for goal in &evaluation.newly_satisfied {
            if self.pending_index.insert(goal.clone()) {
                self.pending_removal.push(goal.clone());
            }
        }
    }

    fn check(&self, evaluation: &Evaluation<G>) -> GoalfitResult<()> {
        if !self.config.check_invariants {
            return Ok(());
        }
        let violations = check_round(RoundTotals {
            fitness: evaluation.fitness,
            covered: evaluation.covered_goals,
            total: evaluation.total_goals,
            coverage: evaluation.coverage(),
            short_circuited: evaluation.short_circuited,
        });
        match violations.into_iter().find(|v| v.action() == ViolationAction::Stop) {
            Some(violation) => Err(violation.into()),
            None => Ok(()),
        }
    }

    /// Score a suite and write the coverage annotations onto it
    ///
    /// Besides the ratio and covered count for this criterion, every test
    /// that covered a goal this round gets that goal recorded.
    ///
    /// A covering test missing from the suite fails with
    /// [`GoalfitError::UnknownTest`] before anything is queued or written.
    pub fn score(&mut self, suite: &mut TestSuite, results: &[ExecutionResult]) -> GoalfitResult<Evaluation<G>> {
        let evaluation = self.compute(results)?;

        let known: HashSet<_> = suite.tests().iter().map(TestCase::id).collect();
        if let Some((_, test)) = evaluation.covering_tests.iter().find(|(_, test)| !known.contains(test)) {
            return Err(GoalfitError::UnknownTest { test: test.as_u64() });
        }
        self.queue_satisfied(&evaluation);

        suite.set_coverage(self.criterion, evaluation.coverage());
        suite.set_covered_goals(self.criterion, evaluation.covered_goals);
        for (goal, test) in &evaluation.covering_tests {
            if let Some(case) = suite.test_mut(*test) {
                case.add_covered_goal(&goal.key());
            }
        }

        let _ = self.status.record(
            self.criterion,
            suite,
            evaluation.covered_goals,
            evaluation.total_goals,
            evaluation.fitness,
            self.config.log_status,
        );
        Ok(evaluation)
    }

    /// Score a suite and return only the fitness
    pub fn get_fitness(&mut self, suite: &mut TestSuite, results: &[ExecutionResult]) -> GoalfitResult<f64> {
        self.score(suite, results).map(|evaluation| evaluation.fitness)
    }

    /// Run the suite through `executor`, then score it
    pub fn run_and_score<E>(&mut self, suite: &mut TestSuite, executor: &mut E) -> GoalfitResult<f64>
    where
        E: TestExecutor + ?Sized,
    {
        let results = executor.execute(suite);
        self.get_fitness(suite, &results)
    }

    /// Move every queued goal from the active to the removed set
    ///
    /// A queued goal that is no longer active is a consistency error.
    pub fn apply_removals(&mut self) -> GoalfitResult<usize> {
        let pending = std::mem::take(&mut self.pending_removal);
        self.pending_index.clear();
        let count = pending.len();
        self.goals.remove_satisfied(&pending)?;
        if count > 0 {
            debug!(
                criterion = self.criterion,
                removed = count,
                remaining = self.goals.active_count(),
                "Removed covered goals"
            );
        }
        Ok(count)
    }

    /// Deferred removal phase between generations
    ///
    /// Returns `false` without touching the goal set unless archival is
    /// enabled.
    pub fn update_covered_goals(&mut self) -> GoalfitResult<bool> {
        if !self.config.archive_enabled {
            return Ok(false);
        }
        let _ = self.apply_removals()?;
        Ok(true)
    }

    /// Serializable snapshot of the current state
    #[must_use]
    pub fn report(&self) -> FitnessReport {
        FitnessReport::new(
            self.criterion,
            &self.goals,
            self.pending_removal.len(),
            &self.status,
        )
    }
}
