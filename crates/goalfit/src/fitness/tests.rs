//! Tests for the Suite Fitness Engine
//!
//! Each test states one falsifiable claim about fitness, coverage or goal
//! removal.

#![allow(clippy::float_cmp, clippy::redundant_clone)]

use super::violation::{check_round, sanitise_distance, RoundTotals};
use super::*;
use crate::archive::{Archive, BestCoverageArchive};
use crate::config::FitnessConfig;
use crate::execution::{ExecutionResult, ExecutionTrace, ObservedValue, TestCase, TestExecutor, TestId, TestSuite};
use crate::goals::{
    normalize, CoverageGoal, GoalFactory, MethodDescriptor, OutputGoal, OutputGoalFactory, OutputValue,
    ReturnType,
};
use crate::result::GoalfitError;
use std::fmt;

/// Output goals for `n` boolean methods `Foo.m<i>()`
fn boolean_goals(n: usize) -> OutputGoalFactory {
    OutputGoalFactory::new(
        (0..n)
            .map(|i| MethodDescriptor::new("Foo", &format!("m{}()", i), ReturnType::Boolean))
            .collect(),
    )
}

/// Boolean methods yield two goals each; keep only `True` via a list factory
fn true_goals(n: usize) -> ListFactory<OutputGoal> {
    ListFactory(
        boolean_goals(n)
            .coverage_goals()
            .into_iter()
            .filter(|g| g.value() == OutputValue::True)
            .collect(),
    )
}

#[derive(Debug, Clone)]
struct ListFactory<G>(Vec<G>);

impl<G: CoverageGoal> GoalFactory for ListFactory<G> {
    type Goal = G;

    fn criterion(&self) -> &'static str {
        "scripted"
    }

    fn coverage_goals(&self) -> Vec<G> {
        self.0.clone()
    }
}

/// Goal with a fixed distance regardless of the result
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Scripted {
    name: &'static str,
    bits: u64,
}

impl Scripted {
    fn new(name: &'static str, distance: f64) -> Self {
        Self {
            name,
            bits: distance.to_bits(),
        }
    }
}

impl CoverageGoal for Scripted {
    fn distance(&self, _result: &ExecutionResult) -> f64 {
        f64::from_bits(self.bits)
    }
}

impl fmt::Display for Scripted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn archive_config() -> FitnessConfig {
    FitnessConfig::builder()
        .archive_enabled(true)
        .log_status(false)
        .build()
}

fn plain_config() -> FitnessConfig {
    FitnessConfig::builder().log_status(false).build()
}

fn clean(test: u64) -> ExecutionResult {
    ExecutionResult::new(TestId::new(test))
}

/// A result in which `Foo.m<i>()` returned `true`
fn returning_true(test: u64, method: usize) -> ExecutionResult {
    let mut trace = ExecutionTrace::new();
    trace.record_return("Foo", &format!("m{}()", method), ObservedValue::Bool(true));
    clean(test).with_trace(trace)
}

fn suite_of(ids: &[u64]) -> TestSuite {
    TestSuite::from_tests(ids.iter().map(|id| TestCase::new(TestId::new(*id), 3)).collect())
}

mod evaluate_tests {
    use super::*;

    /// Nothing observed: every goal contributes the sentinel 1.0
    #[test]
    fn test_all_unobserved_scores_total() {
        let mut fitness = SuiteFitness::new(&true_goals(4), archive_config());
        let evaluation = fitness.evaluate(&[clean(1), clean(2)]).unwrap();
        assert_eq!(evaluation.fitness, 4.0);
        assert_eq!(evaluation.covered_goals, 0);
        assert_eq!(evaluation.coverage(), 0.0);
        assert!(evaluation.newly_satisfied.is_empty());
    }

    /// One goal driven to 0: fitness N-1, coverage 1, then exactly that goal is removed
    #[test]
    fn test_one_goal_satisfied() {
        let factory = true_goals(4);
        let target = factory.0[2].clone();
        let mut fitness = SuiteFitness::new(&factory, archive_config());

        let evaluation = fitness.evaluate(&[clean(1), returning_true(2, 2)]).unwrap();
        assert_eq!(evaluation.fitness, 3.0);
        assert_eq!(evaluation.covered_goals, 1);
        assert_eq!(evaluation.newly_satisfied, vec![target.clone()]);
        assert_eq!(evaluation.covering_tests, vec![(target.clone(), TestId::new(2))]);
        assert_eq!(fitness.pending_removals(), &[target.clone()]);
        // not removed until the deferred phase
        assert!(fitness.goals().is_active(&target));

        assert!(fitness.update_covered_goals().unwrap());
        assert_eq!(fitness.goals().removed_goals(), &[target.clone()]);
        assert_eq!(fitness.goals().active_count(), 3);
        assert!(fitness.pending_removals().is_empty());
    }

    /// A goal satisfied this round contributes 0, not its earlier minimum
    #[test]
    fn test_satisfied_goal_contributes_zero() {
        let goals = ListFactory(vec![Scripted::new("half", 0.5)]);
        let mut fitness = SuiteFitness::new(&goals, plain_config());
        let evaluation = fitness.evaluate(&[clean(1)]).unwrap();
        assert_eq!(evaluation.fitness, 0.5);

        let factory = boolean_goals(1);
        let zero = OutputGoal::new("Foo", "m0()", ReturnType::Boolean, OutputValue::True);
        assert!(factory.coverage_goals().contains(&zero));
        let mut fitness = SuiteFitness::new(&ListFactory(vec![zero]), plain_config());
        let mut trace = ExecutionTrace::new();
        trace.record_return("Foo", "m0()", ObservedValue::Bool(false));
        let miss = clean(1).with_trace(trace);
        let evaluation = fitness.evaluate(&[miss, returning_true(2, 0)]).unwrap();
        assert_eq!(evaluation.fitness, 0.0);
        assert_eq!(evaluation.covered_goals, 1);
        assert!(evaluation.is_complete());
    }

    /// The running minimum is taken over all clean results
    #[test]
    fn test_minimum_over_results() {
        let goal = OutputGoal::new("Foo", "n()", ReturnType::Integral, OutputValue::Zero);
        let mut fitness = SuiteFitness::new(&ListFactory(vec![goal]), plain_config());
        let with = |test, v| {
            let mut trace = ExecutionTrace::new();
            trace.record_return("Foo", "n()", ObservedValue::Int(v));
            clean(test).with_trace(trace)
        };
        let evaluation = fitness.evaluate(&[with(1, 3), with(2, -1), with(3, 7)]).unwrap();
        assert_eq!(evaluation.fitness, normalize(1.0));
    }

    /// Any timeout forces fitness = total goals and satisfies nothing
    #[test]
    fn test_timeout_short_circuits() {
        let mut fitness = SuiteFitness::new(&true_goals(3), archive_config());
        let results = [returning_true(1, 0), clean(2).with_timeout(), returning_true(3, 1)];
        let evaluation = fitness.evaluate(&results).unwrap();
        assert!(evaluation.short_circuited);
        assert_eq!(evaluation.fitness, 3.0);
        assert_eq!(evaluation.covered_goals, 0);
        assert!(evaluation.newly_satisfied.is_empty());
        assert!(evaluation.observations.is_empty());
        assert!(fitness.pending_removals().is_empty());
    }

    #[test]
    fn test_uncaught_exception_short_circuits() {
        let mut fitness = SuiteFitness::new(&true_goals(2), archive_config());
        let results = [returning_true(1, 0), clean(2).with_test_exception()];
        let evaluation = fitness.evaluate(&results).unwrap();
        assert_eq!(evaluation.fitness, 2.0);
        assert!(evaluation.newly_satisfied.is_empty());
    }

    /// A crashed round still reports goals removed in earlier rounds
    #[test]
    fn test_short_circuit_keeps_removed_coverage() {
        let mut fitness = SuiteFitness::new(&true_goals(2), archive_config());
        fitness.evaluate(&[returning_true(1, 0)]).unwrap();
        fitness.update_covered_goals().unwrap();

        let evaluation = fitness.evaluate(&[clean(2).with_timeout()]).unwrap();
        assert_eq!(evaluation.fitness, 2.0);
        assert_eq!(evaluation.covered_goals, 1);
    }

    /// Even with every goal removed, a crashed round scores the penalty
    #[test]
    fn test_short_circuit_after_full_coverage_is_not_a_violation() {
        let mut fitness = SuiteFitness::new(&true_goals(1), archive_config());
        fitness.evaluate(&[returning_true(1, 0)]).unwrap();
        fitness.update_covered_goals().unwrap();
        let evaluation = fitness.evaluate(&[clean(2).with_timeout()]).unwrap();
        assert_eq!(evaluation.fitness, 1.0);
        assert_eq!(evaluation.covered_goals, 1);
    }

    /// Results with thrown exceptions are skipped without aborting the round
    #[test]
    fn test_thrown_exception_result_is_skipped() {
        let mut fitness = SuiteFitness::new(&true_goals(2), archive_config());
        let results = [
            returning_true(1, 0).with_thrown_exception("IllegalStateException"),
            returning_true(2, 1),
        ];
        let evaluation = fitness.evaluate(&results).unwrap();
        assert!(!evaluation.short_circuited);
        assert_eq!(evaluation.fitness, 1.0);
        assert_eq!(evaluation.newly_satisfied.len(), 1);
        assert_eq!(evaluation.covering_tests[0].1, TestId::new(2));
    }

    /// Empty batch twice gives the same answer
    #[test]
    fn test_empty_batch_is_idempotent() {
        let mut fitness = SuiteFitness::new(&true_goals(3), archive_config());
        fitness.evaluate(&[returning_true(1, 1)]).unwrap();
        fitness.update_covered_goals().unwrap();

        let first = fitness.evaluate(&[]).unwrap();
        let second = fitness.evaluate(&[]).unwrap();
        assert_eq!(first.fitness, 2.0);
        assert_eq!(first.covered_goals, 1);
        assert_eq!(first, second);
    }

    /// Coverage never decreases once goals are removed
    #[test]
    fn test_coverage_is_monotonic() {
        let mut fitness = SuiteFitness::new(&true_goals(3), archive_config());
        let rounds: Vec<Vec<ExecutionResult>> = vec![
            vec![returning_true(1, 0)],
            vec![clean(2)],
            vec![returning_true(3, 2)],
            vec![clean(4).with_timeout()],
            vec![],
        ];
        let mut last = 0;
        for batch in &rounds {
            let evaluation = fitness.evaluate(batch).unwrap();
            assert!(evaluation.covered_goals >= last);
            last = evaluation.covered_goals;
            fitness.update_covered_goals().unwrap();
        }
        assert_eq!(last, 2);
        assert_eq!(fitness.goals().removed_count(), 2);
    }

    /// No goals: coverage 1.0 and fitness 0.0, crash or not
    #[test]
    fn test_empty_goal_set() {
        let mut fitness: SuiteFitness<OutputGoal> = SuiteFitness::new(&boolean_goals(0), archive_config());
        let evaluation = fitness.evaluate(&[clean(1)]).unwrap();
        assert_eq!(evaluation.fitness, 0.0);
        assert_eq!(evaluation.coverage(), 1.0);
        let evaluation = fitness.evaluate(&[clean(1).with_timeout()]).unwrap();
        assert_eq!(evaluation.fitness, 0.0);
        assert_eq!(evaluation.coverage(), 1.0);
    }

    /// The same goal satisfied in two rounds is queued once
    #[test]
    fn test_pending_removal_has_set_semantics() {
        let mut fitness = SuiteFitness::new(&true_goals(2), archive_config());
        fitness.evaluate(&[returning_true(1, 0)]).unwrap();
        fitness.evaluate(&[returning_true(2, 0), returning_true(3, 0)]).unwrap();
        assert_eq!(fitness.pending_removals().len(), 1);
        assert_eq!(fitness.apply_removals().unwrap(), 1);
    }

    /// Repeated rounds over many goals queue each one once and remove them in one pass
    #[test]
    fn test_many_goals_queue_and_remove_once() {
        let mut fitness = SuiteFitness::new(&boolean_goals(500), plain_config());
        let results: Vec<ExecutionResult> = (0..500).map(|m| returning_true(1, m)).collect();
        for _ in 0..3 {
            let evaluation = fitness.evaluate(&results).unwrap();
            assert_eq!(evaluation.newly_satisfied.len(), 500);
        }
        assert_eq!(fitness.pending_removals().len(), 500);
        assert_eq!(fitness.pending_removals()[0].method_signature(), "m0()");

        assert_eq!(fitness.apply_removals().unwrap(), 500);
        assert!(fitness.pending_removals().is_empty());
        assert_eq!(fitness.goals().active_count(), 500);
        assert!(fitness
            .goals()
            .active_goals()
            .iter()
            .all(|g| g.value() == OutputValue::False));

        // the queue is usable again after a removal pass
        fitness.evaluate(&results).unwrap();
        assert!(fitness.pending_removals().is_empty());
    }

    /// Once satisfied, a goal is not re-examined by later results in the round
    #[test]
    fn test_satisfied_goal_stops_being_tracked() {
        let mut fitness = SuiteFitness::new(&true_goals(1), archive_config());
        let evaluation = fitness
            .evaluate(&[returning_true(1, 0), returning_true(2, 0), clean(3)])
            .unwrap();
        assert_eq!(evaluation.covering_tests, vec![(true_goals(1).0[0].clone(), TestId::new(1))]);
        assert_eq!(evaluation.observations.len(), 1);
    }
}

mod archive_mode_tests {
    use super::*;

    /// Without archival, nothing is observed and nothing is removed
    #[test]
    fn test_disabled_archive() {
        let mut fitness = SuiteFitness::new(&true_goals(2), plain_config());
        let evaluation = fitness.evaluate(&[returning_true(1, 0)]).unwrap();
        assert!(evaluation.observations.is_empty());
        assert_eq!(evaluation.covered_goals, 1);
        assert!(!fitness.update_covered_goals().unwrap());
        assert_eq!(fitness.goals().active_count(), 2);

        // the goal is still active, so the next round can satisfy it again
        let evaluation = fitness.evaluate(&[returning_true(2, 0)]).unwrap();
        assert_eq!(evaluation.covered_goals, 1);
    }

    /// Every (goal, result) pair is observed, not just zero distances
    #[test]
    fn test_observations_cover_all_pairs() {
        let mut fitness = SuiteFitness::new(&true_goals(3), archive_config());
        let results = [clean(1), returning_true(2, 1)];
        let evaluation = fitness.evaluate(&results).unwrap();
        assert_eq!(evaluation.observations.len(), 6);
        let zeros: Vec<_> = evaluation
            .observations
            .iter()
            .filter(|o| o.distance == 0.0)
            .collect();
        assert_eq!(zeros.len(), 1);
        assert_eq!(zeros[0].result_index, 1);
        assert_eq!(zeros[0].test, TestId::new(2));
    }

    #[test]
    fn test_with_archive_registers_targets() {
        let mut archive = BestCoverageArchive::new();
        let _ = SuiteFitness::with_archive(&true_goals(3), archive_config(), &mut archive);
        assert_eq!(archive.target_count(), 3);

        let mut untouched = BestCoverageArchive::new();
        let _ = SuiteFitness::with_archive(&true_goals(3), plain_config(), &mut untouched);
        assert_eq!(untouched.target_count(), 0);
    }

    #[test]
    fn test_deliver_observations() {
        let factory = true_goals(2);
        let mut archive = BestCoverageArchive::new();
        let mut fitness = SuiteFitness::with_archive(&factory, archive_config(), &mut archive);
        let results = [clean(1), returning_true(2, 0)];
        let evaluation = fitness.evaluate(&results).unwrap();
        deliver_observations(&evaluation, &results, &mut archive);

        assert!(archive.is_covered(&factory.0[0]));
        assert_eq!(archive.best_test(&factory.0[0]), Some(TestId::new(2)));
        assert!(!archive.is_covered(&factory.0[1]));
        assert_eq!(archive.summary(), "1/2 targets covered");
    }

    /// Observations pointing outside the batch are dropped
    #[test]
    fn test_deliver_observations_ignores_foreign_batch() {
        let factory = true_goals(1);
        let mut archive = BestCoverageArchive::new();
        let mut fitness = SuiteFitness::with_archive(&factory, archive_config(), &mut archive);
        let evaluation = fitness.evaluate(&[clean(1), returning_true(2, 0)]).unwrap();
        deliver_observations(&evaluation, &[], &mut archive);
        assert!(archive.covered_targets().is_empty());
    }

    #[test]
    fn test_archived_suite_fitness() {
        let factory = true_goals(3);
        let mut archived = ArchivedSuiteFitness::new(&factory, archive_config(), BestCoverageArchive::new());
        assert_eq!(archived.archive().target_count(), 3);

        let mut suite = suite_of(&[1, 2]);
        let score = archived
            .get_fitness(&mut suite, &[returning_true(1, 0), returning_true(2, 2)])
            .unwrap();
        assert_eq!(score, 1.0);
        assert_eq!(archived.archive().covered_targets().len(), 2);

        assert!(archived.update_covered_goals().unwrap());
        assert_eq!(archived.fitness().goals().removed_count(), 2);

        let (fitness, archive) = archived.into_parts();
        assert_eq!(fitness.goals().active_count(), 1);
        assert_eq!(archive.target_count(), 3);
    }
}

mod suite_tests {
    use super::*;

    #[test]
    fn test_score_annotates_suite() {
        let factory = true_goals(4);
        let mut fitness = SuiteFitness::new(&factory, archive_config());
        let mut suite = suite_of(&[1, 2]);
        let value = fitness
            .get_fitness(&mut suite, &[clean(1), returning_true(2, 3)])
            .unwrap();
        assert_eq!(value, 3.0);
        assert_eq!(suite.coverage("scripted"), Some(0.25));
        assert_eq!(suite.covered_goals("scripted"), Some(1));
        assert!(suite.tests()[0].covered_goals().is_empty());
        assert!(suite.tests()[1].covered_goals().contains(&factory.0[3].key()));
    }

    #[test]
    fn test_empty_goal_set_annotates_full_coverage() {
        let mut fitness: SuiteFitness<OutputGoal> = SuiteFitness::new(&boolean_goals(0), plain_config());
        let mut suite = suite_of(&[1]);
        assert_eq!(fitness.get_fitness(&mut suite, &[clean(1)]).unwrap(), 0.0);
        assert_eq!(suite.coverage("output"), Some(1.0));
        assert_eq!(suite.covered_goals("output"), Some(0));
    }

    /// A covering result for a test the suite doesn't have is a consistency error
    #[test]
    fn test_unknown_covering_test() {
        let mut fitness = SuiteFitness::new(&true_goals(1), plain_config());
        let mut suite = suite_of(&[1]);
        let err = fitness
            .get_fitness(&mut suite, &[returning_true(9, 0)])
            .unwrap_err();
        assert!(matches!(err, GoalfitError::UnknownTest { test: 9 }));
    }

    /// A failed score leaves neither the suite nor the removal queue touched
    #[test]
    fn test_unknown_covering_test_changes_nothing() {
        let mut fitness = SuiteFitness::new(&true_goals(1), archive_config());
        let mut suite = suite_of(&[1]);
        let err = fitness.score(&mut suite, &[returning_true(99, 0)]).unwrap_err();
        assert!(matches!(err, GoalfitError::UnknownTest { test: 99 }));

        assert_eq!(suite.coverage("scripted"), None);
        assert_eq!(suite.covered_goals("scripted"), None);
        assert!(suite.tests()[0].covered_goals().is_empty());
        assert!(fitness.pending_removals().is_empty());
        assert_eq!(fitness.status().best_fitness(), None);

        // the goal is still there to be covered by a known test
        assert!(fitness.update_covered_goals().unwrap());
        assert_eq!(fitness.goals().active_count(), 1);
        let evaluation = fitness.score(&mut suite, &[returning_true(1, 0)]).unwrap();
        assert_eq!(evaluation.covered_goals, 1);
        assert_eq!(fitness.pending_removals().len(), 1);
    }

    struct CannedExecutor {
        calls: usize,
    }

    impl TestExecutor for CannedExecutor {
        fn execute(&mut self, suite: &TestSuite) -> Vec<ExecutionResult> {
            self.calls += 1;
            suite
                .tests()
                .iter()
                .map(|t| returning_true(t.id().as_u64(), t.id().as_u64() as usize))
                .collect()
        }
    }

    #[test]
    fn test_run_and_score() {
        let mut fitness = SuiteFitness::new(&true_goals(3), plain_config());
        let mut executor = CannedExecutor { calls: 0 };
        let mut suite = suite_of(&[0, 1]);
        let value = fitness.run_and_score(&mut suite, &mut executor).unwrap();
        assert_eq!(executor.calls, 1);
        assert_eq!(value, 1.0);
        assert_eq!(suite.covered_goals("scripted"), Some(2));
    }

    #[test]
    fn test_status_tracks_best() {
        let mut fitness = SuiteFitness::new(&true_goals(3), plain_config());
        let mut suite = suite_of(&[1, 2]);
        assert_eq!(fitness.status().best_fitness(), None);

        fitness.get_fitness(&mut suite, &[clean(1)]).unwrap();
        assert_eq!(fitness.status().best_fitness(), Some(3.0));
        assert_eq!(fitness.status().max_covered_goals(), 0);

        fitness.get_fitness(&mut suite, &[returning_true(2, 1)]).unwrap();
        assert_eq!(fitness.status().best_fitness(), Some(2.0));
        assert_eq!(fitness.status().max_covered_goals(), 1);

        // worse suite leaves the best untouched
        fitness.get_fitness(&mut suite, &[clean(1).with_timeout()]).unwrap();
        assert_eq!(fitness.status().best_fitness(), Some(2.0));
    }

    #[test]
    fn test_status_update_flags() {
        let mut status = StatusTracker::new();
        let suite = suite_of(&[1]);
        let update = status.record("output", &suite, 1, 4, 3.0, true);
        assert!(update.coverage_improved && update.fitness_improved);
        let update = status.record("output", &suite, 1, 4, 3.5, true);
        assert_eq!(update, StatusUpdate::default());
    }

    #[test]
    fn test_report() {
        let mut fitness = SuiteFitness::new(&true_goals(4), archive_config());
        let mut suite = suite_of(&[1]);
        fitness.get_fitness(&mut suite, &[returning_true(1, 0)]).unwrap();
        let before = fitness.report();
        assert_eq!(before.pending_removals, 1);
        assert_eq!(before.removed_goals, 0);

        fitness.update_covered_goals().unwrap();
        let report = fitness.report();
        assert_eq!(report.criterion, "scripted");
        assert_eq!(report.total_goals, 4);
        assert_eq!(report.active_goals, 3);
        assert_eq!(report.removed_goals, 1);
        assert_eq!(report.coverage_percent, 25.0);
        assert_eq!(report.best_fitness, Some(3.0));

        let json = report.to_json().unwrap();
        let back: FitnessReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}

mod violation_tests {
    use super::*;

    fn totals(fitness: f64, covered: usize, total: usize) -> RoundTotals {
        RoundTotals {
            fitness,
            covered,
            total,
            coverage: if total == 0 { 1.0 } else { covered as f64 / total as f64 },
            short_circuited: false,
        }
    }

    #[test]
    fn test_consistent_round_has_no_violations() {
        assert!(check_round(totals(2.5, 1, 4)).is_empty());
        assert!(check_round(totals(0.0, 4, 4)).is_empty());
        assert!(check_round(totals(0.0, 0, 0)).is_empty());
    }

    #[test]
    fn test_covered_exceeds_total() {
        let violations = check_round(totals(0.0, 5, 4));
        assert!(violations.contains(&FitnessViolation::CoveredExceedsTotal { covered: 5, total: 4 }));
    }

    #[test]
    fn test_negative_and_nan_fitness() {
        assert!(matches!(
            check_round(totals(-1.0, 0, 4))[0],
            FitnessViolation::InvalidFitness { .. }
        ));
        assert!(matches!(
            check_round(totals(f64::NAN, 0, 4))[0],
            FitnessViolation::InvalidFitness { .. }
        ));
    }

    #[test]
    fn test_zero_fitness_with_uncovered_goals() {
        let violations = check_round(totals(0.0, 3, 4));
        assert_eq!(
            violations,
            vec![FitnessViolation::ZeroFitnessWithUncoveredGoals { covered: 3, total: 4 }]
        );
    }

    #[test]
    fn test_residual_fitness_only_outside_short_circuit() {
        let violations = check_round(totals(1.0, 4, 4));
        assert_eq!(violations, vec![FitnessViolation::ResidualFitness { fitness: 1.0 }]);

        let mut crashed = totals(4.0, 4, 4);
        crashed.short_circuited = true;
        assert!(check_round(crashed).is_empty());
    }

    #[test]
    fn test_coverage_out_of_range() {
        let mut t = totals(1.0, 1, 4);
        t.coverage = 1.5;
        assert_eq!(
            check_round(t),
            vec![FitnessViolation::CoverageOutOfRange { coverage: 1.5 }]
        );
    }

    #[test]
    fn test_actions() {
        assert_eq!(
            FitnessViolation::DistanceOutOfRange { goal: "g".into(), distance: 2.0 }.action(),
            ViolationAction::LogAndContinue
        );
        assert_eq!(
            FitnessViolation::InvalidFitness { fitness: -1.0 }.action(),
            ViolationAction::Stop
        );
    }

    #[test]
    fn test_violation_into_error() {
        let err: GoalfitError = FitnessViolation::CoveredExceedsTotal { covered: 3, total: 2 }.into();
        assert!(matches!(err, GoalfitError::InvariantViolation { .. }));
        assert!(err.to_string().contains("covered 3 vs total goals 2"));
    }

    #[test]
    fn test_sanitise_distance() {
        assert_eq!(sanitise_distance(&"g", 0.25), (0.25, None));
        let (d, v) = sanitise_distance(&"g", 3.0);
        assert_eq!(d, 1.0);
        assert!(v.is_some());
        let (d, _) = sanitise_distance(&"g", f64::NAN);
        assert_eq!(d, 1.0);
        let (d, v) = sanitise_distance(&"g", -0.5);
        assert_eq!(d, 1.0);
        assert!(v.is_some());
    }

    /// A negative distance is reported but never satisfies the goal
    #[test]
    fn test_negative_distance_does_not_satisfy() {
        let goals = ListFactory(vec![Scripted::new("negative", -0.5)]);
        let mut fitness = SuiteFitness::new(&goals, archive_config());
        let evaluation = fitness.evaluate(&[clean(1)]).unwrap();

        assert!(evaluation.newly_satisfied.is_empty());
        assert_eq!(evaluation.covered_goals, 0);
        assert_eq!(evaluation.fitness, 1.0);
        assert_eq!(evaluation.warnings.len(), 1);
        assert!(fitness.pending_removals().is_empty());
        fitness.update_covered_goals().unwrap();
        assert_eq!(fitness.goals().active_count(), 1);
    }

    /// Wild goal distances are replaced, reported, and never break the round
    #[test]
    fn test_wild_distances_are_sanitised_in_evaluation() {
        let goals = ListFactory(vec![
            Scripted::new("huge", 7.5),
            Scripted::new("nan", f64::NAN),
            Scripted::new("fine", 0.25),
        ]);
        let mut fitness = SuiteFitness::new(&goals, plain_config());
        let evaluation = fitness.evaluate(&[clean(1)]).unwrap();
        assert_eq!(evaluation.fitness, 2.25);
        assert_eq!(evaluation.warnings.len(), 2);
    }

    /// With checks disabled, evaluation never fails on invariants
    #[test]
    fn test_checks_can_be_disabled() {
        let config = FitnessConfig::builder()
            .check_invariants(false)
            .log_status(false)
            .build();
        let mut fitness = SuiteFitness::new(&true_goals(2), config);
        assert!(fitness.evaluate(&[clean(1)]).is_ok());
    }
}

mod concurrency_tests {
    use super::*;
    use crate::goals::{BranchGoal, BranchGoalFactory};
    use crate::registry::{GoalRegistry, Instruction};
    use std::thread;

    /// Two fitness functions score the same immutable batch in parallel
    #[test]
    fn test_parallel_engines_share_one_batch() {
        let mut registry = GoalRegistry::new();
        let branch = registry
            .register(&Instruction::conditional_jump("Foo", "m0()", 0, 1), &mut ())
            .unwrap();
        let registry = registry.into_shared();

        let mut output = SuiteFitness::new(&true_goals(2), archive_config());
        let mut branches: SuiteFitness<BranchGoal> =
            SuiteFitness::new(&BranchGoalFactory::new(&registry), archive_config());

        let mut trace = ExecutionTrace::new();
        trace.record_return("Foo", "m0()", ObservedValue::Bool(true));
        trace.record_branch(branch, 0.0, 2.0);
        let batch = vec![clean(1).with_trace(trace)];

        let (out, br) = thread::scope(|s| {
            let a = s.spawn(|| output.evaluate(&batch));
            let b = s.spawn(|| branches.evaluate(&batch));
            (a.join().unwrap().unwrap(), b.join().unwrap().unwrap())
        });

        assert_eq!(out.fitness, 1.0);
        assert_eq!(br.covered_goals, 1);
        assert_eq!(br.fitness, normalize(2.0));
    }
}

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn integral_goals(n: usize) -> ListFactory<OutputGoal> {
        ListFactory(
            (0..n)
                .map(|i| OutputGoal::new("P", &format!("g{}()", i), ReturnType::Integral, OutputValue::Zero))
                .collect(),
        )
    }

    fn batch(matrix: &[Vec<i64>]) -> Vec<ExecutionResult> {
        matrix
            .iter()
            .enumerate()
            .map(|(t, row)| {
                let mut trace = ExecutionTrace::new();
                for (g, v) in row.iter().enumerate() {
                    trace.record_return("P", &format!("g{}()", g), ObservedValue::Int(*v));
                }
                clean(t as u64).with_trace(trace)
            })
            .collect()
    }

    proptest! {
        /// Fitness equals the sum of per-goal minima over unsatisfied goals
        #[test]
        fn prop_fitness_matches_reference(
            (goals, matrix) in (1usize..6).prop_flat_map(|g| {
                (Just(g), prop::collection::vec(prop::collection::vec(-3i64..4, g), 0..5))
            })
        ) {
            let mut fitness = SuiteFitness::new(&integral_goals(goals), archive_config());
            let evaluation = fitness.evaluate(&batch(&matrix)).unwrap();

            let mut expected = 0.0;
            let mut covered = 0;
            for g in 0..goals {
                let best = matrix
                    .iter()
                    .map(|row| normalize(row[g].unsigned_abs() as f64))
                    .fold(1.0, f64::min);
                if best == 0.0 {
                    covered += 1;
                } else {
                    expected += best;
                }
            }
            prop_assert!((evaluation.fitness - expected).abs() < 1e-9);
            prop_assert_eq!(evaluation.covered_goals, covered);
            prop_assert_eq!(evaluation.fitness == 0.0, covered == goals);
            prop_assert!((0.0..=1.0).contains(&evaluation.coverage()));
        }

        /// Over many rounds with removal, coverage never drops and fitness stays bounded
        #[test]
        fn prop_rounds_are_monotonic(
            rounds in prop::collection::vec(
                (prop::collection::vec(prop::collection::vec(-2i64..3, 4), 0..3), any::<bool>()),
                1..8
            )
        ) {
            let mut fitness = SuiteFitness::new(&integral_goals(4), archive_config());
            let mut last_covered = 0;
            for (matrix, timed_out) in rounds {
                let mut results = batch(&matrix);
                if timed_out {
                    results.push(clean(99).with_timeout());
                }
                let evaluation = fitness.evaluate(&results).unwrap();
                prop_assert!(evaluation.covered_goals >= last_covered);
                prop_assert!(evaluation.fitness >= 0.0);
                prop_assert!(evaluation.fitness <= 4.0);
                last_covered = evaluation.covered_goals;
                fitness.update_covered_goals().unwrap();
                prop_assert_eq!(fitness.goals().removed_count(), last_covered);
            }
        }
    }
}
