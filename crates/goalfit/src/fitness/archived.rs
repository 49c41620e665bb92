//! Archive delivery on top of a pure [`SuiteFitness`].

use super::{Evaluation, SuiteFitness};
use crate::archive::Archive;
use crate::config::FitnessConfig;
use crate::execution::{ExecutionResult, TestSuite};
use crate::goals::{CoverageGoal, GoalFactory};
use crate::result::GoalfitResult;
use tracing::info;

/// Hand every observation of `evaluation` to `archive`, in scan order
///
/// `results` must be the batch `evaluation` was computed from.
pub fn deliver_observations<G, A>(evaluation: &Evaluation<G>, results: &[ExecutionResult], archive: &mut A)
where
    A: Archive<G> + ?Sized,
{
    for observation in &evaluation.observations {
        if let Some(result) = results.get(observation.result_index) {
            archive.update(&observation.goal, result, observation.distance);
        }
    }
}

/// A fitness function wired to an archive
///
/// Registers targets on construction, delivers observations after every
/// scored suite, and logs the archive state whenever covered goals are
/// removed.
#[derive(Debug)]
pub struct ArchivedSuiteFitness<G, A> {
    fitness: SuiteFitness<G>,
    archive: A,
}

impl<G: CoverageGoal, A: Archive<G>> ArchivedSuiteFitness<G, A> {
    /// Build the fitness function and register its goals with `archive`
    pub fn new<F>(factory: &F, config: FitnessConfig, mut archive: A) -> Self
    where
        F: GoalFactory<Goal = G> + ?Sized,
    {
        let fitness = SuiteFitness::with_archive(factory, config, &mut archive);
        Self { fitness, archive }
    }

    /// The wrapped fitness function
    #[must_use]
    pub const fn fitness(&self) -> &SuiteFitness<G> {
        &self.fitness
    }

    /// The archive
    #[must_use]
    pub const fn archive(&self) -> &A {
        &self.archive
    }

    /// Score a suite, then deliver the round's observations
    pub fn get_fitness(&mut self, suite: &mut TestSuite, results: &[ExecutionResult]) -> GoalfitResult<f64> {
        let evaluation = self.fitness.score(suite, results)?;
        deliver_observations(&evaluation, results, &mut self.archive);
        Ok(evaluation.fitness)
    }

    /// Deferred removal phase; logs the archive state when it ran
    pub fn update_covered_goals(&mut self) -> GoalfitResult<bool> {
        let updated = self.fitness.update_covered_goals()?;
        if updated {
            info!(
                criterion = self.fitness.criterion(),
                "Current state of archive: {}",
                self.archive.summary()
            );
        }
        Ok(updated)
    }

    /// Split into the fitness function and the archive
    pub fn into_parts(self) -> (SuiteFitness<G>, A) {
        (self.fitness, self.archive)
    }
}
