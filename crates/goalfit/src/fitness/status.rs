//! Best-so-far tracking for progress messages.

use crate::execution::TestSuite;
use tracing::info;

/// Best coverage and fitness seen by one fitness function
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusTracker {
    max_covered_goals: usize,
    best_fitness: f64,
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self {
            max_covered_goals: 0,
            best_fitness: f64::MAX,
        }
    }
}

/// What improved with the latest suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusUpdate {
    /// More goals covered than ever before
    pub coverage_improved: bool,
    /// Lower fitness than ever before
    pub fitness_improved: bool,
}

impl StatusTracker {
    /// Create a tracker with nothing seen yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most goals covered by any suite so far
    #[must_use]
    pub const fn max_covered_goals(&self) -> usize {
        self.max_covered_goals
    }

    /// Lowest fitness so far, if any suite was scored
    #[must_use]
    pub fn best_fitness(&self) -> Option<f64> {
        (self.best_fitness < f64::MAX).then_some(self.best_fitness)
    }

    /// Fold in one scored suite, logging improvements when `log` is set
    pub fn record(
        &mut self,
        criterion: &str,
        suite: &TestSuite,
        covered: usize,
        total: usize,
        fitness: f64,
        log: bool,
    ) -> StatusUpdate {
        let mut update = StatusUpdate::default();
        if covered > self.max_covered_goals {
            self.max_covered_goals = covered;
            update.coverage_improved = true;
            if log {
                info!(
                    criterion,
                    covered,
                    total,
                    fitness,
                    size = suite.size(),
                    length = suite.total_length(),
                    "({} goals) Best individual covers {}/{} goals",
                    criterion,
                    covered,
                    total
                );
            }
        }
        if fitness < self.best_fitness {
            self.best_fitness = fitness;
            update.fitness_improved = true;
            if log {
                info!(
                    criterion,
                    covered,
                    total,
                    fitness,
                    size = suite.size(),
                    length = suite.total_length(),
                    "(Fitness) Best individual covers {}/{} {} goals",
                    covered,
                    total,
                    criterion
                );
            }
        }
        update
    }
}
