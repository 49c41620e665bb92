//! The per-fitness-function set of active and removed goals.

use super::{CoverageGoal, GoalFactory};
use crate::result::{GoalfitError, GoalfitResult};
use std::collections::HashSet;

/// Active and removed goals of one fitness function
///
/// Built once; duplicates collapse while first-seen order is kept. A goal
/// moves from active to removed at most once and never comes back.
#[derive(Debug, Clone)]
pub struct GoalSet<G> {
    active: Vec<G>,
    /// Same members as `active`
    active_index: HashSet<G>,
    removed: Vec<G>,
    total: usize,
}

impl<G: CoverageGoal> GoalSet<G> {
    /// Build from an arbitrary sequence of goals
    pub fn from_goals<I>(goals: I) -> Self
    where
        I: IntoIterator<Item = G>,
    {
        let mut seen = HashSet::new();
        let active: Vec<G> = goals
            .into_iter()
            .filter(|goal| seen.insert(goal.clone()))
            .collect();
        let total = active.len();
        Self {
            active,
            active_index: seen,
            removed: Vec::new(),
            total,
        }
    }

    /// Build from everything a factory enumerates
    pub fn from_factory<F>(factory: &F) -> Self
    where
        F: GoalFactory<Goal = G> + ?Sized,
    {
        Self::from_goals(factory.coverage_goals())
    }

    /// Number of distinct goals, fixed at construction
    #[must_use]
    pub const fn total_goals(&self) -> usize {
        self.total
    }

    /// Goals not yet satisfied
    #[must_use]
    pub fn active_goals(&self) -> &[G] {
        &self.active
    }

    /// Goals already satisfied, in removal order
    #[must_use]
    pub fn removed_goals(&self) -> &[G] {
        &self.removed
    }

    /// Number of removed goals
    #[must_use]
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    /// Number of active goals
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Whether `goal` is still active
    #[must_use]
    pub fn is_active(&self, goal: &G) -> bool {
        self.active_index.contains(goal)
    }

    /// Move `goal` from the active to the removed set
    ///
    /// Fails with [`GoalfitError::GoalNotFound`] when the goal is not
    /// active; the set is left unchanged in that case.
    pub fn mark_satisfied(&mut self, goal: &G) -> GoalfitResult<()> {
        self.remove_satisfied(std::slice::from_ref(goal))
    }

    /// Move a batch of goals from the active to the removed set
    ///
    /// One pass over the active goals regardless of batch size. Every goal
    /// must be active and appear once; otherwise nothing moves and the
    /// first offender is reported as [`GoalfitError::GoalNotFound`].
    pub fn remove_satisfied(&mut self, goals: &[G]) -> GoalfitResult<()> {
        let mut batch = HashSet::with_capacity(goals.len());
        for goal in goals {
            if !self.active_index.contains(goal) || !batch.insert(goal) {
                return Err(GoalfitError::GoalNotFound {
                    goal: goal.to_string(),
                });
            }
        }
        if batch.is_empty() {
            return Ok(());
        }

        self.active.retain(|g| !batch.contains(g));
        for goal in goals {
            self.active_index.remove(goal);
        }
        self.removed.extend(goals.iter().cloned());
        Ok(())
    }
}
