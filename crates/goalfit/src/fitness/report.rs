//! Fitness Report
//!
//! Serializable snapshot of one fitness function for reporting tools.

use super::StatusTracker;
use crate::goals::{CoverageGoal, GoalSet};
use crate::result::GoalfitResult;
use serde::{Deserialize, Serialize};

/// Summary statistics of one fitness function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessReport {
    /// Criterion name
    pub criterion: String,
    /// Total number of goals
    pub total_goals: usize,
    /// Goals still searched for
    pub active_goals: usize,
    /// Goals permanently removed as covered
    pub removed_goals: usize,
    /// Goals satisfied but awaiting removal
    pub pending_removals: usize,
    /// Removed goals as a percentage of the total
    pub coverage_percent: f64,
    /// Most goals covered by a single suite
    pub max_covered_goals: usize,
    /// Lowest fitness seen, if any suite was scored
    pub best_fitness: Option<f64>,
}

impl FitnessReport {
    pub(crate) fn new<G: CoverageGoal>(
        criterion: &str,
        goals: &GoalSet<G>,
        pending_removals: usize,
        status: &StatusTracker,
    ) -> Self {
        let total = goals.total_goals();
        let coverage_percent = if total == 0 {
            100.0 // Vacuously true
        } else {
            (goals.removed_count() as f64 / total as f64) * 100.0
        };
        Self {
            criterion: criterion.to_string(),
            total_goals: total,
            active_goals: goals.active_count(),
            removed_goals: goals.removed_count(),
            pending_removals,
            coverage_percent,
            max_covered_goals: status.max_covered_goals(),
            best_fitness: status.best_fitness(),
        }
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> GoalfitResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
