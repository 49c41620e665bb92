//! Outcome of scoring one generation's execution results.

use super::FitnessViolation;
use crate::execution::TestId;

/// One `(goal, result, distance)` observation, for archive delivery
#[derive(Debug, Clone, PartialEq)]
pub struct Observation<G> {
    /// Observed goal
    pub goal: G,
    /// Index of the execution result in the evaluated batch
    pub result_index: usize,
    /// Test that produced the result
    pub test: TestId,
    /// Sanitised distance
    pub distance: f64,
}

/// Result of [`SuiteFitness::evaluate`](super::SuiteFitness::evaluate)
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation<G> {
    /// Scalar fitness, lower is better, 0 is perfect
    pub fitness: f64,
    /// Goals covered in or before this round
    pub covered_goals: usize,
    /// Total goals of the fitness function
    pub total_goals: usize,
    /// Goals driven to distance 0 this round, in discovery order
    pub newly_satisfied: Vec<G>,
    /// Which test first covered each newly satisfied goal
    pub covering_tests: Vec<(G, TestId)>,
    /// Every observation made, when archival is enabled
    pub observations: Vec<Observation<G>>,
    /// A timeout or uncaught exception forced the worst fitness
    pub short_circuited: bool,
    /// Distances that had to be sanitised
    pub warnings: Vec<FitnessViolation>,
}

impl<G> Evaluation<G> {
    /// The worst-case evaluation for a round with a timeout or crash
    pub(crate) fn short_circuit(total_goals: usize, removed: usize) -> Self {
        Self {
            fitness: total_goals as f64,
            covered_goals: removed,
            total_goals,
            newly_satisfied: Vec::new(),
            covering_tests: Vec::new(),
            observations: Vec::new(),
            short_circuited: true,
            warnings: Vec::new(),
        }
    }

    /// Covered fraction of all goals; `1.0` when there are none
    #[must_use]
    pub fn coverage(&self) -> f64 {
        if self.total_goals == 0 {
            1.0
        } else {
            self.covered_goals as f64 / self.total_goals as f64
        }
    }

    /// Whether every goal is covered
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.covered_goals == self.total_goals
    }
}
