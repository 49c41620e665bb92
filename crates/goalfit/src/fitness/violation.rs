//! Fitness invariant violations: Stop vs LogAndContinue
//!
//! An out-of-range distance from a goal implementation is replaced by 1.0, logged,
//! and the round continues. A broken aggregate (negative fitness, coverage
//! above the total, ...) means the engine itself is wrong: evaluation
//! stops with [`GoalfitError::InvariantViolation`].

use crate::result::GoalfitError;
use std::fmt;

/// Response to a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationAction {
    /// Abort the evaluation; the numbers cannot be trusted
    Stop,
    /// Sanitise the value, log it and keep going
    LogAndContinue,
}

/// A fitness invariant that did not hold
#[derive(Debug, Clone, PartialEq)]
pub enum FitnessViolation {
    /// A goal reported a distance outside `[0, 1]` (or NaN)
    DistanceOutOfRange {
        /// Goal key
        goal: String,
        /// Reported distance
        distance: f64,
    },
    /// More goals covered than exist
    CoveredExceedsTotal {
        /// Covered goals
        covered: usize,
        /// Total goals
        total: usize,
    },
    /// Fitness is negative, NaN or infinite
    InvalidFitness {
        /// Computed fitness
        fitness: f64,
    },
    /// Zero fitness although some goals remain uncovered
    ZeroFitnessWithUncoveredGoals {
        /// Covered goals
        covered: usize,
        /// Total goals
        total: usize,
    },
    /// Every goal covered but fitness is still positive
    ResidualFitness {
        /// Computed fitness
        fitness: f64,
    },
    /// Coverage ratio outside `[0, 1]`
    CoverageOutOfRange {
        /// Computed ratio
        coverage: f64,
    },
}

impl FitnessViolation {
    /// Classify violation severity
    #[must_use]
    pub const fn action(&self) -> ViolationAction {
        match self {
            Self::DistanceOutOfRange { .. } => ViolationAction::LogAndContinue,
            Self::CoveredExceedsTotal { .. }
            | Self::InvalidFitness { .. }
            | Self::ZeroFitnessWithUncoveredGoals { .. }
            | Self::ResidualFitness { .. }
            | Self::CoverageOutOfRange { .. } => ViolationAction::Stop,
        }
    }

    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::DistanceOutOfRange { goal, distance } => {
                format!("goal {} reported distance {} outside [0, 1]", goal, distance)
            }
            Self::CoveredExceedsTotal { covered, total } => {
                format!("covered {} vs total goals {}", covered, total)
            }
            Self::InvalidFitness { fitness } => format!("fitness {} is not a non-negative number", fitness),
            Self::ZeroFitnessWithUncoveredGoals { covered, total } => {
                format!("fitness 0 but coverage {}/{}", covered, total)
            }
            Self::ResidualFitness { fitness } => {
                format!("all goals covered but fitness is {}", fitness)
            }
            Self::CoverageOutOfRange { coverage } => format!("wrong coverage value {}", coverage),
        }
    }
}

impl From<FitnessViolation> for GoalfitError {
    fn from(violation: FitnessViolation) -> Self {
        Self::InvariantViolation {
            message: violation.description(),
        }
    }
}

/// Aggregate numbers of one evaluation, as checked after the round
#[derive(Debug, Clone, Copy)]
pub(crate) struct RoundTotals {
    pub fitness: f64,
    pub covered: usize,
    pub total: usize,
    pub coverage: f64,
    pub short_circuited: bool,
}

/// All stop-level violations of `totals`, in check order
pub(crate) fn check_round(totals: RoundTotals) -> Vec<FitnessViolation> {
    let RoundTotals {
        fitness,
        covered,
        total,
        coverage,
        short_circuited,
    } = totals;
    let mut violations = Vec::new();
    if covered > total {
        violations.push(FitnessViolation::CoveredExceedsTotal { covered, total });
    }
    if !fitness.is_finite() || fitness < 0.0 {
        violations.push(FitnessViolation::InvalidFitness { fitness });
    }
    if fitness == 0.0 && covered != total {
        violations.push(FitnessViolation::ZeroFitnessWithUncoveredGoals { covered, total });
    }
    // a crashed round is scored at the penalty even if everything was removed earlier
    if !short_circuited && covered == total && fitness != 0.0 {
        violations.push(FitnessViolation::ResidualFitness { fitness });
    }
    if !(0.0..=1.0).contains(&coverage) {
        violations.push(FitnessViolation::CoverageOutOfRange { coverage });
    }
    violations
}

/// Replace a goal-reported distance outside `[0, 1]` with 1.0
///
/// Returns the sanitised distance and, if it had to change, the violation.
/// Only a genuine 0.0 may satisfy a goal, so negatives count as uncovered.
pub(crate) fn sanitise_distance(goal: &impl fmt::Display, distance: f64) -> (f64, Option<FitnessViolation>) {
    if (0.0..=1.0).contains(&distance) {
        return (distance, None);
    }
    (
        1.0,
        Some(FitnessViolation::DistanceOutOfRange {
            goal: goal.to_string(),
            distance,
        }),
    )
}
