//! Coverage Goals
//!
//! A goal is an immutable value object with a structural identity and a
//! distance function over one execution result. Distance is normalised to
//! `[0, 1]`; `0` means the execution satisfies the goal.
//!
//! Two goal kinds ship with the crate:
//!
//! - [`OutputGoal`]: a method's return value falls into a value category
//! - [`BranchGoal`]: a registered branch takes one of its outcomes, or a
//!   branchless method is entered

mod branch;
mod goal_set;
mod output;

pub use branch::{BranchGoal, BranchGoalFactory};
pub use goal_set::GoalSet;
pub use output::{MethodDescriptor, OutputGoal, OutputGoalFactory, OutputValue, ReturnType};

use crate::execution::ExecutionResult;
use std::fmt;
use std::hash::Hash;

/// Something a test suite can be scored against
///
/// Equality and hashing must reflect the structural location plus the
/// property the goal encodes, so equal goals collapse in a [`GoalSet`].
pub trait CoverageGoal: Clone + Eq + Hash + fmt::Debug + fmt::Display {
    /// Normalised distance in `[0, 1]` of `result` from satisfying this goal
    fn distance(&self, result: &ExecutionResult) -> f64;

    /// Stable textual key, recorded on covering test cases
    fn key(&self) -> String {
        self.to_string()
    }
}

/// Enumerates every goal of one criterion for the current session
pub trait GoalFactory {
    /// Goal type produced
    type Goal: CoverageGoal;

    /// Criterion name used for suite annotations (e.g. `"output"`)
    fn criterion(&self) -> &'static str;

    /// All goals, in a deterministic order; duplicates are allowed
    fn coverage_goals(&self) -> Vec<Self::Goal>;
}

/// Map a raw non-negative distance into `[0, 1)`
///
/// `d / (d + 1)`. NaN and `+inf` map to `1.0`, negatives to `0.0`.
#[must_use]
pub fn normalize(distance: f64) -> f64 {
    if distance.is_nan() || distance == f64::INFINITY {
        return 1.0;
    }
    if distance <= 0.0 {
        return 0.0;
    }
    distance / (distance + 1.0)
}
