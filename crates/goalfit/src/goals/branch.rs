//! Branch coverage goals derived from the Goal Registry.

use super::{normalize, CoverageGoal, GoalFactory};
use crate::execution::ExecutionResult;
use crate::registry::{BranchId, GoalRegistry};
use std::fmt;

/// Goal: a branch takes one outcome, or a branchless method is entered
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BranchGoal {
    /// Branch `branch_id` evaluates to `outcome`
    Outcome {
        /// Registered branch
        branch_id: BranchId,
        /// Targeted outcome
        outcome: bool,
    },
    /// A method without branches is executed at all
    MethodEntry {
        /// Method key as recorded by the registry
        method: String,
    },
}

impl CoverageGoal for BranchGoal {
    fn distance(&self, result: &ExecutionResult) -> f64 {
        match self {
            Self::Outcome { branch_id, outcome } => result
                .trace
                .branch_distance(*branch_id)
                .map_or(1.0, |d| {
                    normalize(if *outcome {
                        d.true_distance
                    } else {
                        d.false_distance
                    })
                }),
            Self::MethodEntry { method } => {
                if result.trace.covers_method(method) {
                    0.0
                } else {
                    1.0
                }
            }
        }
    }
}

impl fmt::Display for BranchGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outcome { branch_id, outcome } => write!(f, "{}:{}", branch_id, outcome),
            Self::MethodEntry { method } => write!(f, "entry:{}", method),
        }
    }
}

/// Two outcome goals per registered branch, one entry goal per branchless method
#[derive(Debug, Clone, Copy)]
pub struct BranchGoalFactory<'a> {
    registry: &'a GoalRegistry,
}

impl<'a> BranchGoalFactory<'a> {
    /// Create a factory reading from `registry`
    #[must_use]
    pub const fn new(registry: &'a GoalRegistry) -> Self {
        Self { registry }
    }
}

impl GoalFactory for BranchGoalFactory<'_> {
    type Goal = BranchGoal;

    fn criterion(&self) -> &'static str {
        "branch"
    }

    fn coverage_goals(&self) -> Vec<BranchGoal> {
        let outcomes = self.registry.branches().flat_map(|branch| {
            [true, false].map(|outcome| BranchGoal::Outcome {
                branch_id: branch.branch_id(),
                outcome,
            })
        });
        let entries = self
            .registry
            .branchless_methods()
            .into_iter()
            .map(|method| BranchGoal::MethodEntry { method });
        outcomes.chain(entries).collect()
    }
}
