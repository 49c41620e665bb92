//! Goalfit: Goal Registry and Suite Fitness Engine
//!
//! The coverage-goal core of a search-based unit test generator. Static
//! analysis registers every decision point of the program under test and
//! receives a dense [`BranchId`] for it; during the search, a
//! [`SuiteFitness`] per criterion turns the execution results of a candidate
//! suite into a scalar fitness (lower is better, 0 is perfect) and shrinks
//! its goal set as goals get covered.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    GOALFIT Architecture                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌──────────────┐    ┌──────────────┐        │
//! │   │ Static     │    │ GoalRegistry │    │ GoalFactory  │        │
//! │   │ Analysis   │───►│ (BranchIds)  │───►│ (goals)      │        │
//! │   └────────────┘    └──────────────┘    └──────┬───────┘        │
//! │                                                ▼                │
//! │   ┌────────────┐    ┌──────────────┐    ┌──────────────┐        │
//! │   │ Test       │    │ SuiteFitness │    │ Archive      │        │
//! │   │ Executor   │───►│ (evaluate)   │───►│ (optional)   │        │
//! │   └────────────┘    └──────────────┘    └──────────────┘        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use goalfit::{
//!     ExecutionResult, ExecutionTrace, FitnessConfig, MethodDescriptor, ObservedValue,
//!     OutputGoalFactory, ReturnType, SuiteFitness, TestId,
//! };
//!
//! let factory = OutputGoalFactory::new(vec![MethodDescriptor::new(
//!     "Account",
//!     "isOpen()",
//!     ReturnType::Boolean,
//! )]);
//! let config = FitnessConfig::builder().archive_enabled(true).build();
//! let mut fitness = SuiteFitness::new(&factory, config);
//!
//! let mut trace = ExecutionTrace::new();
//! trace.record_return("Account", "isOpen()", ObservedValue::Bool(true));
//! let results = vec![ExecutionResult::new(TestId::new(1)).with_trace(trace)];
//!
//! let evaluation = fitness.evaluate(&results).unwrap();
//! assert_eq!(evaluation.covered_goals, 1);
//! // the `False` category is still open: normalize(1.0) = 0.5
//! assert_eq!(evaluation.fitness, 0.5);
//! assert!(fitness.update_covered_goals().unwrap());
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Archive of best-known covering executions
#[allow(clippy::must_use_candidate, clippy::float_cmp)]
pub mod archive;

/// Fitness configuration (YAML/JSON)
#[allow(clippy::missing_errors_doc)]
pub mod config;

/// Execution results, traces and test suites
#[allow(
    clippy::must_use_candidate,
    clippy::cast_possible_truncation,
    clippy::missing_const_for_fn
)]
pub mod execution;

/// Suite Fitness Engine
#[allow(
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::float_cmp,
    clippy::module_name_repetitions
)]
pub mod fitness;

/// Coverage goals and goal factories
#[allow(
    clippy::cast_precision_loss,
    clippy::missing_errors_doc,
    clippy::float_cmp,
    clippy::module_name_repetitions
)]
pub mod goals;

/// Tracing subscriber setup for host binaries
#[cfg(feature = "logging")]
pub mod logging;

/// Goal Registry: dense branch ids for decision points
#[allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]
pub mod registry;

mod result;

pub use archive::{Archive, BestCoverageArchive};
pub use config::{FitnessConfig, FitnessConfigBuilder};
pub use execution::{
    method_key, BranchDistance, ExecutionResult, ExecutionTrace, ObservedValue, TestCase, TestExecutor,
    TestId, TestSuite,
};
pub use fitness::{
    deliver_observations, ArchivedSuiteFitness, Evaluation, FitnessReport, FitnessViolation, Observation,
    StatusTracker, StatusUpdate, SuiteFitness, ViolationAction,
};
pub use goals::{
    normalize, BranchGoal, BranchGoalFactory, CoverageGoal, GoalFactory, GoalSet, MethodDescriptor,
    OutputGoal, OutputGoalFactory, OutputValue, ReturnType,
};
pub use registry::{Branch, BranchId, BranchIdSink, GoalRegistry, Instruction, InstructionKind, InstructionRef};
pub use result::{GoalfitError, GoalfitResult};
