//! Execution results and the suites they come from.
//!
//! Results are produced by an external executor and are read-only here.
//! A suite carries per-criterion annotations (coverage ratio, covered goal
//! count) that the fitness engine writes after scoring it.

use crate::registry::BranchId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

/// Identifier of one test case within a suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestId(u64);

impl TestId {
    /// Create a test id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner value
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Key used for per-method trace data: `Class.signature`
#[must_use]
pub fn method_key(class_name: &str, method_signature: &str) -> String {
    format!("{}.{}", class_name, method_signature)
}

/// A value returned by a method of the program under test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ObservedValue {
    /// Null reference
    Null,
    /// Boolean
    Bool(bool),
    /// Any integral type
    Int(i64),
    /// Any floating point type
    Float(f64),
    /// Character
    Char(char),
    /// String
    Str(String),
    /// Array with its length
    Array(usize),
    /// Non-null object of any other type
    Object,
}

/// Smallest distances seen for the two outcomes of one branch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BranchDistance {
    /// Distance to taking the true outcome (0 if taken)
    pub true_distance: f64,
    /// Distance to taking the false outcome (0 if taken)
    pub false_distance: f64,
}

/// Runtime trace data the goal distance functions read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionTrace {
    return_values: HashMap<String, Vec<ObservedValue>>,
    branch_distances: HashMap<BranchId, BranchDistance>,
    covered_methods: HashSet<String>,
}

impl ExecutionTrace {
    /// Create an empty trace
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value returned by `class_name.method_signature`
    ///
    /// Also marks the method as covered.
    pub fn record_return(&mut self, class_name: &str, method_signature: &str, value: ObservedValue) {
        let key = method_key(class_name, method_signature);
        let _ = self.covered_methods.insert(key.clone());
        self.return_values.entry(key).or_default().push(value);
    }

    /// Record one evaluation of a branch, keeping the smallest distances
    pub fn record_branch(&mut self, branch_id: BranchId, true_distance: f64, false_distance: f64) {
        let entry = self.branch_distances.entry(branch_id).or_insert(BranchDistance {
            true_distance,
            false_distance,
        });
        entry.true_distance = entry.true_distance.min(true_distance);
        entry.false_distance = entry.false_distance.min(false_distance);
    }

    /// Record that a method was entered
    pub fn record_method_entry(&mut self, method: &str) {
        let _ = self.covered_methods.insert(method.to_string());
    }

    /// Values returned by one method, in observation order
    #[must_use]
    pub fn return_values(&self, class_name: &str, method_signature: &str) -> &[ObservedValue] {
        self.return_values
            .get(&method_key(class_name, method_signature))
            .map_or(&[], Vec::as_slice)
    }

    /// Distances recorded for one branch, if it executed
    #[must_use]
    pub fn branch_distance(&self, branch_id: BranchId) -> Option<BranchDistance> {
        self.branch_distances.get(&branch_id).copied()
    }

    /// Whether a method was entered
    #[must_use]
    pub fn covers_method(&self, method: &str) -> bool {
        self.covered_methods.contains(method)
    }
}

/// Outcome of running one test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// The test that was executed
    pub test: TestId,
    /// Execution hit the executor's timeout
    pub timed_out: bool,
    /// The test itself raised an uncaught exception
    pub test_exception: bool,
    /// Exceptions thrown by the program under test during execution
    pub thrown_exceptions: Vec<String>,
    /// Trace data for distance computation
    pub trace: ExecutionTrace,
}

impl ExecutionResult {
    /// A clean result with an empty trace
    #[must_use]
    pub fn new(test: TestId) -> Self {
        Self {
            test,
            timed_out: false,
            test_exception: false,
            thrown_exceptions: Vec::new(),
            trace: ExecutionTrace::new(),
        }
    }

    /// Attach a trace
    #[must_use]
    pub fn with_trace(mut self, trace: ExecutionTrace) -> Self {
        self.trace = trace;
        self
    }

    /// Mark as timed out
    #[must_use]
    pub const fn with_timeout(mut self) -> Self {
        self.timed_out = true;
        self
    }

    /// Mark as having raised an uncaught exception
    #[must_use]
    pub const fn with_test_exception(mut self) -> Self {
        self.test_exception = true;
        self
    }

    /// Add an exception thrown by the program under test
    #[must_use]
    pub fn with_thrown_exception(mut self, exception: &str) -> Self {
        self.thrown_exceptions.push(exception.to_string());
        self
    }

    /// Whether this result invalidates the whole round
    #[must_use]
    pub const fn aborts_round(&self) -> bool {
        self.timed_out || self.test_exception
    }

    /// Whether this result is trustworthy enough to compute distances from
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.aborts_round() && self.thrown_exceptions.is_empty()
    }
}

/// One candidate test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    id: TestId,
    length: usize,
    covered_goals: BTreeSet<String>,
}

impl TestCase {
    /// Create a test case with the given number of statements
    #[must_use]
    pub fn new(id: TestId, length: usize) -> Self {
        Self {
            id,
            length,
            covered_goals: BTreeSet::new(),
        }
    }

    /// Test id
    #[must_use]
    pub const fn id(&self) -> TestId {
        self.id
    }

    /// Number of statements
    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    /// Record a goal this test was seen to cover
    pub fn add_covered_goal(&mut self, goal: &str) {
        let _ = self.covered_goals.insert(goal.to_string());
    }

    /// Goals this test was seen to cover
    #[must_use]
    pub const fn covered_goals(&self) -> &BTreeSet<String> {
        &self.covered_goals
    }
}

/// A candidate test suite with per-criterion fitness annotations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSuite {
    tests: Vec<TestCase>,
    coverage: BTreeMap<String, f64>,
    covered_goal_counts: BTreeMap<String, usize>,
}

impl TestSuite {
    /// Create an empty suite
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a suite from test cases
    #[must_use]
    pub fn from_tests(tests: Vec<TestCase>) -> Self {
        Self {
            tests,
            ..Self::default()
        }
    }

    /// Append a test case
    pub fn add_test(&mut self, test: TestCase) {
        self.tests.push(test);
    }

    /// All test cases
    #[must_use]
    pub fn tests(&self) -> &[TestCase] {
        &self.tests
    }

    /// Mutable access to one test case
    pub fn test_mut(&mut self, id: TestId) -> Option<&mut TestCase> {
        self.tests.iter_mut().find(|t| t.id == id)
    }

    /// Number of test cases
    #[must_use]
    pub fn size(&self) -> usize {
        self.tests.len()
    }

    /// Sum of the lengths of all test cases
    #[must_use]
    pub fn total_length(&self) -> usize {
        self.tests.iter().map(TestCase::length).sum()
    }

    /// Set the coverage ratio for a criterion
    pub fn set_coverage(&mut self, criterion: &str, ratio: f64) {
        let _ = self.coverage.insert(criterion.to_string(), ratio);
    }

    /// Coverage ratio for a criterion, if scored
    #[must_use]
    pub fn coverage(&self, criterion: &str) -> Option<f64> {
        self.coverage.get(criterion).copied()
    }

    /// Set the number of covered goals for a criterion
    pub fn set_covered_goals(&mut self, criterion: &str, count: usize) {
        let _ = self.covered_goal_counts.insert(criterion.to_string(), count);
    }

    /// Number of covered goals for a criterion, if scored
    #[must_use]
    pub fn covered_goals(&self, criterion: &str) -> Option<usize> {
        self.covered_goal_counts.get(criterion).copied()
    }
}

/// Runs a suite and reports one result per test, in suite order
///
/// Implementations own sandboxing and timeouts; by the time results come
/// back every timeout has already resolved.
pub trait TestExecutor {
    /// Execute every test of `suite`
    fn execute(&mut self, suite: &TestSuite) -> Vec<ExecutionResult>;
}
