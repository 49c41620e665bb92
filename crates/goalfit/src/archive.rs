//! Archive of best-known covering executions
//!
//! The fitness engine never reads the archive back; it only registers
//! targets and reports observations. [`BestCoverageArchive`] is a small
//! in-memory store for hosts that don't bring their own.

use crate::execution::{ExecutionResult, TestId};
use crate::goals::CoverageGoal;
use std::collections::HashMap;
use std::fmt;

/// External store of best covering executions per goal
pub trait Archive<G> {
    /// Start tracking `goal`
    fn add_target(&mut self, goal: &G);

    /// Offer one observation; the archive decides whether to keep it
    fn update(&mut self, goal: &G, result: &ExecutionResult, distance: f64);

    /// Human-readable state, for diagnostics only
    fn summary(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ArchiveEntry {
    best_distance: f64,
    best_test: Option<TestId>,
}

impl Default for ArchiveEntry {
    fn default() -> Self {
        Self {
            best_distance: 1.0,
            best_test: None,
        }
    }
}

/// Keeps the smallest observed distance and the test that achieved it
#[derive(Debug, Clone)]
pub struct BestCoverageArchive<G> {
    targets: Vec<G>,
    entries: HashMap<G, ArchiveEntry>,
}

impl<G> Default for BestCoverageArchive<G> {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            entries: HashMap::new(),
        }
    }
}

impl<G: CoverageGoal> BestCoverageArchive<G> {
    /// Create an empty archive
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked targets
    #[must_use]
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Targets with a recorded zero-distance execution
    #[must_use]
    pub fn covered_targets(&self) -> Vec<&G> {
        self.targets
            .iter()
            .filter(|g| self.is_covered(g))
            .collect()
    }

    /// Whether `goal` has been covered
    #[must_use]
    pub fn is_covered(&self, goal: &G) -> bool {
        self.entries
            .get(goal)
            .is_some_and(|e| e.best_distance == 0.0 && e.best_test.is_some())
    }

    /// Best distance observed for `goal`
    #[must_use]
    pub fn best_distance(&self, goal: &G) -> Option<f64> {
        self.entries.get(goal).map(|e| e.best_distance)
    }

    /// Test that achieved the best distance for `goal`
    #[must_use]
    pub fn best_test(&self, goal: &G) -> Option<TestId> {
        self.entries.get(goal).and_then(|e| e.best_test)
    }
}

impl<G: CoverageGoal> Archive<G> for BestCoverageArchive<G> {
    fn add_target(&mut self, goal: &G) {
        if !self.entries.contains_key(goal) {
            self.targets.push(goal.clone());
            let _ = self.entries.insert(goal.clone(), ArchiveEntry::default());
        }
    }

    fn update(&mut self, goal: &G, result: &ExecutionResult, distance: f64) {
        let Some(entry) = self.entries.get_mut(goal) else {
            return;
        };
        if entry.best_test.is_none() || distance < entry.best_distance {
            entry.best_distance = distance.min(entry.best_distance);
            entry.best_test = Some(result.test);
        }
    }

    fn summary(&self) -> String {
        self.to_string()
    }
}

impl<G: CoverageGoal> fmt::Display for BestCoverageArchive<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} targets covered",
            self.covered_targets().len(),
            self.targets.len()
        )
    }
}
