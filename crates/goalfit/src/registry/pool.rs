//! Goal Registry
//!
//! Holds every branch discovered during static analysis of one session.
//! Storage is an arena: classes and methods get small indices on first
//! sight, branches live in a dense vector addressed by `BranchId - 1`, and
//! string-keyed maps exist only at the lookup boundary.
//!
//! The registry is mutated through `&mut self` while analysis runs and
//! shared read-only afterwards (see [`GoalRegistry::into_shared`]).
//!
//! Per-method queries that take a single string ([`GoalRegistry::branch_count_for`],
//! [`GoalRegistry::mark_branchless`], [`GoalRegistry::is_branchless`]) all use
//! the class-qualified [`method_key`].

use super::ids::{ClassIdx, MethodIdx};
use super::{Branch, BranchId, Instruction, InstructionRef};
use crate::execution::method_key;
use crate::result::{GoalfitError, GoalfitResult};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Control-flow collaborator that learns about freshly assigned branch ids
///
/// Static analysis may hold several representations of the same decision
/// point (raw and merged graphs). The registry notifies the sink once per
/// registration so every representation reports the same id.
pub trait BranchIdSink {
    /// Propagate `branch_id` to all representations of `instruction`
    fn mark_branch_id(&mut self, instruction: &InstructionRef, branch_id: BranchId);
}

/// No control-flow structure to notify
impl BranchIdSink for () {
    fn mark_branch_id(&mut self, _instruction: &InstructionRef, _branch_id: BranchId) {}
}

/// Collects propagated ids, for collaborators that apply them later
impl BranchIdSink for Vec<(InstructionRef, BranchId)> {
    fn mark_branch_id(&mut self, instruction: &InstructionRef, branch_id: BranchId) {
        self.push((instruction.clone(), branch_id));
    }
}

#[derive(Debug)]
struct ClassEntry {
    name: String,
    methods: Vec<MethodIdx>,
}

#[derive(Debug)]
struct MethodEntry {
    class: ClassIdx,
    signature: String,
    branches: Vec<BranchId>,
}

/// Registry of structural coverage targets for one analysis session
#[derive(Debug, Default)]
pub struct GoalRegistry {
    classes: Vec<ClassEntry>,
    methods: Vec<MethodEntry>,
    /// Dense: `branches[i].branch_id() == i + 1`
    branches: Vec<Branch>,
    class_index: HashMap<String, ClassIdx>,
    method_index: HashMap<(ClassIdx, String), MethodIdx>,
    method_branch_count: HashMap<String, usize>,
    branchless_methods: HashSet<String>,
    registered: HashMap<InstructionRef, BranchId>,
}

impl GoalRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a decision instruction and return its freshly assigned id
    ///
    /// Fails with [`GoalfitError::NotABranch`] for non-decision
    /// instructions and [`GoalfitError::DuplicateRegistration`] when the
    /// instruction is already known. A failed call leaves the registry
    /// untouched and does not notify `sink`.
    pub fn register<S>(&mut self, instruction: &Instruction, sink: &mut S) -> GoalfitResult<BranchId>
    where
        S: BranchIdSink + ?Sized,
    {
        let reference = instruction.reference();
        if !instruction.is_decision_point() {
            return Err(GoalfitError::NotABranch {
                instruction: reference.to_string(),
            });
        }
        if self.is_known_as_branch(reference) {
            return Err(GoalfitError::DuplicateRegistration {
                instruction: reference.to_string(),
            });
        }

        let raw_id = u32::try_from(self.branches.len() + 1).map_err(|_| {
            GoalfitError::InvariantViolation {
                message: "branch id space exhausted".to_string(),
            }
        })?;
        let branch_id = BranchId::new(raw_id);

        let method = self.intern_method(reference.class_name(), reference.method_signature());
        self.methods[method.get()].branches.push(branch_id);
        *self
            .method_branch_count
            .entry(method_key(reference.class_name(), reference.method_signature()))
            .or_insert(0) += 1;
        let _ = self.registered.insert(reference.clone(), branch_id);
        self.branches
            .push(Branch::new(branch_id, reference.clone(), instruction.line_number()));

        sink.mark_branch_id(reference, branch_id);

        debug!(
            branch_id = branch_id.as_u32(),
            line = instruction.line_number(),
            "Branch {} at line {}",
            branch_id.as_u32(),
            instruction.line_number()
        );
        Ok(branch_id)
    }

    fn intern_method(&mut self, class_name: &str, signature: &str) -> MethodIdx {
        let class = match self.class_index.get(class_name) {
            Some(idx) => *idx,
            None => {
                let idx = ClassIdx::new(self.classes.len());
                self.classes.push(ClassEntry {
                    name: class_name.to_string(),
                    methods: Vec::new(),
                });
                let _ = self.class_index.insert(class_name.to_string(), idx);
                idx
            }
        };

        let key = (class, signature.to_string());
        if let Some(idx) = self.method_index.get(&key) {
            return *idx;
        }
        let idx = MethodIdx::new(self.methods.len());
        self.methods.push(MethodEntry {
            class,
            signature: signature.to_string(),
            branches: Vec::new(),
        });
        self.classes[class.get()].methods.push(idx);
        let _ = self.method_index.insert(key, idx);
        idx
    }

    fn method_entry(&self, class_name: &str, signature: &str) -> Option<&MethodEntry> {
        let class = self.class_index.get(class_name)?;
        let method = self.method_index.get(&(*class, signature.to_string()))?;
        self.methods.get(method.get())
    }

    /// Record a method that contains no branches (idempotent)
    ///
    /// `method` is the [`method_key`] of the method.
    pub fn mark_branchless(&mut self, method: &str) {
        let _ = self.branchless_methods.insert(method.to_string());
    }

    /// Whether the method was marked as branchless
    #[must_use]
    pub fn is_branchless(&self, method: &str) -> bool {
        self.branchless_methods.contains(method)
    }

    /// All methods marked as branchless
    #[must_use]
    pub fn branchless_methods(&self) -> BTreeSet<String> {
        self.branchless_methods.iter().cloned().collect()
    }

    /// Whether the instruction has already been registered
    #[must_use]
    pub fn is_known_as_branch(&self, instruction: &InstructionRef) -> bool {
        self.registered.contains_key(instruction)
    }

    /// Branch id assigned to an instruction, if registered
    #[must_use]
    pub fn branch_id_for(&self, instruction: &InstructionRef) -> Option<BranchId> {
        self.registered.get(instruction).copied()
    }

    /// Number of branches registered for a method (0 if unknown)
    ///
    /// `method` is the [`method_key`] of the method, so equal signatures in
    /// different classes are counted apart.
    #[must_use]
    pub fn branch_count_for(&self, method: &str) -> usize {
        self.method_branch_count
            .get(method)
            .copied()
            .unwrap_or(0)
    }

    /// Number of branches registered so far (the id counter)
    #[must_use]
    pub fn total_branches(&self) -> usize {
        self.branches.len()
    }

    /// Whether nothing has been registered yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty() && self.branchless_methods.is_empty()
    }

    /// Look up a branch by id
    #[must_use]
    pub fn lookup_by_id(&self, branch_id: BranchId) -> Option<&Branch> {
        branch_id.slot().and_then(|slot| self.branches.get(slot))
    }

    /// Intra-method position of the instruction behind a branch id
    #[must_use]
    pub fn position_for(&self, branch_id: BranchId) -> Option<u32> {
        self.lookup_by_id(branch_id)
            .map(|branch| branch.instruction().position())
    }

    /// All branches in id order
    pub fn branches(&self) -> impl Iterator<Item = &Branch> + '_ {
        self.branches.iter()
    }

    /// Names of all classes that contain at least one branch
    #[must_use]
    pub fn known_classes(&self) -> BTreeSet<String> {
        self.classes.iter().map(|c| c.name.clone()).collect()
    }

    /// Signatures of the methods of `class_name` that contain branches
    #[must_use]
    pub fn known_methods(&self, class_name: &str) -> BTreeSet<String> {
        self.class_index
            .get(class_name)
            .map(|class| {
                self.classes[class.get()]
                    .methods
                    .iter()
                    .map(|m| self.methods[m.get()].signature.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Branches of one method in discovery order (empty if unknown)
    #[must_use]
    pub fn branches_in(&self, class_name: &str, method_signature: &str) -> Vec<Branch> {
        self.method_entry(class_name, method_signature)
            .map(|entry| {
                entry
                    .branches
                    .iter()
                    .filter_map(|id| self.lookup_by_id(*id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Verify that every branch sits in exactly one method bucket and that
    /// ids are dense
    pub fn check_consistency(&self) -> GoalfitResult<()> {
        let mut seen = HashSet::with_capacity(self.branches.len());
        for method in &self.methods {
            let class = &self.classes[method.class.get()];
            for id in &method.branches {
                let branch = self.lookup_by_id(*id).ok_or_else(|| inconsistent(format!(
                    "bucket {}.{} holds unknown {}",
                    class.name, method.signature, id
                )))?;
                if branch.class_name() != class.name || branch.method_signature() != method.signature {
                    return Err(inconsistent(format!(
                        "{} filed under {}.{}",
                        branch, class.name, method.signature
                    )));
                }
                if !seen.insert(*id) {
                    return Err(inconsistent(format!("{} filed twice", id)));
                }
            }
        }
        if seen.len() != self.branches.len() {
            return Err(inconsistent(format!(
                "{} branches registered, {} filed",
                self.branches.len(),
                seen.len()
            )));
        }
        for (slot, branch) in self.branches.iter().enumerate() {
            if branch.branch_id().slot() != Some(slot) {
                return Err(inconsistent(format!("{} stored at slot {}", branch.branch_id(), slot)));
            }
            if self.registered.get(branch.instruction()) != Some(&branch.branch_id()) {
                return Err(inconsistent(format!("{} missing from ledger", branch.branch_id())));
            }
        }
        Ok(())
    }

    /// Hand the registry to the search phase; no further writes are possible
    #[must_use]
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Drop all state at session teardown
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn inconsistent(message: String) -> GoalfitError {
    GoalfitError::InvariantViolation { message }
}
