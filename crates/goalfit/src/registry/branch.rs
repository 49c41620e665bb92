//! Branch: a registered decision point.

use super::{BranchId, InstructionRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A structural coverage target wrapping one decision instruction
///
/// Created exactly once per distinct decision instruction and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Branch {
    branch_id: BranchId,
    instruction: InstructionRef,
    line_number: u32,
}

impl Branch {
    pub(crate) const fn new(branch_id: BranchId, instruction: InstructionRef, line_number: u32) -> Self {
        Self {
            branch_id,
            instruction,
            line_number,
        }
    }

    /// Assigned branch id
    #[must_use]
    pub const fn branch_id(&self) -> BranchId {
        self.branch_id
    }

    /// Source line number of the decision point
    #[must_use]
    pub const fn line_number(&self) -> u32 {
        self.line_number
    }

    /// Owning class name
    #[must_use]
    pub fn class_name(&self) -> &str {
        self.instruction.class_name()
    }

    /// Owning method signature
    #[must_use]
    pub fn method_signature(&self) -> &str {
        self.instruction.method_signature()
    }

    /// The wrapped instruction reference
    #[must_use]
    pub const fn instruction(&self) -> &InstructionRef {
        &self.instruction
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}.{} line {}",
            self.branch_id,
            self.class_name(),
            self.method_signature(),
            self.line_number
        )
    }
}
