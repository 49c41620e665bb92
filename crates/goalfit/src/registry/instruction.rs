//! Program instruction references handed over by static analysis.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of one instruction in the compiled target program
///
/// Identified by containing class, containing method signature and the
/// intra-method position. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstructionRef {
    class_name: String,
    method_signature: String,
    position: u32,
}

impl InstructionRef {
    /// Create a new instruction reference
    #[must_use]
    pub fn new(class_name: &str, method_signature: &str, position: u32) -> Self {
        Self {
            class_name: class_name.to_string(),
            method_signature: method_signature.to_string(),
            position,
        }
    }

    /// Containing class name
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Containing method signature
    #[must_use]
    pub fn method_signature(&self) -> &str {
        &self.method_signature
    }

    /// Position of the instruction inside its method
    #[must_use]
    pub const fn position(&self) -> u32 {
        self.position
    }
}

impl fmt::Display for InstructionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}@{}",
            self.class_name, self.method_signature, self.position
        )
    }
}

/// Coarse classification of an instruction, as far as the registry cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionKind {
    /// Two-way conditional jump
    ConditionalJump,
    /// Multi-way table or lookup switch
    Switch,
    /// Unconditional jump
    Goto,
    /// Method return
    Return,
    /// Anything else
    Other,
}

impl InstructionKind {
    /// Whether instructions of this kind are decision points
    #[must_use]
    pub const fn is_decision_point(self) -> bool {
        matches!(self, Self::ConditionalJump | Self::Switch)
    }
}

/// An instruction discovered by static analysis, ready for registration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    reference: InstructionRef,
    line_number: u32,
    kind: InstructionKind,
}

impl Instruction {
    /// Create a new instruction
    #[must_use]
    pub const fn new(reference: InstructionRef, line_number: u32, kind: InstructionKind) -> Self {
        Self {
            reference,
            line_number,
            kind,
        }
    }

    /// Shorthand for a conditional jump at the given location
    #[must_use]
    pub fn conditional_jump(
        class_name: &str,
        method_signature: &str,
        position: u32,
        line_number: u32,
    ) -> Self {
        Self::new(
            InstructionRef::new(class_name, method_signature, position),
            line_number,
            InstructionKind::ConditionalJump,
        )
    }

    /// The location of this instruction
    #[must_use]
    pub const fn reference(&self) -> &InstructionRef {
        &self.reference
    }

    /// Source line number
    #[must_use]
    pub const fn line_number(&self) -> u32 {
        self.line_number
    }

    /// Instruction kind
    #[must_use]
    pub const fn kind(&self) -> InstructionKind {
        self.kind
    }

    /// Whether this instruction is an actual branch
    #[must_use]
    pub const fn is_decision_point(&self) -> bool {
        self.kind.is_decision_point()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {})", self.reference, self.line_number)
    }
}
