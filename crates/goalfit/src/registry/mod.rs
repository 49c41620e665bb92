//! Goal Registry
//!
//! Assigns stable, dense integer ids to the decision points static analysis
//! discovers, indexed by class and method.
//!
//! ```text
//! static analysis ──Instruction──► GoalRegistry::register ──BranchId──► BranchIdSink (CFG)
//!                                        │
//!                                        ▼
//!                          Arc<GoalRegistry> (read-only during search)
//! ```

mod branch;
mod ids;
mod instruction;
mod pool;

pub use branch::Branch;
pub use ids::BranchId;
pub use instruction::{Instruction, InstructionKind, InstructionRef};
pub use pool::{BranchIdSink, GoalRegistry};
