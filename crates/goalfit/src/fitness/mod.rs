//! Suite Fitness Engine
//!
//! ```text
//! ┌──────────────┐   results    ┌──────────────┐  Evaluation  ┌────────────────┐
//! │ TestExecutor │ ───────────► │ SuiteFitness │ ───────────► │ Archive (opt.) │
//! └──────────────┘              └──────┬───────┘ observations └────────────────┘
//!                                      │ update_covered_goals()
//!                                      ▼
//!                               GoalSet: active ──► removed
//! ```

mod archived;
mod engine;
mod evaluation;
mod report;
mod status;
mod violation;

pub use archived::{deliver_observations, ArchivedSuiteFitness};
pub use engine::SuiteFitness;
pub use evaluation::{Evaluation, Observation};
pub use report::FitnessReport;
pub use status::{StatusTracker, StatusUpdate};
pub use violation::{FitnessViolation, ViolationAction};

#[cfg(test)]
mod tests;
