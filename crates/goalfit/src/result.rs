//! Result and error types for goalfit.

use thiserror::Error;

/// Result type for goalfit operations
pub type GoalfitResult<T> = Result<T, GoalfitError>;

/// Errors that can occur while registering targets or scoring suites
///
/// A bad test suite never produces one of these. Timeouts and uncaught
/// exceptions are scored, not raised; every variant here means the analysis
/// pipeline or the engine itself is in an inconsistent state.
#[derive(Debug, Error)]
pub enum GoalfitError {
    /// An instruction was handed to the registry a second time
    #[error("Branch already registered: {instruction}")]
    DuplicateRegistration {
        /// Display form of the offending instruction reference
        instruction: String,
    },

    /// An instruction that is not a decision point was registered as a branch
    #[error("Instruction is not a decision point: {instruction}")]
    NotABranch {
        /// Display form of the offending instruction reference
        instruction: String,
    },

    /// A goal queued for removal is no longer in the active set
    #[error("Goal to remove not found in active set: {goal}")]
    GoalNotFound {
        /// Display form of the missing goal
        goal: String,
    },

    /// A post-evaluation fitness invariant did not hold
    #[error("Fitness invariant violated: {message}")]
    InvariantViolation {
        /// Description of the violated invariant
        message: String,
    },

    /// An execution result names a test the suite does not contain
    #[error("Execution result refers to unknown test {test}")]
    UnknownTest {
        /// Raw test id
        test: u64,
    },

    /// Configuration could not be interpreted
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl GoalfitError {
    /// Whether this error indicates a broken internal invariant rather than
    /// a bad input file
    #[must_use]
    pub const fn is_consistency_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateRegistration { .. }
                | Self::NotABranch { .. }
                | Self::GoalNotFound { .. }
                | Self::InvariantViolation { .. }
                | Self::UnknownTest { .. }
        )
    }
}
