//! Fitness Engine Configuration
//!
//! Loaded from YAML or JSON, or assembled with [`FitnessConfig::builder`].
//!
//! ```yaml
//! archive_enabled: true
//! check_invariants: true
//! log_status: false
//! ```

use crate::result::{GoalfitError, GoalfitResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration of one suite fitness function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessConfig {
    /// Register goals with an archive, report observations to it, and
    /// permanently remove satisfied goals between generations
    pub archive_enabled: bool,
    /// Verify fitness/coverage invariants after every evaluation
    pub check_invariants: bool,
    /// Log an info line whenever the best coverage or fitness improves
    pub log_status: bool,
}

impl FitnessConfig {
    /// Create a builder for fitness config
    #[must_use]
    pub fn builder() -> FitnessConfigBuilder {
        FitnessConfigBuilder::default()
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> GoalfitResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> GoalfitResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a `.yaml`, `.yml` or `.json` file
    pub fn from_file(path: &Path) -> GoalfitResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            other => Err(GoalfitError::Config {
                message: format!(
                    "unsupported config extension {:?} for {}",
                    other.unwrap_or(""),
                    path.display()
                ),
            }),
        }
    }

    /// Serialize as YAML
    pub fn to_yaml(&self) -> GoalfitResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            archive_enabled: false,
            check_invariants: true,
            log_status: true,
        }
    }
}

/// Builder for fitness configuration
#[derive(Debug)]
pub struct FitnessConfigBuilder {
    archive_enabled: bool,
    check_invariants: bool,
    log_status: bool,
}

impl Default for FitnessConfigBuilder {
    fn default() -> Self {
        let defaults = FitnessConfig::default();
        Self {
            archive_enabled: defaults.archive_enabled,
            check_invariants: defaults.check_invariants,
            log_status: defaults.log_status,
        }
    }
}

impl FitnessConfigBuilder {
    /// Enable archive mode
    #[must_use]
    pub const fn archive_enabled(mut self, enabled: bool) -> Self {
        self.archive_enabled = enabled;
        self
    }

    /// Enable invariant checks
    #[must_use]
    pub const fn check_invariants(mut self, enabled: bool) -> Self {
        self.check_invariants = enabled;
        self
    }

    /// Enable status logging
    #[must_use]
    pub const fn log_status(mut self, enabled: bool) -> Self {
        self.log_status = enabled;
        self
    }

    /// Build the configuration
    #[must_use]
    pub const fn build(self) -> FitnessConfig {
        FitnessConfig {
            archive_enabled: self.archive_enabled,
            check_invariants: self.check_invariants,
            log_status: self.log_status,
        }
    }
}
