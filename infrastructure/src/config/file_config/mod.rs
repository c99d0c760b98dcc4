//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application parameter
//! structs with the `into_*` methods.

mod logging;
mod orchestrator;
mod selection;

pub use logging::FileLoggingConfig;
pub use orchestrator::FileOrchestratorConfig;
pub use selection::FileSelectionConfig;

use opsgate_application::{OrchestratorParams, SelectionParams};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("selection.max_tools cannot be 0")]
    ZeroMaxTools,

    #[error("selection.min_tools ({min}) exceeds selection.max_tools ({max})")]
    MinExceedsMax { min: usize, max: usize },

    #[error("{field} cannot be 0")]
    ZeroTimeout { field: &'static str },

    #[error("logging.level '{0}' is not a valid filter directive")]
    InvalidLevel(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Tool selection bounds
    pub selection: FileSelectionConfig,
    /// Orchestrator time bounds
    pub orchestrator: FileOrchestratorConfig,
    /// Tracing and audit output
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        if self.selection.max_tools == 0 {
            issues.push(ConfigValidationError::ZeroMaxTools);
        } else if self.selection.min_tools > self.selection.max_tools {
            issues.push(ConfigValidationError::MinExceedsMax {
                min: self.selection.min_tools,
                max: self.selection.max_tools,
            });
        }

        if self.orchestrator.handler_timeout_secs == Some(0) {
            issues.push(ConfigValidationError::ZeroTimeout {
                field: "orchestrator.handler_timeout_secs",
            });
        }
        if self.orchestrator.lock_timeout_secs == Some(0) {
            issues.push(ConfigValidationError::ZeroTimeout {
                field: "orchestrator.lock_timeout_secs",
            });
        }

        if self.logging.level.trim().is_empty()
            || tracing_subscriber::EnvFilter::try_new(&self.logging.level).is_err()
        {
            issues.push(ConfigValidationError::InvalidLevel(
                self.logging.level.clone(),
            ));
        }

        issues
    }

    pub fn to_selection_params(&self) -> SelectionParams {
        self.selection.to_selection_params()
    }

    pub fn to_orchestrator_params(&self) -> OrchestratorParams {
        self.orchestrator.to_orchestrator_params()
    }
}
