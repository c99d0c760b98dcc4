//! Infrastructure layer for opsgate
//!
//! This crate contains adapters for the ports and use cases defined in the
//! application layer: the keyword intent classifier, the platform tool
//! definitions, the JSONL audit log, configuration file loading, tracing
//! setup, and the bootstrap that wires them into a `ControlPlane`.

pub mod bootstrap;
pub mod config;
pub mod logging;
pub mod platform;
pub mod selection;

// Re-export commonly used types
pub use bootstrap::{BootstrapError, ControlPlaneBuilder, build_control_plane};
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileLoggingConfig, FileOrchestratorConfig,
    FileSelectionConfig,
};
pub use logging::{JsonlAuditLogger, init_tracing};
pub use platform::{platform_definitions, register_platform_tools};
pub use selection::KeywordIntentClassifier;
