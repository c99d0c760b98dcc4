//! Application layer for opsgate
//!
//! This crate contains the tool catalog, the use cases (selection, gated
//! execution, run orchestration), port definitions, and application
//! configuration. It depends only on the domain layer.

pub mod catalog;
pub mod config;
pub mod control_plane;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use catalog::{CatalogEntry, CatalogError, ToolCatalog};
pub use config::{OrchestratorParams, SelectionParams};
pub use control_plane::ControlPlane;
pub use ports::{
    audit_logger::{AuditEvent, AuditLogger, NoAuditLog},
    run_repository::{InMemoryRunRepository, RepositoryError, RunRepository},
    tool_handler::{FnHandler, HandlerError, ToolHandler, UnimplementedHandler},
};
pub use use_cases::execute_tool::ExecutionGate;
pub use use_cases::orchestrate_run::{
    OrchestrationOutcome, OrchestratorError, RunOrchestrator, RunStatusReport,
};
pub use use_cases::select_tools::{SelectToolsUseCase, SelectionOptions};
