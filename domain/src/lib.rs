//! Domain layer for opsgate
//!
//! This crate contains the core vocabulary for safe infrastructure tool use:
//! tool definitions and schemas, relevance ranking, and the run and execution
//! state machines. It has no dependencies on infrastructure concerns and
//! performs no I/O.
//!
//! # Core Concepts
//!
//! - **Tool**: a named, typed operation with a risk tier and an approval flag
//! - **Selection**: deterministic narrowing of the catalog for one request
//! - **Run**: a multi-step objective executed one plan step at a time, pausing
//!   whenever a step needs a human decision

pub mod core;
pub mod run;
pub mod selection;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use core::error::{DomainError, ErrorCode};
pub use run::{
    AgentRun, ConversationId, ExecutionId, ExecutionStatus, Plan, PlanStep, RunId, RunStatus,
    StepId, ToolExecution,
};
pub use selection::{
    Intent, IntentClassifier, IntentSignals, QueryOnlyClassifier, RankingLimits, ScopeHints,
    ToolRanker,
};
pub use tool::{
    ExecutionContext, FieldError, FieldRules, FieldSpec, FieldType, ParameterSchema, RiskLevel,
    SchemaValidator, ToolDefinition, ToolError, ToolResult, ToolValidator, ValidatedParams,
};
