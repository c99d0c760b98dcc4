//! Run domain module
//!
//! Contains the multi-step run entities ([`AgentRun`], [`Plan`],
//! [`PlanStep`]) and the per-invocation [`ToolExecution`] record, each with
//! its own checked state machine. The orchestration logic that drives them
//! lives in the application layer.

pub mod entities;
pub mod tool_execution;
pub mod value_objects;

pub use entities::{AgentRun, Plan, PlanStep, RunStatus};
pub use tool_execution::{ExecutionStatus, ToolExecution};
pub use value_objects::{ConversationId, ExecutionId, RunId, StepId};
