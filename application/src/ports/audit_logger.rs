//! Port for the structured audit trail.
//!
//! Defines the [`AuditLogger`] trait for recording run and execution events
//! (run creation, state transitions, approvals, tool dispatch and outcome) to
//! a machine-readable log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! diagnostic messages, while this port captures who decided what and when.

use opsgate_domain::run::{AgentRun, RunId, RunStatus, ToolExecution};
use serde_json::{Value, json};

/// A structured audit event.
///
/// Each event has a type string and a JSON payload; the writer adds the
/// timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    /// Event type identifier (e.g., "run_created", "execution_approved").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl AuditEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    pub fn run_created(run: &AgentRun) -> Self {
        Self::new(
            "run_created",
            json!({
                "run_id": run.id,
                "conversation_id": run.conversation_id,
                "goal": run.goal,
                "steps": run.steps().len(),
            }),
        )
    }

    pub fn run_transition(run_id: &RunId, from: RunStatus, to: RunStatus) -> Self {
        Self::new(
            "run_transition",
            json!({
                "run_id": run_id,
                "from": from.as_str(),
                "to": to.as_str(),
            }),
        )
    }

    pub fn execution_created(exec: &ToolExecution) -> Self {
        Self::new(
            "execution_created",
            json!({
                "execution_id": exec.id,
                "run_id": exec.run_id,
                "step_id": exec.step_id,
                "tool": exec.tool_name,
                "requires_approval": exec.requires_approval,
            }),
        )
    }

    pub fn execution_approved(exec: &ToolExecution) -> Self {
        Self::new(
            "execution_approved",
            json!({
                "execution_id": exec.id,
                "tool": exec.tool_name,
                "approved_by": exec.approved_by,
            }),
        )
    }

    pub fn execution_rejected(exec: &ToolExecution) -> Self {
        Self::new(
            "execution_rejected",
            json!({
                "execution_id": exec.id,
                "tool": exec.tool_name,
                "rejected_by": exec.rejected_by,
            }),
        )
    }

    pub fn execution_started(exec: &ToolExecution) -> Self {
        Self::new(
            "execution_started",
            json!({
                "execution_id": exec.id,
                "run_id": exec.run_id,
                "tool": exec.tool_name,
            }),
        )
    }

    pub fn execution_finished(exec: &ToolExecution) -> Self {
        Self::new(
            "execution_finished",
            json!({
                "execution_id": exec.id,
                "run_id": exec.run_id,
                "tool": exec.tool_name,
                "status": exec.status.as_str(),
                "error": exec.error,
                "duration_ms": exec.duration_ms(),
            }),
        )
    }
}

/// Port for recording audit events.
///
/// The `log` method is synchronous and non-fallible: a broken audit sink must
/// not fail the operation being audited.
pub trait AuditLogger: Send + Sync {
    fn log(&self, event: AuditEvent);
}

/// No-op implementation for tests and when auditing is disabled.
pub struct NoAuditLog;

impl AuditLogger for NoAuditLog {
    fn log(&self, _event: AuditEvent) {}
}
