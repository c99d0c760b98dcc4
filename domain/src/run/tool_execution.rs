//! Tool execution state machine.
//!
//! Tracks the lifecycle of a single invocation attempt, whether it belongs to
//! a run's plan step or was submitted ad hoc.
//!
//! # State Transitions
//!
//! ```text
//! Pending ──> Approved ──> Executing ──> Completed
//!    │                             └──> Failed
//!    └──> Rejected
//! ```
//!
//! Executions that do not require approval are created directly in
//! `Approved`. Every other move is checked; an illegal one returns an error
//! and leaves the record unchanged.

use super::entities::PlanStep;
use super::value_objects::{ExecutionId, RunId, StepId};
use crate::core::error::DomainError;
use crate::tool::value_objects::ToolResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a tool execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Awaiting a human decision
    Pending,
    /// Cleared to run (approved, or approval not required)
    Approved,
    Rejected,
    /// Handler dispatched; no outcome recorded yet
    Executing,
    Completed,
    Failed,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ExecutionStatus::Pending => "pending",
            ExecutionStatus::Approved => "approved",
            ExecutionStatus::Rejected => "rejected",
            ExecutionStatus::Executing => "executing",
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Rejected | ExecutionStatus::Completed | ExecutionStatus::Failed
        )
    }

    pub fn can_transition_to(&self, next: ExecutionStatus) -> bool {
        use ExecutionStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Approved, Executing)
                | (Executing, Completed)
                | (Executing, Failed)
        )
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One concrete attempt to run a tool with specific parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExecution {
    pub id: ExecutionId,
    /// Owning run; `None` for ad-hoc calls
    pub run_id: Option<RunId>,
    /// Plan step this execution realizes; `None` for ad-hoc calls
    pub step_id: Option<StepId>,
    pub tool_name: String,
    /// Parameters as submitted
    pub parameters: serde_json::Value,
    pub status: ExecutionStatus,
    /// Captured at creation; later policy changes do not affect it
    pub requires_approval: bool,
    pub result: Option<ToolResult>,
    pub error: Option<String>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_by: Option<String>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ToolExecution {
    fn create(
        id: ExecutionId,
        run_id: Option<RunId>,
        step_id: Option<StepId>,
        tool_name: String,
        parameters: serde_json::Value,
        requires_approval: bool,
    ) -> Self {
        Self {
            id,
            run_id,
            step_id,
            tool_name,
            parameters,
            status: if requires_approval {
                ExecutionStatus::Pending
            } else {
                ExecutionStatus::Approved
            },
            requires_approval,
            result: None,
            error: None,
            approved_by: None,
            approved_at: None,
            rejected_by: None,
            rejected_at: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Create the execution for a plan step.
    pub fn for_step(
        id: impl Into<ExecutionId>,
        run_id: impl Into<RunId>,
        step: &PlanStep,
        requires_approval: bool,
    ) -> Self {
        Self::create(
            id.into(),
            Some(run_id.into()),
            Some(step.id.clone()),
            step.tool_name.clone(),
            step.parameters.clone(),
            requires_approval,
        )
    }

    /// Create an execution that belongs to no run.
    pub fn ad_hoc(
        id: impl Into<ExecutionId>,
        tool_name: impl Into<String>,
        parameters: serde_json::Value,
        requires_approval: bool,
    ) -> Self {
        Self::create(
            id.into(),
            None,
            None,
            tool_name.into(),
            parameters,
            requires_approval,
        )
    }

    fn check(&self, next: ExecutionStatus) -> Result<(), DomainError> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(DomainError::IllegalExecutionTransition {
                from: self.status,
                to: next,
            })
        }
    }

    pub fn approve(&mut self, approver: impl Into<String>) -> Result<(), DomainError> {
        self.check(ExecutionStatus::Approved)?;
        self.status = ExecutionStatus::Approved;
        self.approved_by = Some(approver.into());
        self.approved_at = Some(Utc::now());
        Ok(())
    }

    pub fn reject(&mut self, rejecter: impl Into<String>) -> Result<(), DomainError> {
        self.check(ExecutionStatus::Rejected)?;
        let now = Utc::now();
        self.status = ExecutionStatus::Rejected;
        self.rejected_by = Some(rejecter.into());
        self.rejected_at = Some(now);
        self.completed_at = Some(now);
        Ok(())
    }

    pub fn mark_executing(&mut self) -> Result<(), DomainError> {
        self.check(ExecutionStatus::Executing)?;
        self.status = ExecutionStatus::Executing;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    pub fn mark_completed(&mut self, result: ToolResult) -> Result<(), DomainError> {
        self.check(ExecutionStatus::Completed)?;
        self.status = ExecutionStatus::Completed;
        self.result = Some(result);
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    pub fn mark_failed(
        &mut self,
        message: impl Into<String>,
        result: Option<ToolResult>,
    ) -> Result<(), DomainError> {
        self.check(ExecutionStatus::Failed)?;
        self.status = ExecutionStatus::Failed;
        self.error = Some(message.into());
        self.result = result;
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Duration in milliseconds (only available once finished).
    pub fn duration_ms(&self) -> Option<i64> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }
}
