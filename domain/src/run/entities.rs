//! Run domain entities
//!
//! An [`AgentRun`] owns an ordered [`Plan`] of [`PlanStep`]s and moves
//! through [`RunStatus`] according to a fixed transition table:
//!
//! ```text
//! pending ──▶ planning ──▶ executing ──▶ verifying ──▶ completed
//!                 │          ▲    │
//!                 └──▶ waiting_approval
//!
//! any non-terminal ──▶ cancelled | failed
//! ```

use super::value_objects::{ConversationId, RunId, StepId};
use crate::core::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Status of an agent run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Run created, not yet started
    #[default]
    Pending,
    /// Plan accepted, not yet dispatched (never a pause point)
    Planning,
    /// The next unexecuted step awaits a human decision
    WaitingApproval,
    /// Steps are being dispatched
    Executing,
    /// All steps completed; run is finalizing
    Verifying,
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::Planning => "planning",
            RunStatus::WaitingApproval => "waiting_approval",
            RunStatus::Executing => "executing",
            RunStatus::Verifying => "verifying",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Cancelled
        )
    }

    /// Statuses reachable from this one in a single transition.
    pub fn allowed_transitions(&self) -> &'static [RunStatus] {
        use RunStatus::*;
        match self {
            Pending => &[Planning, Cancelled, Failed],
            Planning => &[Executing, WaitingApproval, Cancelled, Failed],
            WaitingApproval => &[Executing, Cancelled, Failed],
            Executing => &[Verifying, WaitingApproval, Cancelled, Failed],
            Verifying => &[Completed, Cancelled, Failed],
            Completed | Failed | Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: RunStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single step within a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    pub id: StepId,
    pub tool_name: String,
    pub description: String,
    /// Raw parameters, validated against the tool schema at dispatch
    pub parameters: serde_json::Value,
    /// Step-level approval request; combined with the tool's own flag
    pub requires_approval: bool,
}

impl PlanStep {
    pub fn new(
        id: impl Into<StepId>,
        tool_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            tool_name: tool_name.into(),
            description: description.into(),
            parameters: serde_json::Value::Object(Default::default()),
            requires_approval: false,
        }
    }

    pub fn with_params(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_approval(mut self) -> Self {
        self.requires_approval = true;
        self
    }
}

/// Ordered list of steps. Immutable once attached to a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step(mut self, step: PlanStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn step(&self, id: &StepId) -> Option<&PlanStep> {
        self.steps.iter().find(|s| &s.id == id)
    }

    /// Check structural invariants: unique step ids and non-empty tool names.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        for step in &self.steps {
            if step.tool_name.trim().is_empty() {
                return Err(DomainError::InvalidPlan(format!(
                    "step '{}' has no tool",
                    step.id
                )));
            }
            if !seen.insert(&step.id) {
                return Err(DomainError::InvalidPlan(format!(
                    "duplicate step id '{}'",
                    step.id
                )));
            }
        }
        Ok(())
    }
}

/// One multi-step, agent-driven objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRun {
    pub id: RunId,
    pub conversation_id: ConversationId,
    pub goal: String,
    pub status: RunStatus,
    pub plan: Option<Plan>,
    /// Summary recorded on completion
    pub result: Option<String>,
    /// User-facing failure or cancellation reason
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl AgentRun {
    pub fn new(
        id: impl Into<RunId>,
        conversation_id: impl Into<ConversationId>,
        goal: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            conversation_id: conversation_id.into(),
            goal: goal.into(),
            status: RunStatus::Pending,
            plan: None,
            result: None,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn with_plan(mut self, plan: Plan) -> Self {
        self.plan = Some(plan);
        self
    }

    /// Attach a plan. Only allowed once, before the run has started.
    pub fn set_plan(&mut self, plan: Plan) -> Result<(), DomainError> {
        if self.plan.is_some() || self.status != RunStatus::Pending {
            return Err(DomainError::PlanAlreadySet(self.id.to_string()));
        }
        plan.validate()?;
        self.plan = Some(plan);
        Ok(())
    }

    pub fn steps(&self) -> &[PlanStep] {
        self.plan.as_ref().map(|p| p.steps.as_slice()).unwrap_or(&[])
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Move to `next`, leaving the run untouched if the transition is illegal.
    pub fn transition(&mut self, next: RunStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::IllegalRunTransition {
                from: self.status,
                to: next,
            });
        }
        let now = Utc::now();
        if self.status == RunStatus::Pending {
            self.started_at.get_or_insert(now);
        }
        if next.is_terminal() {
            self.completed_at = Some(now);
        }
        self.status = next;
        Ok(())
    }

    pub fn complete(&mut self, summary: impl Into<String>) -> Result<(), DomainError> {
        self.transition(RunStatus::Completed)?;
        self.result = Some(summary.into());
        Ok(())
    }

    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), DomainError> {
        self.transition(RunStatus::Failed)?;
        self.error = Some(error.into());
        Ok(())
    }

    pub fn cancel(&mut self, reason: Option<String>) -> Result<(), DomainError> {
        self.transition(RunStatus::Cancelled)?;
        if reason.is_some() {
            self.error = reason;
        }
        Ok(())
    }
}
