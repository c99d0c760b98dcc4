//! Type definitions for the run orchestrator.

use crate::catalog::CatalogError;
use crate::ports::run_repository::RepositoryError;
use opsgate_domain::core::error::{DomainError, ErrorCode};
use opsgate_domain::run::{AgentRun, ExecutionId, RunStatus, ToolExecution};
use serde::Serialize;
use thiserror::Error;

/// Errors that abort an orchestrator operation.
///
/// Tool failures are not errors here: they are recorded on the execution and
/// surface as [`OrchestrationOutcome::Failed`].
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    #[error("Run {0} is busy")]
    Busy(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl OrchestratorError {
    pub fn code(&self) -> ErrorCode {
        match self {
            OrchestratorError::NotFound(_) => ErrorCode::NotFound,
            OrchestratorError::BadRequest(_) | OrchestratorError::Busy(_) => ErrorCode::BadRequest,
            OrchestratorError::InvalidPlan(_) => ErrorCode::ValidationError,
            OrchestratorError::Domain(e) => e.code(),
            OrchestratorError::Repository(e) => e.code(),
            OrchestratorError::Catalog(e) => e.code(),
        }
    }
}

/// Where a run stands after one `orchestrate` pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrchestrationOutcome {
    /// Paused on a step that needs a human decision
    WaitApproval {
        execution_id: ExecutionId,
        tool_name: String,
    },
    /// A handler started earlier has not recorded an outcome
    Executing { execution_id: ExecutionId },
    Completed { summary: String },
    Failed { error: String },
    Cancelled,
}

impl OrchestrationOutcome {
    pub fn state(&self) -> &'static str {
        match self {
            OrchestrationOutcome::WaitApproval { .. } => "WAIT_APPROVAL",
            OrchestrationOutcome::Executing { .. } => "EXECUTING",
            OrchestrationOutcome::Completed { .. } => "COMPLETED",
            OrchestrationOutcome::Failed { .. } => "FAILED",
            OrchestrationOutcome::Cancelled => "CANCELLED",
        }
    }

    /// The outcome recorded on an already-terminal run.
    pub fn for_terminal(run: &AgentRun) -> Option<Self> {
        match run.status {
            RunStatus::Completed => Some(OrchestrationOutcome::Completed {
                summary: run.result.clone().unwrap_or_default(),
            }),
            RunStatus::Failed => Some(OrchestrationOutcome::Failed {
                error: run.error.clone().unwrap_or_default(),
            }),
            RunStatus::Cancelled => Some(OrchestrationOutcome::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrchestrationOutcome::Completed { .. }
                | OrchestrationOutcome::Failed { .. }
                | OrchestrationOutcome::Cancelled
        )
    }
}

impl std::fmt::Display for OrchestrationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.state())
    }
}

/// Snapshot of a run and its executions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStatusReport {
    pub state: RunStatus,
    pub run: AgentRun,
    /// Executions in creation order
    pub executions: Vec<ToolExecution>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_labels() {
        let outcome = OrchestrationOutcome::WaitApproval {
            execution_id: ExecutionId::new("e1"),
            tool_name: "domain_delete".into(),
        };
        assert_eq!(outcome.state(), "WAIT_APPROVAL");
        assert!(!outcome.is_terminal());
        assert!(OrchestrationOutcome::Cancelled.is_terminal());
    }

    #[test]
    fn test_outcome_serializes_with_state_tag() {
        let outcome = OrchestrationOutcome::WaitApproval {
            execution_id: ExecutionId::new("e1"),
            tool_name: "domain_delete".into(),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["state"], "WAIT_APPROVAL");
        assert_eq!(value["execution_id"], "e1");
        assert_eq!(value["tool_name"], "domain_delete");
    }

    #[test]
    fn test_for_terminal() {
        let mut run = AgentRun::new("r1", "c1", "goal");
        assert!(OrchestrationOutcome::for_terminal(&run).is_none());
        run.fail("Run has no plan steps").unwrap();
        assert_eq!(
            OrchestrationOutcome::for_terminal(&run),
            Some(OrchestrationOutcome::Failed {
                error: "Run has no plan steps".into()
            })
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(OrchestratorError::Busy("r1".into()).code(), ErrorCode::BadRequest);
        assert_eq!(
            OrchestratorError::Domain(DomainError::PlanAlreadySet("r1".into())).code(),
            ErrorCode::BadRequest
        );
        assert_eq!(
            OrchestratorError::Repository(RepositoryError::NotFound("r1".into())).code(),
            ErrorCode::NotFound
        );
    }
}
