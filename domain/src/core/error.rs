//! Domain error types
//!
//! [`ErrorCode`] is the taxonomy shared by every layer: tool results carry it
//! inside [`ToolError`](crate::tool::ToolError), and every error enum in the
//! workspace maps onto it through a `code()` method.

use crate::run::{ExecutionStatus, RunStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error classification exposed to callers.
///
/// | Code | Meaning |
/// |------|---------|
/// | `NOT_FOUND` | Unknown tool, run, or execution |
/// | `VALIDATION_ERROR` | Parameters or plan do not match their schema |
/// | `UNAUTHORIZED` | Policy denial, reported as a normal failed result |
/// | `BAD_REQUEST` | Illegal state transition or approval change |
/// | `INTERNAL` | A handler failed unexpectedly |
/// | `TIMEOUT` | A handler exceeded its configured time bound |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    Unauthorized,
    BadRequest,
    Internal,
    Timeout,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::Internal => "INTERNAL",
            ErrorCode::Timeout => "TIMEOUT",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Illegal run transition: {from} -> {to}")]
    IllegalRunTransition { from: RunStatus, to: RunStatus },

    #[error("Illegal execution transition: {from} -> {to}")]
    IllegalExecutionTransition {
        from: ExecutionStatus,
        to: ExecutionStatus,
    },

    #[error("Plan is already set for run {0}")]
    PlanAlreadySet(String),

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    #[error("Invalid tool name '{0}': expected <namespace>_<action>")]
    InvalidToolName(String),
}

impl DomainError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::IllegalRunTransition { .. }
            | DomainError::IllegalExecutionTransition { .. }
            | DomainError::PlanAlreadySet(_) => ErrorCode::BadRequest,
            DomainError::InvalidPlan(_) | DomainError::InvalidToolName(_) => {
                ErrorCode::ValidationError
            }
        }
    }
}
