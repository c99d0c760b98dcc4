//! Orchestrator parameters: time bounds for dispatch.
//!
//! [`OrchestratorParams`] controls how long the
//! [`ExecutionGate`](crate::use_cases::execute_tool::ExecutionGate) lets a
//! handler run and how long an orchestrator call waits for a busy run.
//! Neither bound is set by default.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorParams {
    /// Upper bound on one handler invocation; exceeding it fails with `TIMEOUT`.
    pub handler_timeout: Option<Duration>,
    /// Upper bound on waiting for another caller holding the same run.
    pub lock_timeout: Option<Duration>,
}

impl OrchestratorParams {
    pub fn with_handler_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.handler_timeout = timeout;
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.lock_timeout = timeout;
        self
    }
}
