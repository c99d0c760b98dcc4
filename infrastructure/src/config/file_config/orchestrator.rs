//! Orchestrator configuration from TOML (`[orchestrator]` section)
//!
//! Both bounds are optional; when omitted the orchestrator waits indefinitely.
//!
//! ```toml
//! [orchestrator]
//! handler_timeout_secs = 120
//! lock_timeout_secs = 10
//! ```

use opsgate_application::OrchestratorParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw orchestrator configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOrchestratorConfig {
    /// Upper bound on one handler invocation, in seconds
    pub handler_timeout_secs: Option<u64>,
    /// Upper bound on waiting for a busy run, in seconds
    pub lock_timeout_secs: Option<u64>,
}

impl FileOrchestratorConfig {
    pub fn to_orchestrator_params(&self) -> OrchestratorParams {
        OrchestratorParams::default()
            .with_handler_timeout(self.handler_timeout_secs.map(Duration::from_secs))
            .with_lock_timeout(self.lock_timeout_secs.map(Duration::from_secs))
    }
}
