//! Approval decisions and ad-hoc executions.
//!
//! Approval and rejection only accept an execution in `pending` whose run,
//! if any, is still live. Neither resumes the owning run: the caller decides when to call `orchestrate`
//! again.

use super::RunOrchestrator;
use super::types::OrchestratorError;
use crate::ports::audit_logger::AuditEvent;
use opsgate_domain::core::error::DomainError;
use opsgate_domain::run::{ExecutionId, ExecutionStatus, ToolExecution};
use opsgate_domain::tool::context::ExecutionContext;
use tracing::{debug, info};

impl RunOrchestrator {
    /// Approve a pending execution.
    pub async fn approve_execution(
        &self,
        id: &ExecutionId,
        approver: impl Into<String>,
    ) -> Result<ToolExecution, OrchestratorError> {
        let approver = approver.into();
        let exec = self
            .decide(id, |exec| exec.approve(approver.clone()))
            .await?;
        info!(execution_id = %exec.id, approved_by = %approver, "Execution approved");
        self.audit.log(AuditEvent::execution_approved(&exec));
        Ok(exec)
    }

    /// Reject a pending execution. A rejected run step cancels the run on the
    /// next `orchestrate`.
    pub async fn reject_execution(
        &self,
        id: &ExecutionId,
        rejecter: impl Into<String>,
    ) -> Result<ToolExecution, OrchestratorError> {
        let rejecter = rejecter.into();
        let exec = self
            .decide(id, |exec| exec.reject(rejecter.clone()))
            .await?;
        info!(execution_id = %exec.id, rejected_by = %rejecter, "Execution rejected");
        self.audit.log(AuditEvent::execution_rejected(&exec));
        Ok(exec)
    }

    async fn decide<F>(&self, id: &ExecutionId, apply: F) -> Result<ToolExecution, OrchestratorError>
    where
        F: FnOnce(&mut ToolExecution) -> Result<(), DomainError>,
    {
        let lock_key = self
            .load_execution(id)
            .await?
            .run_id
            .map(|run_id| run_id.to_string())
            .unwrap_or_else(|| id.to_string());
        let _guard = self.locks.acquire(&lock_key).await?;

        let mut exec = self.load_execution(id).await?;
        if exec.status != ExecutionStatus::Pending {
            return Err(OrchestratorError::BadRequest(format!(
                "Execution {} is {}, not pending",
                exec.id, exec.status
            )));
        }
        if let Some(run_id) = &exec.run_id {
            let run = self.load_run(run_id).await?;
            if run.is_terminal() {
                return Err(OrchestratorError::BadRequest(format!(
                    "Run {} is {}; its executions can no longer be decided",
                    run.id, run.status
                )));
            }
        }
        apply(&mut exec)?;
        self.repository.update_execution(&exec).await?;
        Ok(exec)
    }

    /// Create an execution outside any run.
    ///
    /// It starts `pending` when the tool requires approval, else `approved`.
    /// Parameters are validated when it runs.
    pub async fn submit_execution(
        &self,
        tool_name: &str,
        parameters: serde_json::Value,
    ) -> Result<ToolExecution, OrchestratorError> {
        self.catalog.ensure_initialized()?;
        let definition = self
            .catalog
            .get(tool_name)
            .ok_or_else(|| OrchestratorError::NotFound(format!("tool {}", tool_name)))?;

        let exec = ToolExecution::ad_hoc(
            ExecutionId::generate(),
            tool_name,
            parameters,
            definition.requires_approval,
        );
        self.repository.create_execution(exec.clone()).await?;
        debug!(execution_id = %exec.id, tool = tool_name, status = %exec.status, "Ad-hoc execution submitted");
        self.audit.log(AuditEvent::execution_created(&exec));
        Ok(exec)
    }

    /// Run an approved ad-hoc execution.
    ///
    /// Executions that already ran (or are running) are returned unchanged,
    /// so the handler is invoked at most once.
    pub async fn run_execution(
        &self,
        id: &ExecutionId,
        ctx: &ExecutionContext,
    ) -> Result<ToolExecution, OrchestratorError> {
        let _guard = self.locks.acquire(id.as_str()).await?;
        let mut exec = self.load_execution(id).await?;

        if let Some(run_id) = &exec.run_id {
            return Err(OrchestratorError::BadRequest(format!(
                "Execution {} belongs to run {}; use orchestrate",
                exec.id, run_id
            )));
        }

        match exec.status {
            ExecutionStatus::Approved => {
                self.dispatch(&mut exec, ctx).await?;
                Ok(exec)
            }
            ExecutionStatus::Pending => Err(OrchestratorError::BadRequest(format!(
                "Execution {} is awaiting approval",
                exec.id
            ))),
            ExecutionStatus::Rejected => Err(OrchestratorError::BadRequest(format!(
                "Execution {} was rejected",
                exec.id
            ))),
            ExecutionStatus::Executing | ExecutionStatus::Completed | ExecutionStatus::Failed => {
                debug!(execution_id = %exec.id, status = %exec.status, "Execution already dispatched");
                Ok(exec)
            }
        }
    }
}
