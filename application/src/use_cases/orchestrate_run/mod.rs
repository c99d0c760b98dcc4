//! Run Orchestrator use case
//!
//! Drives a run's plan through the run state machine one step at a time.
//! [`RunOrchestrator::orchestrate`] is re-entrant: each call resumes from the
//! first step whose execution is not yet `completed`, so it is safe to call
//! once per approval event or after a crash.
//!
//! | Step execution | What `orchestrate` does |
//! |----------------|-------------------------|
//! | none yet | create it (`pending` if approval needed, else `approved`) and re-check |
//! | `pending` | run → `waiting_approval`, return `WAIT_APPROVAL` |
//! | `approved` | run → `executing`, dispatch through the gate, record outcome |
//! | `executing` | return `EXECUTING` without re-invoking the handler |
//! | `completed` | skip to the next step |
//! | `rejected` | cancel the run |
//! | `failed` | fail the run |
//!
//! Once every step is `completed` the run moves `executing → verifying →
//! completed` with a summary. Approval decisions never resume a run by
//! themselves; the caller invokes `orchestrate` again.
//!
//! Cancellation is cooperative: [`RunOrchestrator::request_cancel`] raises a
//! flag checked at step boundaries, while [`RunOrchestrator::cancel_run`]
//! cancels at once (waiting for any in-flight pass on the same run).

mod approval;
mod locks;
mod types;

pub use locks::{RunGuard, RunLockTable};
pub use types::{OrchestrationOutcome, OrchestratorError, RunStatusReport};

use crate::catalog::ToolCatalog;
use crate::config::OrchestratorParams;
use crate::ports::audit_logger::{AuditEvent, AuditLogger, NoAuditLog};
use crate::ports::run_repository::RunRepository;
use crate::use_cases::execute_tool::ExecutionGate;
use opsgate_domain::run::{
    AgentRun, ConversationId, ExecutionId, ExecutionStatus, Plan, PlanStep, RunId, RunStatus,
    ToolExecution,
};
use opsgate_domain::tool::context::ExecutionContext;
use opsgate_domain::util::summary_line;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Longest step message carried into a completion summary.
const SUMMARY_LINE_MAX_BYTES: usize = 200;

/// Use case for creating and driving agent runs
pub struct RunOrchestrator {
    pub(super) catalog: Arc<ToolCatalog>,
    pub(super) gate: ExecutionGate,
    pub(super) repository: Arc<dyn RunRepository>,
    pub(super) audit: Arc<dyn AuditLogger>,
    pub(super) locks: Arc<RunLockTable>,
}

impl Clone for RunOrchestrator {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog.clone(),
            gate: self.gate.clone(),
            repository: self.repository.clone(),
            audit: self.audit.clone(),
            locks: self.locks.clone(),
        }
    }
}

impl RunOrchestrator {
    pub fn new(gate: ExecutionGate, repository: Arc<dyn RunRepository>) -> Self {
        Self {
            catalog: gate.catalog().clone(),
            gate,
            repository,
            audit: Arc::new(NoAuditLog),
            locks: Arc::new(RunLockTable::new()),
        }
    }

    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// Apply handler and lock time bounds.
    pub fn with_params(mut self, params: &OrchestratorParams) -> Self {
        self.gate = self.gate.with_params(params);
        self.locks = Arc::new(RunLockTable::new().with_wait(params.lock_timeout));
        self
    }

    pub fn gate(&self) -> &ExecutionGate {
        &self.gate
    }

    // ==================== Run lifecycle ====================

    /// Create a run, optionally with its plan.
    ///
    /// The plan is checked up front: step ids must be unique and every tool
    /// must exist in the catalog. An empty plan is accepted; the run then
    /// fails on its first `orchestrate`.
    pub async fn create_run(
        &self,
        conversation_id: impl Into<ConversationId>,
        goal: impl Into<String>,
        plan: Option<Plan>,
    ) -> Result<AgentRun, OrchestratorError> {
        self.catalog.ensure_initialized()?;

        let mut run = AgentRun::new(RunId::generate(), conversation_id, goal);
        if let Some(plan) = plan {
            self.check_plan(&plan)?;
            run = run.with_plan(plan);
        }

        self.repository.insert_run(run.clone()).await?;
        info!(run_id = %run.id, steps = run.steps().len(), "Run created");
        self.audit.log(AuditEvent::run_created(&run));
        Ok(run)
    }

    /// Attach a plan to a run created without one.
    pub async fn set_plan(&self, run_id: &RunId, plan: Plan) -> Result<AgentRun, OrchestratorError> {
        self.catalog.ensure_initialized()?;
        self.check_plan(&plan)?;

        let _guard = self.locks.acquire(run_id.as_str()).await?;
        let mut run = self.load_run(run_id).await?;
        run.set_plan(plan)?;
        self.repository.update_run(&run).await?;
        info!(run_id = %run.id, steps = run.steps().len(), "Plan attached");
        Ok(run)
    }

    /// Advance a run as far as it can go without a human decision.
    ///
    /// `ctx` is passed to every handler dispatched during this pass.
    pub async fn orchestrate(
        &self,
        run_id: &RunId,
        ctx: &ExecutionContext,
    ) -> Result<OrchestrationOutcome, OrchestratorError> {
        self.catalog.ensure_initialized()?;
        let _guard = self.locks.acquire(run_id.as_str()).await?;
        let mut run = self.load_run(run_id).await?;

        if let Some(outcome) = OrchestrationOutcome::for_terminal(&run) {
            debug!(run_id = %run.id, status = %run.status, "Run already terminal");
            return Ok(outcome);
        }

        if run.steps().is_empty() {
            return self.fail_run(&mut run, "Run has no plan steps".to_string()).await;
        }

        if self.repository.is_cancel_requested(run_id).await?
            && self.repository.list_executions(run_id).await?.is_empty()
        {
            return self
                .cancel_and_report(&mut run, Some("Cancelled before start".to_string()))
                .await;
        }

        if run.status == RunStatus::Pending {
            self.move_run(&mut run, RunStatus::Planning).await?;
        }
        if run.status == RunStatus::Planning {
            self.move_run(&mut run, RunStatus::Executing).await?;
        }

        let steps = run.steps().to_vec();
        let mut finished = Vec::with_capacity(steps.len());

        for step in &steps {
            if self.repository.is_cancel_requested(run_id).await? {
                return self
                    .cancel_and_report(&mut run, Some("Cancelled by request".to_string()))
                    .await;
            }

            let mut exec = match self.repository.find_step_execution(run_id, &step.id).await? {
                Some(exec) => exec,
                None => self.create_step_execution(&run, step).await?,
            };

            match exec.status {
                ExecutionStatus::Completed => {}
                ExecutionStatus::Pending => {
                    if run.status != RunStatus::WaitingApproval {
                        self.move_run(&mut run, RunStatus::WaitingApproval).await?;
                    }
                    info!(
                        run_id = %run.id,
                        execution_id = %exec.id,
                        tool = %exec.tool_name,
                        "Run waiting for approval"
                    );
                    return Ok(OrchestrationOutcome::WaitApproval {
                        execution_id: exec.id,
                        tool_name: exec.tool_name,
                    });
                }
                ExecutionStatus::Rejected => {
                    let reason = format!("Step '{}' was rejected", step.id);
                    return self.cancel_and_report(&mut run, Some(reason)).await;
                }
                ExecutionStatus::Failed => {
                    let error = step_failure(step, &exec);
                    return self.fail_run(&mut run, error).await;
                }
                ExecutionStatus::Executing => {
                    warn!(
                        run_id = %run.id,
                        execution_id = %exec.id,
                        "Execution already in flight; not re-invoking handler"
                    );
                    return Ok(OrchestrationOutcome::Executing {
                        execution_id: exec.id,
                    });
                }
                ExecutionStatus::Approved => {
                    if run.status == RunStatus::WaitingApproval {
                        self.move_run(&mut run, RunStatus::Executing).await?;
                    }
                    self.dispatch(&mut exec, ctx).await?;
                    if exec.status == ExecutionStatus::Failed {
                        let error = step_failure(step, &exec);
                        return self.fail_run(&mut run, error).await;
                    }
                }
            }
            finished.push((step, exec));
        }

        if run.status != RunStatus::Verifying {
            self.move_run(&mut run, RunStatus::Verifying).await?;
        }
        let summary = completion_summary(&finished);
        let from = run.status;
        run.complete(summary.clone())?;
        self.persist_transition(&run, from).await?;
        Ok(OrchestrationOutcome::Completed { summary })
    }

    /// Raise the cooperative cancellation flag; observed at the next step boundary.
    pub async fn request_cancel(&self, run_id: &RunId) -> Result<(), OrchestratorError> {
        let run = self.load_run(run_id).await?;
        if run.is_terminal() {
            debug!(run_id = %run_id, "Cancel requested on terminal run; ignored");
            return Ok(());
        }
        self.repository.request_cancel(run_id).await?;
        info!(run_id = %run_id, "Cancellation requested");
        Ok(())
    }

    /// Cancel a run now. Already-terminal runs are returned unchanged.
    pub async fn cancel_run(
        &self,
        run_id: &RunId,
        reason: Option<String>,
    ) -> Result<AgentRun, OrchestratorError> {
        let _guard = self.locks.acquire(run_id.as_str()).await?;
        let mut run = self.load_run(run_id).await?;
        if run.is_terminal() {
            debug!(run_id = %run_id, status = %run.status, "Cancel on terminal run; no effect");
            return Ok(run);
        }
        let from = run.status;
        run.cancel(reason)?;
        self.persist_transition(&run, from).await?;
        Ok(run)
    }

    // ==================== Queries ====================

    pub async fn get_run_status(&self, run_id: &RunId) -> Result<RunStatusReport, OrchestratorError> {
        let run = self.load_run(run_id).await?;
        let executions = self.repository.list_executions(run_id).await?;
        Ok(RunStatusReport {
            state: run.status,
            run,
            executions,
        })
    }

    pub async fn list_runs(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<AgentRun>, OrchestratorError> {
        Ok(self.repository.list_runs(conversation_id).await?)
    }

    pub async fn list_executions(&self, run_id: &RunId) -> Result<Vec<ToolExecution>, OrchestratorError> {
        self.load_run(run_id).await?;
        Ok(self.repository.list_executions(run_id).await?)
    }

    pub async fn get_execution(&self, id: &ExecutionId) -> Result<ToolExecution, OrchestratorError> {
        self.load_execution(id).await
    }

    // ==================== Internals ====================

    fn check_plan(&self, plan: &Plan) -> Result<(), OrchestratorError> {
        plan.validate()
            .map_err(|e| OrchestratorError::InvalidPlan(e.to_string()))?;
        for step in &plan.steps {
            if !self.catalog.contains(&step.tool_name) {
                return Err(OrchestratorError::InvalidPlan(format!(
                    "step '{}' uses unknown tool '{}'",
                    step.id, step.tool_name
                )));
            }
        }
        Ok(())
    }

    pub(super) async fn load_run(&self, run_id: &RunId) -> Result<AgentRun, OrchestratorError> {
        self.repository
            .get_run(run_id)
            .await?
            .ok_or_else(|| OrchestratorError::NotFound(format!("run {}", run_id)))
    }

    pub(super) async fn load_execution(
        &self,
        id: &ExecutionId,
    ) -> Result<ToolExecution, OrchestratorError> {
        self.repository
            .get_execution(id)
            .await?
            .ok_or_else(|| OrchestratorError::NotFound(format!("execution {}", id)))
    }

    async fn create_step_execution(
        &self,
        run: &AgentRun,
        step: &PlanStep,
    ) -> Result<ToolExecution, OrchestratorError> {
        let tool_requires_approval = self
            .catalog
            .get(&step.tool_name)
            .is_some_and(|d| d.requires_approval);
        let exec = ToolExecution::for_step(
            ExecutionId::generate(),
            run.id.clone(),
            step,
            step.requires_approval || tool_requires_approval,
        );
        self.repository.create_execution(exec.clone()).await?;
        debug!(
            run_id = %run.id,
            step_id = %step.id,
            execution_id = %exec.id,
            status = %exec.status,
            "Execution created"
        );
        self.audit.log(AuditEvent::execution_created(&exec));
        Ok(exec)
    }

    /// Run an approved execution through the gate and record its outcome.
    pub(super) async fn dispatch(
        &self,
        exec: &mut ToolExecution,
        ctx: &ExecutionContext,
    ) -> Result<(), OrchestratorError> {
        exec.mark_executing()?;
        self.repository.update_execution(exec).await?;
        self.audit.log(AuditEvent::execution_started(exec));

        let result = self.gate.execute(&exec.tool_name, &exec.parameters, ctx).await;
        if result.success {
            exec.mark_completed(result)?;
        } else {
            let message = result.message.clone();
            exec.mark_failed(message, Some(result))?;
        }
        self.repository.update_execution(exec).await?;

        match exec.status {
            ExecutionStatus::Completed => {
                info!(execution_id = %exec.id, tool = %exec.tool_name, "Execution completed")
            }
            _ => warn!(
                execution_id = %exec.id,
                tool = %exec.tool_name,
                error = exec.error.as_deref().unwrap_or_default(),
                "Execution failed"
            ),
        }
        self.audit.log(AuditEvent::execution_finished(exec));
        Ok(())
    }

    async fn move_run(&self, run: &mut AgentRun, next: RunStatus) -> Result<(), OrchestratorError> {
        let from = run.status;
        run.transition(next)?;
        self.persist_transition(run, from).await
    }

    async fn persist_transition(&self, run: &AgentRun, from: RunStatus) -> Result<(), OrchestratorError> {
        self.repository.update_run(run).await?;
        info!(run_id = %run.id, from = %from, to = %run.status, "Run transition");
        self.audit
            .log(AuditEvent::run_transition(&run.id, from, run.status));
        Ok(())
    }

    async fn fail_run(
        &self,
        run: &mut AgentRun,
        error: String,
    ) -> Result<OrchestrationOutcome, OrchestratorError> {
        let from = run.status;
        run.fail(error.clone())?;
        self.persist_transition(run, from).await?;
        Ok(OrchestrationOutcome::Failed { error })
    }

    async fn cancel_and_report(
        &self,
        run: &mut AgentRun,
        reason: Option<String>,
    ) -> Result<OrchestrationOutcome, OrchestratorError> {
        let from = run.status;
        run.cancel(reason)?;
        self.persist_transition(run, from).await?;
        Ok(OrchestrationOutcome::Cancelled)
    }
}

fn step_failure(step: &PlanStep, exec: &ToolExecution) -> String {
    let message = exec.error.as_deref().unwrap_or("unknown error");
    format!("Step '{}' failed: {}", step.id, message)
}

fn completion_summary(finished: &[(&PlanStep, ToolExecution)]) -> String {
    let mut summary = format!("Completed {}/{} steps", finished.len(), finished.len());
    for (step, exec) in finished {
        let message = exec
            .result
            .as_ref()
            .map(|r| r.message.as_str())
            .unwrap_or_default();
        summary.push_str(&format!(
            "\n- {} ({}): {}",
            step.id,
            step.tool_name,
            summary_line(message, SUMMARY_LINE_MAX_BYTES)
        ));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::audit_logger::AuditEvent;
    use crate::ports::run_repository::InMemoryRunRepository;
    use crate::ports::tool_handler::{FnHandler, HandlerError, ToolHandler};
    use opsgate_domain::core::error::ErrorCode;
    use opsgate_domain::tool::entities::{RiskLevel, ToolDefinition};
    use opsgate_domain::tool::schema::{FieldSpec, FieldType};
    use opsgate_domain::tool::value_objects::ToolResult;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[derive(Default)]
    struct RecordingAudit {
        events: Mutex<Vec<&'static str>>,
    }

    impl AuditLogger for RecordingAudit {
        fn log(&self, event: AuditEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }
    }

    fn recording_handler(recorder: Arc<Recorder>) -> Arc<dyn ToolHandler> {
        Arc::new(FnHandler::new(move |tool, _params, _ctx| {
            let recorder = Arc::clone(&recorder);
            async move {
                recorder.calls.lock().unwrap().push(tool.name.clone());
                Ok(ToolResult::success(format!("{} done", tool.name)))
            }
        }))
    }

    struct Fixture {
        orchestrator: RunOrchestrator,
        repository: Arc<InMemoryRunRepository>,
        recorder: Arc<Recorder>,
        audit: Arc<RecordingAudit>,
    }

    fn fixture() -> Fixture {
        let recorder = Arc::new(Recorder::default());
        let catalog = ToolCatalog::new();
        catalog
            .register_all(
                [
                    ToolDefinition::new("project_list", "List projects", RiskLevel::Low),
                    ToolDefinition::new("server_list", "List servers", RiskLevel::Low),
                    ToolDefinition::new("application_deploy", "Deploy", RiskLevel::Medium),
                    ToolDefinition::new("domain_delete", "Delete a domain", RiskLevel::High),
                    ToolDefinition::new("postgres_create", "Create a database", RiskLevel::Medium)
                        .with_field(FieldSpec::required("name", "Database name", FieldType::String)),
                ],
                recording_handler(recorder.clone()),
            )
            .unwrap();
        catalog
            .register(
                ToolDefinition::new("server_restart", "Restart a server", RiskLevel::Medium),
                Arc::new(FnHandler::new(|_tool, _params, _ctx| async {
                    Err(HandlerError::new("SSH connection refused"))
                })),
            )
            .unwrap();

        let repository = Arc::new(InMemoryRunRepository::new());
        let audit = Arc::new(RecordingAudit::default());
        let orchestrator =
            RunOrchestrator::new(ExecutionGate::new(Arc::new(catalog)), repository.clone())
                .with_audit_logger(audit.clone());
        Fixture {
            orchestrator,
            repository,
            recorder,
            audit,
        }
    }

    fn ctx() -> ExecutionContext {
        ExecutionContext::new("org-1", "user-1").with_project("proj-1")
    }

    fn gated_plan() -> Plan {
        Plan::new()
            .with_step(PlanStep::new("a", "project_list", "Find the project"))
            .with_step(PlanStep::new("b", "application_deploy", "Deploy").with_approval())
            .with_step(PlanStep::new("c", "server_list", "Check servers"))
    }

    fn ungated_plan() -> Plan {
        Plan::new()
            .with_step(PlanStep::new("1", "project_list", "Find the project"))
            .with_step(PlanStep::new("2", "server_list", "Check servers"))
    }

    #[tokio::test]
    async fn test_approval_gate_pauses_then_completes() {
        let f = fixture();
        let run = f
            .orchestrator
            .create_run("conv-1", "Deploy the shop", Some(gated_plan()))
            .await
            .unwrap();

        let outcome = f.orchestrator.orchestrate(&run.id, &ctx()).await.unwrap();
        let OrchestrationOutcome::WaitApproval {
            execution_id,
            tool_name,
        } = outcome
        else {
            panic!("expected WAIT_APPROVAL");
        };
        assert_eq!(tool_name, "application_deploy");
        assert_eq!(f.recorder.calls(), vec!["project_list"]);

        let report = f.orchestrator.get_run_status(&run.id).await.unwrap();
        assert_eq!(report.state, RunStatus::WaitingApproval);
        assert_eq!(report.executions.len(), 2);

        let approved = f
            .orchestrator
            .approve_execution(&execution_id, "alice")
            .await
            .unwrap();
        assert_eq!(approved.approved_by.as_deref(), Some("alice"));
        // Approval alone does not resume the run.
        assert_eq!(f.recorder.calls().len(), 1);

        let outcome = f.orchestrator.orchestrate(&run.id, &ctx()).await.unwrap();
        let OrchestrationOutcome::Completed { summary } = outcome else {
            panic!("expected COMPLETED");
        };
        assert!(summary.starts_with("Completed 3/3 steps"));
        assert!(summary.contains("- b (application_deploy): application_deploy done"));
        assert_eq!(
            f.recorder.calls(),
            vec!["project_list", "application_deploy", "server_list"]
        );

        let report = f.orchestrator.get_run_status(&run.id).await.unwrap();
        assert_eq!(report.state, RunStatus::Completed);
        assert!(report.run.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_rejection_cancels_run() {
        let f = fixture();
        let run = f
            .orchestrator
            .create_run("conv-1", "Deploy the shop", Some(gated_plan()))
            .await
            .unwrap();

        let OrchestrationOutcome::WaitApproval { execution_id, .. } =
            f.orchestrator.orchestrate(&run.id, &ctx()).await.unwrap()
        else {
            panic!("expected WAIT_APPROVAL");
        };
        f.orchestrator
            .reject_execution(&execution_id, "bob")
            .await
            .unwrap();

        let outcome = f.orchestrator.orchestrate(&run.id, &ctx()).await.unwrap();
        assert_eq!(outcome, OrchestrationOutcome::Cancelled);

        let executions = f.orchestrator.list_executions(&run.id).await.unwrap();
        assert_eq!(executions.len(), 2);
        assert!(executions.iter().all(|e| e.tool_name != "server_list"));
        assert_eq!(f.recorder.calls(), vec!["project_list"]);

        let run = f.orchestrator.get_run_status(&run.id).await.unwrap().run;
        assert_eq!(run.error.as_deref(), Some("Step 'b' was rejected"));
    }

    #[tokio::test]
    async fn test_orchestrate_is_idempotent() {
        let f = fixture();
        let run = f
            .orchestrator
            .create_run("conv-1", "Look around", Some(ungated_plan()))
            .await
            .unwrap();

        let first = f.orchestrator.orchestrate(&run.id, &ctx()).await.unwrap();
        let second = f.orchestrator.orchestrate(&run.id, &ctx()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.state(), "COMPLETED");
        assert_eq!(f.orchestrator.list_executions(&run.id).await.unwrap().len(), 2);
        assert_eq!(f.recorder.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_in_flight_execution_is_not_reinvoked() {
        let f = fixture();
        let run = f
            .orchestrator
            .create_run("conv-1", "Look around", Some(ungated_plan()))
            .await
            .unwrap();

        // Simulate a crash after the first handler was dispatched.
        let mut stored = f.repository.get_run(&run.id).await.unwrap().unwrap();
        stored.transition(RunStatus::Planning).unwrap();
        stored.transition(RunStatus::Executing).unwrap();
        f.repository.update_run(&stored).await.unwrap();
        let mut exec = ToolExecution::for_step("e-crashed", run.id.clone(), &stored.steps()[0], false);
        exec.mark_executing().unwrap();
        f.repository.create_execution(exec).await.unwrap();

        for _ in 0..2 {
            let outcome = f.orchestrator.orchestrate(&run.id, &ctx()).await.unwrap();
            assert_eq!(
                outcome,
                OrchestrationOutcome::Executing {
                    execution_id: ExecutionId::new("e-crashed")
                }
            );
        }
        assert!(f.recorder.calls().is_empty());
        let report = f.orchestrator.get_run_status(&run.id).await.unwrap();
        assert_eq!(report.state, RunStatus::Executing);
    }

    #[tokio::test]
    async fn test_empty_plan_fails() {
        let f = fixture();
        let run = f
            .orchestrator
            .create_run("conv-1", "Nothing to do", None)
            .await
            .unwrap();

        let outcome = f.orchestrator.orchestrate(&run.id, &ctx()).await.unwrap();
        assert_eq!(
            outcome,
            OrchestrationOutcome::Failed {
                error: "Run has no plan steps".into()
            }
        );
    }

    #[tokio::test]
    async fn test_handler_failure_fails_run() {
        let f = fixture();
        let plan = Plan::new()
            .with_step(PlanStep::new("restart", "server_restart", "Restart"))
            .with_step(PlanStep::new("check", "server_list", "Check"));
        let run = f
            .orchestrator
            .create_run("conv-1", "Restart", Some(plan))
            .await
            .unwrap();

        let outcome = f.orchestrator.orchestrate(&run.id, &ctx()).await.unwrap();
        assert_eq!(
            outcome,
            OrchestrationOutcome::Failed {
                error: "Step 'restart' failed: SSH connection refused".into()
            }
        );

        let executions = f.orchestrator.list_executions(&run.id).await.unwrap();
        assert_eq!(executions.len(), 1);
        assert_eq!(executions[0].status, ExecutionStatus::Failed);
        let result = executions[0].result.as_ref().unwrap();
        assert_eq!(result.error_code(), Some(ErrorCode::Internal));
        assert!(f.recorder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_step_parameters_fail_without_dispatch() {
        let f = fixture();
        let plan = Plan::new().with_step(
            PlanStep::new("db", "postgres_create", "Create db").with_params(json!({"size": 1})),
        );
        let run = f
            .orchestrator
            .create_run("conv-1", "Create db", Some(plan))
            .await
            .unwrap();

        let outcome = f.orchestrator.orchestrate(&run.id, &ctx()).await.unwrap();
        assert_eq!(outcome.state(), "FAILED");
        assert!(f.recorder.calls().is_empty());

        let exec = &f.orchestrator.list_executions(&run.id).await.unwrap()[0];
        let error = exec.result.as_ref().and_then(|r| r.error()).unwrap();
        assert_eq!(error.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_tool_level_approval_applies_to_steps() {
        let f = fixture();
        let plan = Plan::new().with_step(PlanStep::new("1", "domain_delete", "Remove domain"));
        let run = f
            .orchestrator
            .create_run("conv-1", "Clean up", Some(plan))
            .await
            .unwrap();

        let outcome = f.orchestrator.orchestrate(&run.id, &ctx()).await.unwrap();
        assert_eq!(outcome.state(), "WAIT_APPROVAL");
        assert!(f.recorder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_requested_before_start() {
        let f = fixture();
        let run = f
            .orchestrator
            .create_run("conv-1", "Look around", Some(ungated_plan()))
            .await
            .unwrap();

        f.orchestrator.request_cancel(&run.id).await.unwrap();
        let outcome = f.orchestrator.orchestrate(&run.id, &ctx()).await.unwrap();
        assert_eq!(outcome, OrchestrationOutcome::Cancelled);
        assert!(f.orchestrator.list_executions(&run.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_requested_while_waiting() {
        let f = fixture();
        let run = f
            .orchestrator
            .create_run("conv-1", "Deploy", Some(gated_plan()))
            .await
            .unwrap();
        f.orchestrator.orchestrate(&run.id, &ctx()).await.unwrap();

        f.orchestrator.request_cancel(&run.id).await.unwrap();
        let outcome = f.orchestrator.orchestrate(&run.id, &ctx()).await.unwrap();
        assert_eq!(outcome, OrchestrationOutcome::Cancelled);
        assert_eq!(f.recorder.calls(), vec!["project_list"]);
    }

    #[tokio::test]
    async fn test_cancel_run_is_noop_on_terminal_run() {
        let f = fixture();
        let run = f
            .orchestrator
            .create_run("conv-1", "Look around", Some(ungated_plan()))
            .await
            .unwrap();
        f.orchestrator.orchestrate(&run.id, &ctx()).await.unwrap();

        let after = f.orchestrator.cancel_run(&run.id, None).await.unwrap();
        assert_eq!(after.status, RunStatus::Completed);

        let other = f
            .orchestrator
            .create_run("conv-1", "Deploy", Some(gated_plan()))
            .await
            .unwrap();
        let cancelled = f
            .orchestrator
            .cancel_run(&other.id, Some("changed my mind".into()))
            .await
            .unwrap();
        assert_eq!(cancelled.status, RunStatus::Cancelled);
        assert!(cancelled.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_approve_requires_pending() {
        let f = fixture();
        let run = f
            .orchestrator
            .create_run("conv-1", "Deploy", Some(gated_plan()))
            .await
            .unwrap();
        let OrchestrationOutcome::WaitApproval { execution_id, .. } =
            f.orchestrator.orchestrate(&run.id, &ctx()).await.unwrap()
        else {
            panic!("expected WAIT_APPROVAL");
        };

        f.orchestrator
            .approve_execution(&execution_id, "alice")
            .await
            .unwrap();
        let err = f
            .orchestrator
            .reject_execution(&execution_id, "bob")
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::BadRequest);

        let err = f
            .orchestrator
            .approve_execution(&ExecutionId::new("missing"), "alice")
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_decisions_refused_once_run_is_cancelled() {
        let f = fixture();
        let run = f
            .orchestrator
            .create_run("conv-1", "Deploy", Some(gated_plan()))
            .await
            .unwrap();
        let OrchestrationOutcome::WaitApproval { execution_id, .. } =
            f.orchestrator.orchestrate(&run.id, &ctx()).await.unwrap()
        else {
            panic!("expected WAIT_APPROVAL");
        };
        f.orchestrator.cancel_run(&run.id, None).await.unwrap();

        let err = f
            .orchestrator
            .approve_execution(&execution_id, "alice")
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::BadRequest);
        let err = f
            .orchestrator
            .reject_execution(&execution_id, "bob")
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::BadRequest);

        let exec = f.orchestrator.get_execution(&execution_id).await.unwrap();
        assert_eq!(exec.status, ExecutionStatus::Pending);
        assert!(exec.approved_by.is_none());
        assert_eq!(f.recorder.calls(), vec!["project_list"]);
    }

    #[tokio::test]
    async fn test_create_run_rejects_unknown_tools() {
        let f = fixture();
        let plan = Plan::new().with_step(PlanStep::new("1", "kubernetes_apply", "Apply"));
        let err = f
            .orchestrator
            .create_run("conv-1", "Apply", Some(plan))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert!(
            f.orchestrator
                .list_runs(&ConversationId::new("conv-1"))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_set_plan_only_while_pending_without_plan() {
        let f = fixture();
        let run = f
            .orchestrator
            .create_run("conv-1", "Later", None)
            .await
            .unwrap();

        let updated = f.orchestrator.set_plan(&run.id, ungated_plan()).await.unwrap();
        assert_eq!(updated.steps().len(), 2);

        let err = f
            .orchestrator
            .set_plan(&run.id, gated_plan())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::BadRequest);
    }

    #[tokio::test]
    async fn test_ad_hoc_execution_lifecycle() {
        let f = fixture();
        let exec = f
            .orchestrator
            .submit_execution("domain_delete", json!({}))
            .await
            .unwrap();
        assert_eq!(exec.status, ExecutionStatus::Pending);
        assert!(exec.run_id.is_none());

        let err = f.orchestrator.run_execution(&exec.id, &ctx()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::BadRequest);

        f.orchestrator.approve_execution(&exec.id, "alice").await.unwrap();
        let done = f.orchestrator.run_execution(&exec.id, &ctx()).await.unwrap();
        assert_eq!(done.status, ExecutionStatus::Completed);

        let again = f.orchestrator.run_execution(&exec.id, &ctx()).await.unwrap();
        assert_eq!(again.status, ExecutionStatus::Completed);
        assert_eq!(f.recorder.calls(), vec!["domain_delete"]);
    }

    #[tokio::test]
    async fn test_concurrent_passes_dispatch_once() {
        let f = fixture();
        let plan = Plan::new().with_step(PlanStep::new("1", "project_list", "List"));
        let run = f
            .orchestrator
            .create_run("conv-1", "List", Some(plan))
            .await
            .unwrap();

        let ctx = ctx();
        let (a, b) = tokio::join!(
            f.orchestrator.orchestrate(&run.id, &ctx),
            f.orchestrator.orchestrate(&run.id, &ctx)
        );
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(f.recorder.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_list_runs_by_conversation() {
        let f = fixture();
        f.orchestrator
            .create_run("conv-1", "first", None)
            .await
            .unwrap();
        f.orchestrator
            .create_run("conv-2", "other", None)
            .await
            .unwrap();
        f.orchestrator
            .create_run("conv-1", "second", None)
            .await
            .unwrap();

        let goals: Vec<String> = f
            .orchestrator
            .list_runs(&ConversationId::new("conv-1"))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.goal)
            .collect();
        assert_eq!(goals, vec!["first", "second"]);

        let err = f
            .orchestrator
            .get_run_status(&RunId::new("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_audit_trail() {
        let f = fixture();
        let run = f
            .orchestrator
            .create_run("conv-1", "Look around", Some(ungated_plan()))
            .await
            .unwrap();
        f.orchestrator.orchestrate(&run.id, &ctx()).await.unwrap();

        let events = f.audit.events.lock().unwrap().clone();
        assert_eq!(events.first(), Some(&"run_created"));
        assert_eq!(
            events.iter().filter(|e| **e == "execution_finished").count(),
            2
        );
        assert_eq!(events.last(), Some(&"run_transition"));
    }
}
