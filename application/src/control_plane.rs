//! Control plane facade.
//!
//! [`ControlPlane`] is the library surface an outer transport (HTTP, RPC, a
//! chat loop) talks to. It bundles the catalog, the selection use case, the
//! execution gate and the run orchestrator over one shared catalog.
//!
//! | Operation | Delegates to |
//! |-----------|--------------|
//! | `register_tool` / `get_tool` / `list_tools` | [`ToolCatalog`] |
//! | `select_relevant_tools` | [`SelectToolsUseCase`] |
//! | `execute_tool` | [`ExecutionGate`] |
//! | runs, approvals, ad-hoc executions | [`RunOrchestrator`] |

use crate::catalog::{CatalogError, ToolCatalog};
use crate::config::{OrchestratorParams, SelectionParams};
use crate::ports::audit_logger::AuditLogger;
use crate::ports::run_repository::RunRepository;
use crate::ports::tool_handler::ToolHandler;
use crate::use_cases::execute_tool::ExecutionGate;
use crate::use_cases::orchestrate_run::{
    OrchestrationOutcome, OrchestratorError, RunOrchestrator, RunStatusReport,
};
use crate::use_cases::select_tools::{SelectToolsUseCase, SelectionOptions};
use opsgate_domain::run::{AgentRun, ConversationId, ExecutionId, Plan, RunId, ToolExecution};
use opsgate_domain::selection::IntentClassifier;
use opsgate_domain::tool::{
    context::ExecutionContext, entities::ToolDefinition, value_objects::ToolResult,
};
use std::sync::Arc;

/// Entry point for every core operation.
#[derive(Clone)]
pub struct ControlPlane {
    catalog: Arc<ToolCatalog>,
    selector: SelectToolsUseCase,
    gate: ExecutionGate,
    orchestrator: RunOrchestrator,
}

impl ControlPlane {
    pub fn new(
        catalog: Arc<ToolCatalog>,
        classifier: Arc<dyn IntentClassifier>,
        repository: Arc<dyn RunRepository>,
    ) -> Self {
        let gate = ExecutionGate::new(catalog.clone());
        Self {
            selector: SelectToolsUseCase::new(catalog.clone(), classifier),
            orchestrator: RunOrchestrator::new(gate.clone(), repository),
            gate,
            catalog,
        }
    }

    pub fn with_selection_params(mut self, params: SelectionParams) -> Self {
        self.selector = self.selector.with_params(params);
        self
    }

    pub fn with_orchestrator_params(mut self, params: OrchestratorParams) -> Self {
        self.gate = self.gate.with_params(&params);
        self.orchestrator = self.orchestrator.with_params(&params);
        self
    }

    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.orchestrator = self.orchestrator.with_audit_logger(audit);
        self
    }

    pub fn catalog(&self) -> &Arc<ToolCatalog> {
        &self.catalog
    }

    // ==================== Catalog ====================

    pub fn register_tool(
        &self,
        definition: ToolDefinition,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), CatalogError> {
        self.catalog.register(definition, handler)
    }

    pub fn get_tool(&self, name: &str) -> Result<Option<ToolDefinition>, CatalogError> {
        self.catalog.ensure_initialized()?;
        Ok(self.catalog.get(name))
    }

    pub fn list_tools(&self) -> Result<Vec<ToolDefinition>, CatalogError> {
        self.catalog.ensure_initialized()?;
        Ok(self.catalog.list())
    }

    /// High-risk tools registered without an approval requirement.
    pub fn lint_risk_policy(&self) -> Result<Vec<String>, CatalogError> {
        self.catalog.ensure_initialized()?;
        Ok(self.catalog.lint_risk_policy())
    }

    // ==================== Selection and execution ====================

    pub fn select_relevant_tools(
        &self,
        text: &str,
        options: &SelectionOptions,
    ) -> Result<Vec<ToolDefinition>, CatalogError> {
        self.selector.execute(text, options)
    }

    /// Run a tool directly. The caller is responsible for approval of
    /// tools that require it (see [`ControlPlane::requires_approval`]).
    pub async fn execute_tool(
        &self,
        name: &str,
        params: &serde_json::Value,
        ctx: &ExecutionContext,
    ) -> ToolResult {
        self.gate.execute(name, params, ctx).await
    }

    pub fn requires_approval(&self, name: &str) -> Option<bool> {
        self.gate.requires_approval(name)
    }

    // ==================== Runs ====================

    pub async fn create_run(
        &self,
        conversation_id: impl Into<ConversationId>,
        goal: impl Into<String>,
        plan: Option<Plan>,
    ) -> Result<AgentRun, OrchestratorError> {
        self.orchestrator.create_run(conversation_id, goal, plan).await
    }

    pub async fn set_plan(&self, run_id: &RunId, plan: Plan) -> Result<AgentRun, OrchestratorError> {
        self.orchestrator.set_plan(run_id, plan).await
    }

    pub async fn orchestrate(
        &self,
        run_id: &RunId,
        ctx: &ExecutionContext,
    ) -> Result<OrchestrationOutcome, OrchestratorError> {
        self.orchestrator.orchestrate(run_id, ctx).await
    }

    pub async fn approve_execution(
        &self,
        execution_id: &ExecutionId,
        approver: impl Into<String>,
    ) -> Result<ToolExecution, OrchestratorError> {
        self.orchestrator
            .approve_execution(execution_id, approver)
            .await
    }

    pub async fn reject_execution(
        &self,
        execution_id: &ExecutionId,
        rejecter: impl Into<String>,
    ) -> Result<ToolExecution, OrchestratorError> {
        self.orchestrator
            .reject_execution(execution_id, rejecter)
            .await
    }

    pub async fn cancel_run(
        &self,
        run_id: &RunId,
        reason: Option<String>,
    ) -> Result<AgentRun, OrchestratorError> {
        self.orchestrator.cancel_run(run_id, reason).await
    }

    pub async fn request_cancel(&self, run_id: &RunId) -> Result<(), OrchestratorError> {
        self.orchestrator.request_cancel(run_id).await
    }

    pub async fn get_run_status(&self, run_id: &RunId) -> Result<RunStatusReport, OrchestratorError> {
        self.orchestrator.get_run_status(run_id).await
    }

    pub async fn list_runs(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<AgentRun>, OrchestratorError> {
        self.orchestrator.list_runs(conversation_id).await
    }

    pub async fn list_executions(&self, run_id: &RunId) -> Result<Vec<ToolExecution>, OrchestratorError> {
        self.orchestrator.list_executions(run_id).await
    }

    pub async fn get_execution(&self, id: &ExecutionId) -> Result<ToolExecution, OrchestratorError> {
        self.orchestrator.get_execution(id).await
    }

    // ==================== Ad-hoc executions ====================

    pub async fn submit_execution(
        &self,
        tool_name: &str,
        parameters: serde_json::Value,
    ) -> Result<ToolExecution, OrchestratorError> {
        self.orchestrator
            .submit_execution(tool_name, parameters)
            .await
    }

    pub async fn run_execution(
        &self,
        id: &ExecutionId,
        ctx: &ExecutionContext,
    ) -> Result<ToolExecution, OrchestratorError> {
        self.orchestrator.run_execution(id, ctx).await
    }
}
