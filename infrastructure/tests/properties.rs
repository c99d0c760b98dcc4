//! End-to-end checks against a fully wired control plane: platform
//! definitions, keyword classifier, in-memory repository.

use opsgate_application::{
    ControlPlane, FnHandler, InMemoryRunRepository, OrchestrationOutcome, RunRepository,
    SelectionOptions,
};
use opsgate_domain::core::error::ErrorCode;
use opsgate_domain::run::{ExecutionId, ExecutionStatus, Plan, PlanStep, RunStatus, ToolExecution};
use opsgate_domain::tool::context::ExecutionContext;
use opsgate_domain::tool::value_objects::ToolResult;
use opsgate_infrastructure::{ControlPlaneBuilder, FileConfig};
use serde_json::json;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Calls(Arc<Mutex<Vec<String>>>);

impl Calls {
    fn names(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct Harness {
    cp: ControlPlane,
    calls: Calls,
    repository: Arc<InMemoryRunRepository>,
}

fn harness() -> Harness {
    let calls = Calls::default();
    let recorded = calls.clone();
    let handler = Arc::new(FnHandler::new(move |tool, _params, _ctx| {
        let recorded = recorded.clone();
        async move {
            recorded.0.lock().unwrap().push(tool.name.clone());
            Ok(ToolResult::success(format!("{} ok", tool.name)))
        }
    }));
    let repository = Arc::new(InMemoryRunRepository::new());
    let cp = ControlPlaneBuilder::new(FileConfig::default(), handler)
        .with_repository(repository.clone())
        .build()
        .unwrap();
    Harness {
        cp,
        calls,
        repository,
    }
}

fn ctx() -> ExecutionContext {
    ExecutionContext::new("org-1", "user-1").with_project("proj-1")
}

/// A (no approval) → B (approval) → C (no approval)
fn gated_plan() -> Plan {
    Plan::new()
        .with_step(PlanStep::new("a", "project_all", "Find the project"))
        .with_step(
            PlanStep::new("b", "application_deploy", "Deploy the app")
                .with_params(json!({"application_id": "app-1"}))
                .with_approval(),
        )
        .with_step(
            PlanStep::new("c", "deployment_list", "Confirm the deployment")
                .with_params(json!({"application_id": "app-1"})),
        )
}

#[tokio::test]
async fn approval_gate_pauses_before_gated_step() {
    let h = harness();
    let run = h.cp.create_run("conv-1", "Deploy app-1", Some(gated_plan())).await.unwrap();

    let outcome = h.cp.orchestrate(&run.id, &ctx()).await.unwrap();
    let OrchestrationOutcome::WaitApproval { execution_id, tool_name } = outcome else {
        panic!("expected WAIT_APPROVAL");
    };
    assert_eq!(tool_name, "application_deploy");
    assert_eq!(h.calls.names(), vec!["project_all"]);
    assert_eq!(h.cp.list_executions(&run.id).await.unwrap().len(), 2);

    h.cp.approve_execution(&execution_id, "alice").await.unwrap();
    let outcome = h.cp.orchestrate(&run.id, &ctx()).await.unwrap();
    assert_eq!(outcome.state(), "COMPLETED");
    assert_eq!(
        h.calls.names(),
        vec!["project_all", "application_deploy", "deployment_list"]
    );

    let report = h.cp.get_run_status(&run.id).await.unwrap();
    assert_eq!(report.state, RunStatus::Completed);
    assert!(report.run.result.unwrap().starts_with("Completed 3/3 steps"));
}

#[tokio::test]
async fn rejection_cancels_and_never_creates_later_steps() {
    let h = harness();
    let run = h.cp.create_run("conv-1", "Deploy app-1", Some(gated_plan())).await.unwrap();

    let OrchestrationOutcome::WaitApproval { execution_id, .. } =
        h.cp.orchestrate(&run.id, &ctx()).await.unwrap()
    else {
        panic!("expected WAIT_APPROVAL");
    };
    h.cp.reject_execution(&execution_id, "bob").await.unwrap();

    let outcome = h.cp.orchestrate(&run.id, &ctx()).await.unwrap();
    assert_eq!(outcome, OrchestrationOutcome::Cancelled);

    let executions = h.cp.list_executions(&run.id).await.unwrap();
    assert_eq!(executions.len(), 2);
    assert!(executions.iter().all(|e| e.tool_name != "deployment_list"));
    assert_eq!(h.calls.names(), vec!["project_all"]);
}

#[tokio::test]
async fn orchestrate_is_idempotent_on_terminal_runs() {
    let h = harness();
    let plan = Plan::new()
        .with_step(PlanStep::new("1", "project_all", "List projects"))
        .with_step(PlanStep::new("2", "server_list", "List servers"));
    let run = h.cp.create_run("conv-1", "Inventory", Some(plan)).await.unwrap();

    let first = h.cp.orchestrate(&run.id, &ctx()).await.unwrap();
    let second = h.cp.orchestrate(&run.id, &ctx()).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(h.cp.list_executions(&run.id).await.unwrap().len(), 2);
    assert_eq!(h.calls.names().len(), 2);
}

#[tokio::test]
async fn crashed_execution_is_not_reinvoked() {
    let h = harness();
    let plan = Plan::new().with_step(
        PlanStep::new("1", "application_redeploy", "Redeploy")
            .with_params(json!({"application_id": "app-1"})),
    );
    let run = h.cp.create_run("conv-1", "Redeploy", Some(plan)).await.unwrap();

    let mut stored = h.repository.get_run(&run.id).await.unwrap().unwrap();
    stored.transition(RunStatus::Planning).unwrap();
    stored.transition(RunStatus::Executing).unwrap();
    h.repository.update_run(&stored).await.unwrap();
    let mut exec = ToolExecution::for_step("e-crashed", run.id.clone(), &stored.steps()[0], false);
    exec.mark_executing().unwrap();
    h.repository.create_execution(exec).await.unwrap();

    let outcome = h.cp.orchestrate(&run.id, &ctx()).await.unwrap();
    assert_eq!(
        outcome,
        OrchestrationOutcome::Executing {
            execution_id: ExecutionId::new("e-crashed")
        }
    );
    assert!(h.calls.names().is_empty());
}

#[tokio::test]
async fn completed_runs_refuse_transitions() {
    let h = harness();
    let plan = Plan::new().with_step(PlanStep::new("1", "project_all", "List"));
    let run = h.cp.create_run("conv-1", "List", Some(plan)).await.unwrap();
    h.cp.orchestrate(&run.id, &ctx()).await.unwrap();

    let mut stored = h.repository.get_run(&run.id).await.unwrap().unwrap();
    let before = stored.clone();
    assert!(stored.transition(RunStatus::Executing).is_err());
    assert_eq!(stored, before);
}

#[test]
fn database_question_surfaces_no_destructive_tools() {
    let h = harness();
    let options = SelectionOptions::default();

    let first = h.cp.select_relevant_tools("show me my databases", &options).unwrap();
    let second = h.cp.select_relevant_tools("show me my databases", &options).unwrap();

    assert!(!first.is_empty());
    assert!(first.len() <= 20);
    assert!(first.iter().all(|t| !t.is_destructive()));
    assert!(first.iter().all(|t| t.is_low_risk() || t.is_read_only()));
    let names = |tools: &[opsgate_domain::ToolDefinition]| {
        tools.iter().map(|t| t.name.clone()).collect::<Vec<_>>()
    };
    assert_eq!(names(&first), names(&second));
}

#[test]
fn named_engine_with_delete_admits_only_that_engine() {
    let h = harness();
    let tools = h
        .cp
        .select_relevant_tools(
            "delete the postgres database shop",
            &SelectionOptions::default().with_min_tools(0),
        )
        .unwrap();
    assert!(tools.iter().any(|t| t.name == "postgres_delete"));
    for tool in &tools {
        assert!(
            ["postgres", "project", "environment"].contains(&tool.namespace()),
            "{}",
            tool.name
        );
    }
}

#[test]
fn backfill_never_adds_risky_tools_from_other_namespaces() {
    let h = harness();
    // 13 postgres, project and environment tools; three slots to backfill
    let options = SelectionOptions::default().with_min_tools(16);
    let tools = h
        .cp
        .select_relevant_tools("delete the postgres database shop", &options)
        .unwrap();
    assert_eq!(tools.len(), 16);
    assert!(tools.iter().any(|t| t.name == "postgres_delete"));
    let admitted = ["postgres", "project", "environment"];
    let outside: Vec<_> = tools
        .iter()
        .filter(|t| !admitted.contains(&t.namespace()))
        .collect();
    assert_eq!(outside.len(), 3);
    for tool in outside {
        assert!(tool.is_low_risk(), "{}", tool.name);
        assert!(!tool.is_destructive(), "{}", tool.name);
        assert!(!tool.requires_approval, "{}", tool.name);
    }
}

#[test]
fn selection_respects_cap() {
    let h = harness();
    let tools = h
        .cp
        .select_relevant_tools(
            "deploy the application",
            &SelectionOptions::default().with_max_tools(3),
        )
        .unwrap();
    assert_eq!(tools.len(), 3);
    assert_eq!(tools[0].namespace(), "application");
}

#[tokio::test]
async fn gate_validates_before_invoking_handler() {
    let h = harness();
    let result = h
        .cp
        .execute_tool("mysql_create", &json!({"environment_id": "env-1"}), &ctx())
        .await;

    assert_eq!(result.error_code(), Some(ErrorCode::ValidationError));
    assert_eq!(result.error().unwrap().field_errors[0].field, "name");
    assert!(h.calls.names().is_empty());
}

#[tokio::test]
async fn ad_hoc_destructive_execution_needs_approval() {
    let h = harness();
    let exec = h
        .cp
        .submit_execution("domain_delete", json!({"domain_id": "d-1"}))
        .await
        .unwrap();
    assert_eq!(exec.status, ExecutionStatus::Pending);
    assert!(h.cp.run_execution(&exec.id, &ctx()).await.is_err());

    h.cp.approve_execution(&exec.id, "alice").await.unwrap();
    let done = h.cp.run_execution(&exec.id, &ctx()).await.unwrap();
    assert_eq!(done.status, ExecutionStatus::Completed);

    // at most once
    h.cp.run_execution(&exec.id, &ctx()).await.unwrap();
    assert_eq!(h.calls.names(), vec!["domain_delete"]);
}
