//! Run repository port
//!
//! Persistence contract for [`AgentRun`] and [`ToolExecution`] records.
//! Executions are stored independently of their run so they stay queryable
//! as an audit trail.
//!
//! # Guarantees expected from implementations
//!
//! - at most one execution per `(run_id, step_id)`; a second
//!   `create_execution` for the same pair is a [`RepositoryError::Conflict`]
//! - listings return records in creation order
//! - the cancellation flag is stored apart from the run so that
//!   `update_run` never clears it
//!
//! Per-run serialization of read-modify-write cycles is the orchestrator's
//! job (see `RunLockTable`); the repository only has to make individual
//! calls atomic.
//!
//! # Built-in Implementations
//!
//! - [`InMemoryRunRepository`] - process-local store for tests and embedding

use async_trait::async_trait;
use opsgate_domain::core::error::ErrorCode;
use opsgate_domain::run::{
    AgentRun, ConversationId, ExecutionId, RunId, StepId, ToolExecution,
};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors reported by a [`RunRepository`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl RepositoryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RepositoryError::NotFound(_) => ErrorCode::NotFound,
            RepositoryError::Conflict(_) => ErrorCode::BadRequest,
            RepositoryError::Storage(_) => ErrorCode::Internal,
        }
    }
}

/// Port for run and execution persistence.
#[async_trait]
pub trait RunRepository: Send + Sync {
    /// Store a new run. Fails with `Conflict` if the id is taken.
    async fn insert_run(&self, run: AgentRun) -> Result<(), RepositoryError>;

    async fn get_run(&self, id: &RunId) -> Result<Option<AgentRun>, RepositoryError>;

    /// Replace a stored run. Fails with `NotFound` if it was never inserted.
    async fn update_run(&self, run: &AgentRun) -> Result<(), RepositoryError>;

    async fn list_runs(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<AgentRun>, RepositoryError>;

    /// Store a new execution, enforcing one execution per run step.
    async fn create_execution(&self, execution: ToolExecution) -> Result<(), RepositoryError>;

    async fn get_execution(
        &self,
        id: &ExecutionId,
    ) -> Result<Option<ToolExecution>, RepositoryError>;

    /// The execution created for a run's step, if any.
    async fn find_step_execution(
        &self,
        run_id: &RunId,
        step_id: &StepId,
    ) -> Result<Option<ToolExecution>, RepositoryError>;

    async fn update_execution(&self, execution: &ToolExecution) -> Result<(), RepositoryError>;

    async fn list_executions(&self, run_id: &RunId) -> Result<Vec<ToolExecution>, RepositoryError>;

    /// Raise the cooperative cancellation flag of a run.
    async fn request_cancel(&self, run_id: &RunId) -> Result<(), RepositoryError>;

    async fn is_cancel_requested(&self, run_id: &RunId) -> Result<bool, RepositoryError>;
}

#[derive(Default)]
struct Store {
    runs: HashMap<RunId, AgentRun>,
    run_order: Vec<RunId>,
    executions: HashMap<ExecutionId, ToolExecution>,
    execution_order: Vec<ExecutionId>,
    step_index: HashMap<(RunId, StepId), ExecutionId>,
    cancel_requested: HashSet<RunId>,
}

/// Process-local [`RunRepository`] backed by hash maps.
#[derive(Default)]
pub struct InMemoryRunRepository {
    store: RwLock<Store>,
}

impl InMemoryRunRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RunRepository for InMemoryRunRepository {
    async fn insert_run(&self, run: AgentRun) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        if store.runs.contains_key(&run.id) {
            return Err(RepositoryError::Conflict(format!(
                "run {} already exists",
                run.id
            )));
        }
        store.run_order.push(run.id.clone());
        store.runs.insert(run.id.clone(), run);
        Ok(())
    }

    async fn get_run(&self, id: &RunId) -> Result<Option<AgentRun>, RepositoryError> {
        Ok(self.store.read().await.runs.get(id).cloned())
    }

    async fn update_run(&self, run: &AgentRun) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        match store.runs.get_mut(&run.id) {
            Some(stored) => {
                *stored = run.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("run {}", run.id))),
        }
    }

    async fn list_runs(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<AgentRun>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store
            .run_order
            .iter()
            .filter_map(|id| store.runs.get(id))
            .filter(|run| &run.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    async fn create_execution(&self, execution: ToolExecution) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        if store.executions.contains_key(&execution.id) {
            return Err(RepositoryError::Conflict(format!(
                "execution {} already exists",
                execution.id
            )));
        }
        if let (Some(run_id), Some(step_id)) = (&execution.run_id, &execution.step_id) {
            let key = (run_id.clone(), step_id.clone());
            if store.step_index.contains_key(&key) {
                return Err(RepositoryError::Conflict(format!(
                    "step {} of run {} already has an execution",
                    step_id, run_id
                )));
            }
            store.step_index.insert(key, execution.id.clone());
        }
        store.execution_order.push(execution.id.clone());
        store.executions.insert(execution.id.clone(), execution);
        Ok(())
    }

    async fn get_execution(
        &self,
        id: &ExecutionId,
    ) -> Result<Option<ToolExecution>, RepositoryError> {
        Ok(self.store.read().await.executions.get(id).cloned())
    }

    async fn find_step_execution(
        &self,
        run_id: &RunId,
        step_id: &StepId,
    ) -> Result<Option<ToolExecution>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store
            .step_index
            .get(&(run_id.clone(), step_id.clone()))
            .and_then(|id| store.executions.get(id))
            .cloned())
    }

    async fn update_execution(&self, execution: &ToolExecution) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        match store.executions.get_mut(&execution.id) {
            Some(stored) => {
                *stored = execution.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!(
                "execution {}",
                execution.id
            ))),
        }
    }

    async fn list_executions(&self, run_id: &RunId) -> Result<Vec<ToolExecution>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store
            .execution_order
            .iter()
            .filter_map(|id| store.executions.get(id))
            .filter(|exec| exec.run_id.as_ref() == Some(run_id))
            .cloned()
            .collect())
    }

    async fn request_cancel(&self, run_id: &RunId) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        if !store.runs.contains_key(run_id) {
            return Err(RepositoryError::NotFound(format!("run {}", run_id)));
        }
        store.cancel_requested.insert(run_id.clone());
        Ok(())
    }

    async fn is_cancel_requested(&self, run_id: &RunId) -> Result<bool, RepositoryError> {
        Ok(self.store.read().await.cancel_requested.contains(run_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsgate_domain::run::{Plan, PlanStep, RunStatus};
    use serde_json::json;

    fn run(id: &str, conversation: &str) -> AgentRun {
        AgentRun::new(id, conversation, "goal")
            .with_plan(Plan::new().with_step(PlanStep::new("1", "project_list", "List")))
    }

    #[tokio::test]
    async fn test_insert_get_update_run() {
        let repo = InMemoryRunRepository::new();
        repo.insert_run(run("r1", "c1")).await.unwrap();

        let mut stored = repo.get_run(&RunId::new("r1")).await.unwrap().unwrap();
        stored.transition(RunStatus::Planning).unwrap();
        repo.update_run(&stored).await.unwrap();

        let reloaded = repo.get_run(&RunId::new("r1")).await.unwrap().unwrap();
        assert_eq!(reloaded.status, RunStatus::Planning);
        assert!(repo.get_run(&RunId::new("missing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_run_is_conflict() {
        let repo = InMemoryRunRepository::new();
        repo.insert_run(run("r1", "c1")).await.unwrap();
        let err = repo.insert_run(run("r1", "c1")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_unknown_run_is_not_found() {
        let repo = InMemoryRunRepository::new();
        let err = repo.update_run(&run("r1", "c1")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_list_runs_by_conversation_in_order() {
        let repo = InMemoryRunRepository::new();
        repo.insert_run(run("r2", "c1")).await.unwrap();
        repo.insert_run(run("r1", "c1")).await.unwrap();
        repo.insert_run(run("r3", "c2")).await.unwrap();

        let ids: Vec<String> = repo
            .list_runs(&ConversationId::new("c1"))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id.to_string())
            .collect();
        assert_eq!(ids, vec!["r2", "r1"]);
    }

    #[tokio::test]
    async fn test_one_execution_per_step() {
        let repo = InMemoryRunRepository::new();
        let stored = run("r1", "c1");
        let step = stored.steps()[0].clone();
        repo.insert_run(stored).await.unwrap();

        repo.create_execution(ToolExecution::for_step("e1", "r1", &step, false))
            .await
            .unwrap();
        let err = repo
            .create_execution(ToolExecution::for_step("e2", "r1", &step, false))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let found = repo
            .find_step_execution(&RunId::new("r1"), &step.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, ExecutionId::new("e1"));
        assert_eq!(repo.list_executions(&RunId::new("r1")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ad_hoc_executions_are_not_listed_under_runs() {
        let repo = InMemoryRunRepository::new();
        repo.create_execution(ToolExecution::ad_hoc("e1", "project_list", json!({}), false))
            .await
            .unwrap();
        repo.create_execution(ToolExecution::ad_hoc("e2", "project_list", json!({}), false))
            .await
            .unwrap();

        assert!(repo.get_execution(&ExecutionId::new("e2")).await.unwrap().is_some());
        assert!(repo.list_executions(&RunId::new("r1")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_flag_survives_run_update() {
        let repo = InMemoryRunRepository::new();
        repo.insert_run(run("r1", "c1")).await.unwrap();
        let id = RunId::new("r1");

        assert!(!repo.is_cancel_requested(&id).await.unwrap());
        repo.request_cancel(&id).await.unwrap();

        let stored = repo.get_run(&id).await.unwrap().unwrap();
        repo.update_run(&stored).await.unwrap();
        assert!(repo.is_cancel_requested(&id).await.unwrap());

        let err = repo.request_cancel(&RunId::new("nope")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }
}
