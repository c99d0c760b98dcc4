//! Tool handler port
//!
//! A [`ToolHandler`] performs the side effect behind one or more catalog
//! entries. Handlers only ever receive parameters that already passed schema
//! validation, plus the caller's [`ExecutionContext`] as an explicit argument.
//!
//! # Outcomes
//!
//! | Handler returns | Gate reports |
//! |-----------------|--------------|
//! | `Ok(ToolResult { success: true, .. })` | the result unchanged |
//! | `Ok(ToolResult { success: false, .. })` | the result unchanged (e.g. a policy denial) |
//! | `Err(HandlerError)` | failed result with code `INTERNAL` |
//! | panic | failed result with code `INTERNAL` |
//!
//! Handlers that call remote systems must bound their own I/O; the gate only
//! applies a timeout when one is configured.

use async_trait::async_trait;
use opsgate_domain::tool::{
    context::ExecutionContext,
    entities::ToolDefinition,
    value_objects::{ToolResult, ValidatedParams},
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Unexpected handler failure.
///
/// `message` is shown to users; `details` is lower-level text that the
/// handler has already redacted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HandlerError {
    pub message: String,
    pub details: Option<String>,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Port for the code that actually performs a tool's operation.
///
/// One handler may serve several definitions; it receives the definition of
/// the tool being invoked.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(
        &self,
        tool: &ToolDefinition,
        params: ValidatedParams,
        ctx: &ExecutionContext,
    ) -> Result<ToolResult, HandlerError>;
}

type BoxedHandlerFuture = Pin<Box<dyn Future<Output = Result<ToolResult, HandlerError>> + Send>>;

type HandlerFn =
    dyn Fn(ToolDefinition, ValidatedParams, ExecutionContext) -> BoxedHandlerFuture + Send + Sync;

/// Handler backed by a closure.
///
/// The closure receives owned copies of its arguments so it can move them
/// into the returned future.
///
/// ```ignore
/// let handler = FnHandler::new(|tool, params, _ctx| async move {
///     Ok(ToolResult::success(format!("{} ok", tool.name)))
/// });
/// ```
#[derive(Clone)]
pub struct FnHandler {
    f: Arc<HandlerFn>,
}

impl FnHandler {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(ToolDefinition, ValidatedParams, ExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolResult, HandlerError>> + Send + 'static,
    {
        Self {
            f: Arc::new(move |tool, params, ctx| Box::pin(f(tool, params, ctx))),
        }
    }
}

impl std::fmt::Debug for FnHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl ToolHandler for FnHandler {
    async fn handle(
        &self,
        tool: &ToolDefinition,
        params: ValidatedParams,
        ctx: &ExecutionContext,
    ) -> Result<ToolResult, HandlerError> {
        (self.f)(tool.clone(), params, ctx.clone()).await
    }
}

/// Handler that reports every invocation as unimplemented.
///
/// Useful for catalogs built for ranking or planning only.
#[derive(Debug, Clone, Default)]
pub struct UnimplementedHandler;

#[async_trait]
impl ToolHandler for UnimplementedHandler {
    async fn handle(
        &self,
        tool: &ToolDefinition,
        _params: ValidatedParams,
        _ctx: &ExecutionContext,
    ) -> Result<ToolResult, HandlerError> {
        Err(HandlerError::new(format!(
            "Tool '{}' has no handler configured",
            tool.name
        )))
    }
}
