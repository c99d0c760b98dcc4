//! Execution Gate.
//!
//! The single entry point for invoking a tool:
//!
//! ```text
//! execute(name, raw_params, ctx)
//!   1. look up the tool          ──▶ NOT_FOUND
//!   2. validate raw_params       ──▶ VALIDATION_ERROR (handler never called)
//!   3. invoke the handler        ──▶ Err / panic ──▶ INTERNAL
//!                                ──▶ over time bound ──▶ TIMEOUT
//!   4. return the handler's ToolResult unchanged
//! ```
//!
//! The gate never returns an error to its caller: every outcome is a
//! [`ToolResult`]. It does not enforce approval either; plan-driven calls are
//! gated by the orchestrator, and ad-hoc callers check
//! [`ExecutionGate::requires_approval`] themselves.

use crate::catalog::ToolCatalog;
use crate::config::OrchestratorParams;
use futures::FutureExt;
use opsgate_domain::tool::{
    context::ExecutionContext,
    traits::{SchemaValidator, ToolValidator},
    value_objects::{ToolError, ToolResult},
};
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Validates parameters and invokes tool handlers.
pub struct ExecutionGate {
    catalog: Arc<ToolCatalog>,
    validator: Arc<dyn ToolValidator>,
    handler_timeout: Option<Duration>,
}

impl Clone for ExecutionGate {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog.clone(),
            validator: self.validator.clone(),
            handler_timeout: self.handler_timeout,
        }
    }
}

impl ExecutionGate {
    pub fn new(catalog: Arc<ToolCatalog>) -> Self {
        Self {
            catalog,
            validator: Arc::new(SchemaValidator),
            handler_timeout: None,
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn ToolValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_params(mut self, params: &OrchestratorParams) -> Self {
        self.handler_timeout = params.handler_timeout;
        self
    }

    pub fn with_handler_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.handler_timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &Arc<ToolCatalog> {
        &self.catalog
    }

    /// Whether the named tool requires approval; `None` if it is unknown.
    pub fn requires_approval(&self, name: &str) -> Option<bool> {
        self.catalog.get(name).map(|d| d.requires_approval)
    }

    /// Validate `raw_params` and run the tool's handler.
    pub async fn execute(&self, name: &str, raw_params: &Value, ctx: &ExecutionContext) -> ToolResult {
        if let Err(e) = self.catalog.ensure_initialized() {
            warn!(tool = name, error = %e, "Gate: catalog unavailable");
            return ToolResult::failure(ToolError::internal("Tool catalog is unavailable"));
        }

        let Some(entry) = self.catalog.entry(name) else {
            warn!(tool = name, "Gate: unknown tool");
            return ToolResult::failure(ToolError::not_found(name));
        };

        let params = match self.validator.validate(raw_params, &entry.definition) {
            Ok(params) => params,
            Err(field_errors) => {
                warn!(
                    tool = name,
                    errors = field_errors.len(),
                    "Gate: parameter validation failed"
                );
                return ToolResult::failure(ToolError::validation(name, field_errors));
            }
        };

        debug!(tool = name, user = %ctx.user_id, "Gate: invoking handler");
        let started = Instant::now();
        let invocation =
            AssertUnwindSafe(entry.handler.handle(&entry.definition, params, ctx)).catch_unwind();

        let outcome = match self.handler_timeout {
            Some(limit) => match tokio::time::timeout(limit, invocation).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(tool = name, timeout_ms = limit.as_millis() as u64, "Gate: handler timed out");
                    return ToolResult::failure(ToolError::timeout(name));
                }
            },
            None => invocation.await,
        };

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!(tool = name, error = %e, "Gate: handler failed");
                let mut error = ToolError::internal(e.message);
                if let Some(details) = e.details {
                    error = error.with_details(details);
                }
                ToolResult::failure(error)
            }
            Err(panic) => {
                warn!(
                    tool = name,
                    panic = panic_message(panic.as_ref()),
                    "Gate: handler panicked"
                );
                ToolResult::failure(ToolError::internal(format!(
                    "Tool '{}' failed unexpectedly",
                    name
                )))
            }
        };

        debug!(
            tool = name,
            success = result.success,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Gate: handler finished"
        );
        result
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
