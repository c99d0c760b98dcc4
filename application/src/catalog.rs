//! Tool Catalog
//!
//! The registry of every operation the agent may call. Each entry pairs a
//! [`ToolDefinition`] with the [`ToolHandler`] that performs it.
//!
//! # Lifecycle
//!
//! ```text
//! ToolCatalog::new().with_initializer(f)
//!        │
//!        ▼  first use (any thread)
//! ensure_initialized() ──▶ f(&catalog) runs once ──▶ outcome stored
//!        │
//!        ▼  later calls
//! ensure_initialized() ──▶ stored outcome replayed
//! ```
//!
//! The catalog is read-mostly after initialization and can be shared across
//! runs behind an `Arc`. The one-shot guard belongs to the instance, so
//! separate catalogs (e.g. in tests) never share initialization state.
//!
//! # Registration rules
//!
//! - names follow `<namespace>_<action>`; anything else is [`CatalogError::InvalidName`]
//! - a second registration under the same name is [`CatalogError::DuplicateTool`]
//! - listing order is registration order, which keeps ranking ties stable

use crate::ports::tool_handler::ToolHandler;
use opsgate_domain::core::error::ErrorCode;
use opsgate_domain::tool::entities::{RiskLevel, ToolDefinition};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised while populating the catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("Invalid tool name '{0}': expected <namespace>_<action>")]
    InvalidName(String),

    #[error("Catalog initialization failed: {0}")]
    Initialization(String),
}

impl CatalogError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CatalogError::DuplicateTool(_) => ErrorCode::BadRequest,
            CatalogError::InvalidName(_) => ErrorCode::ValidationError,
            CatalogError::Initialization(_) => ErrorCode::Internal,
        }
    }
}

/// A registered tool: its definition and the handler that runs it.
#[derive(Clone)]
pub struct CatalogEntry {
    pub definition: ToolDefinition,
    pub handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct Entries {
    order: Vec<String>,
    by_name: HashMap<String, CatalogEntry>,
}

type Initializer = Box<dyn Fn(&ToolCatalog) -> Result<(), CatalogError> + Send + Sync>;

/// Registry of tool definitions and their handlers.
#[derive(Default)]
pub struct ToolCatalog {
    entries: RwLock<Entries>,
    initializer: Option<Initializer>,
    init: OnceLock<Result<(), CatalogError>>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the one-shot population routine run by [`ensure_initialized`](Self::ensure_initialized).
    ///
    /// The routine must not call `ensure_initialized` itself.
    pub fn with_initializer<F>(mut self, f: F) -> Self
    where
        F: Fn(&ToolCatalog) -> Result<(), CatalogError> + Send + Sync + 'static,
    {
        self.initializer = Some(Box::new(f));
        self
    }

    /// Run the initializer at most once and replay its outcome afterwards.
    ///
    /// Without an initializer this is always `Ok`.
    pub fn ensure_initialized(&self) -> Result<(), CatalogError> {
        self.init
            .get_or_init(|| {
                let Some(initializer) = &self.initializer else {
                    return Ok(());
                };
                let outcome = initializer(self);
                match &outcome {
                    Ok(()) => info!(tools = self.len(), "Tool catalog initialized"),
                    Err(e) => warn!(error = %e, "Tool catalog initialization failed"),
                }
                outcome
            })
            .clone()
    }

    /// Register a tool. Duplicate or malformed names are hard errors.
    pub fn register(
        &self,
        definition: ToolDefinition,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), CatalogError> {
        ToolDefinition::validate_name(&definition.name)
            .map_err(|_| CatalogError::InvalidName(definition.name.clone()))?;

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.by_name.contains_key(&definition.name) {
            return Err(CatalogError::DuplicateTool(definition.name));
        }

        debug!(tool = %definition.name, risk = %definition.risk_level, "Registered tool");
        let name = definition.name.clone();
        entries.order.push(name.clone());
        entries.by_name.insert(
            name,
            CatalogEntry {
                definition,
                handler,
            },
        );
        Ok(())
    }

    /// Register several definitions that share one handler.
    pub fn register_all(
        &self,
        definitions: impl IntoIterator<Item = ToolDefinition>,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), CatalogError> {
        for definition in definitions {
            self.register(definition, Arc::clone(&handler))?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<ToolDefinition> {
        self.entry(name).map(|e| e.definition)
    }

    pub fn entry(&self, name: &str) -> Option<CatalogEntry> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.by_name.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.by_name.contains_key(name)
    }

    /// All definitions in registration order.
    pub fn list(&self) -> Vec<ToolDefinition> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .order
            .iter()
            .filter_map(|name| entries.by_name.get(name))
            .map(|e| e.definition.clone())
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.order.clone()
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// High-risk tools that do not require approval.
    ///
    /// High risk conventionally implies approval, but the two fields are
    /// independent; this reports the exceptions so they can be reviewed.
    pub fn lint_risk_policy(&self) -> Vec<String> {
        self.list()
            .into_iter()
            .filter(|d| d.risk_level == RiskLevel::High && !d.requires_approval)
            .map(|d| d.name)
            .collect()
    }
}

impl std::fmt::Debug for ToolCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolCatalog")
            .field("tools", &self.names())
            .field("initialized", &self.init.get().is_some())
            .finish()
    }
}
