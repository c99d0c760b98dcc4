//! Select Tools use case.
//!
//! Turns a free-text request into the small, ordered set of catalog entries
//! worth offering to a model for that request. Classification is delegated
//! to an [`IntentClassifier`]; ranking is the deterministic [`ToolRanker`].

use crate::catalog::{CatalogError, ToolCatalog};
use crate::config::SelectionParams;
use opsgate_domain::selection::{IntentClassifier, ScopeHints, ToolRanker};
use opsgate_domain::tool::entities::ToolDefinition;
use std::sync::Arc;
use tracing::debug;

/// Per-request scoping hints and bounds.
///
/// Scope ids only reorder results; they never admit extra namespaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionOptions {
    pub project_id: Option<String>,
    pub server_id: Option<String>,
    /// Overrides the configured floor for non-query intents
    pub min_tools: Option<usize>,
    /// Overrides the configured cap
    pub max_tools: Option<usize>,
}

impl SelectionOptions {
    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_server(mut self, server_id: impl Into<String>) -> Self {
        self.server_id = Some(server_id.into());
        self
    }

    pub fn with_min_tools(mut self, min: usize) -> Self {
        self.min_tools = Some(min);
        self
    }

    pub fn with_max_tools(mut self, max: usize) -> Self {
        self.max_tools = Some(max);
        self
    }

    fn hints(&self) -> ScopeHints {
        ScopeHints {
            has_project: self.project_id.is_some(),
            has_server: self.server_id.is_some(),
        }
    }
}

/// Use case for selecting relevant tools.
pub struct SelectToolsUseCase {
    catalog: Arc<ToolCatalog>,
    classifier: Arc<dyn IntentClassifier>,
    ranker: ToolRanker,
    params: SelectionParams,
}

impl Clone for SelectToolsUseCase {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog.clone(),
            classifier: self.classifier.clone(),
            ranker: self.ranker.clone(),
            params: self.params,
        }
    }
}

impl SelectToolsUseCase {
    pub fn new(catalog: Arc<ToolCatalog>, classifier: Arc<dyn IntentClassifier>) -> Self {
        Self {
            catalog,
            classifier,
            ranker: ToolRanker::new(),
            params: SelectionParams::default(),
        }
    }

    pub fn with_params(mut self, params: SelectionParams) -> Self {
        self.params = params;
        self
    }

    /// Select tools for `text`, most relevant first.
    pub fn execute(
        &self,
        text: &str,
        options: &SelectionOptions,
    ) -> Result<Vec<ToolDefinition>, CatalogError> {
        self.catalog.ensure_initialized()?;

        let signals = self.classifier.classify(text);
        let limits = self.params.limits(options.min_tools, options.max_tools);
        let definitions = self.catalog.list();
        let refs: Vec<&ToolDefinition> = definitions.iter().collect();

        let selected: Vec<ToolDefinition> = self
            .ranker
            .rank(text, &signals, options.hints(), limits, &refs)
            .into_iter()
            .cloned()
            .collect();

        debug!(
            intent = %signals.intent,
            engine = ?signals.engine,
            candidates = definitions.len(),
            selected = selected.len(),
            "Selected tools"
        );
        Ok(selected)
    }
}
