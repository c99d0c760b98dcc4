//! Wiring a [`ControlPlane`] from configuration.
//!
//! ```text
//! FileConfig ─┬─▶ SelectionParams ───────┐
//!             ├─▶ OrchestratorParams ────┤
//!             └─▶ logging.audit_file ────┼─▶ ControlPlane
//! KeywordIntentClassifier ───────────────┤
//! platform definitions + handler ────────┤  (registered lazily)
//! InMemoryRunRepository ─────────────────┘
//! ```

use crate::config::{ConfigValidationError, FileConfig};
use crate::logging::JsonlAuditLogger;
use crate::platform::register_platform_tools;
use crate::selection::KeywordIntentClassifier;
use opsgate_application::{
    AuditLogger, ControlPlane, InMemoryRunRepository, NoAuditLog, RunRepository, ToolCatalog,
    ToolHandler,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("invalid configuration: {}", join(.0))]
    InvalidConfig(Vec<ConfigValidationError>),

    #[error("intent classifier: {0}")]
    Classifier(#[from] regex::Error),
}

fn join(issues: &[ConfigValidationError]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Builder for a fully wired [`ControlPlane`].
pub struct ControlPlaneBuilder {
    config: FileConfig,
    handler: Arc<dyn ToolHandler>,
    repository: Option<Arc<dyn RunRepository>>,
    audit: Option<Arc<dyn AuditLogger>>,
}

impl ControlPlaneBuilder {
    /// `handler` serves every platform tool.
    pub fn new(config: FileConfig, handler: Arc<dyn ToolHandler>) -> Self {
        Self {
            config,
            handler,
            repository: None,
            audit: None,
        }
    }

    /// Replace the in-memory repository.
    pub fn with_repository(mut self, repository: Arc<dyn RunRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Replace the audit sink named by `logging.audit_file`.
    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn build(self) -> Result<ControlPlane, BootstrapError> {
        let issues = self.config.validate();
        if !issues.is_empty() {
            return Err(BootstrapError::InvalidConfig(issues));
        }

        let classifier = Arc::new(KeywordIntentClassifier::new()?);

        let handler = self.handler;
        let catalog = ToolCatalog::new()
            .with_initializer(move |catalog| register_platform_tools(catalog, Arc::clone(&handler)));

        let repository = self
            .repository
            .unwrap_or_else(|| Arc::new(InMemoryRunRepository::new()));

        let audit = self
            .audit
            .unwrap_or_else(|| audit_logger_for(&self.config));

        info!(
            min_tools = self.config.selection.min_tools,
            max_tools = self.config.selection.max_tools,
            "Control plane configured"
        );

        Ok(
            ControlPlane::new(Arc::new(catalog), classifier, repository)
                .with_selection_params(self.config.to_selection_params())
                .with_orchestrator_params(self.config.to_orchestrator_params())
                .with_audit_logger(audit),
        )
    }
}

/// The JSONL audit sink from `logging.audit_file`, or the no-op sink.
pub fn audit_logger_for(config: &FileConfig) -> Arc<dyn AuditLogger> {
    let Some(path) = config.logging.audit_path() else {
        return Arc::new(NoAuditLog);
    };
    match JsonlAuditLogger::new(&path) {
        Some(logger) => Arc::new(logger),
        None => {
            warn!(path = %path.display(), "Audit log unavailable; continuing without it");
            Arc::new(NoAuditLog)
        }
    }
}

/// Shorthand for [`ControlPlaneBuilder::new`]`(config, handler).build()`.
pub fn build_control_plane(
    config: FileConfig,
    handler: Arc<dyn ToolHandler>,
) -> Result<ControlPlane, BootstrapError> {
    ControlPlaneBuilder::new(config, handler).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsgate_application::UnimplementedHandler;

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = FileConfig::default();
        config.selection.max_tools = 0;
        let Err(err) = build_control_plane(config, Arc::new(UnimplementedHandler)) else {
            panic!("expected an invalid config error");
        };
        assert!(matches!(err, BootstrapError::InvalidConfig(ref issues) if issues.len() == 1));
        assert!(err.to_string().contains("max_tools"));
    }

    #[test]
    fn test_catalog_populates_lazily() {
        let cp = build_control_plane(FileConfig::default(), Arc::new(UnimplementedHandler)).unwrap();
        assert!(cp.catalog().is_empty());
        let tools = cp.list_tools().unwrap();
        assert_eq!(tools.len(), crate::platform::platform_definitions().len());
        // second call replays, never re-registers
        assert_eq!(cp.list_tools().unwrap().len(), tools.len());
    }

    #[test]
    fn test_audit_file_is_opened() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = FileConfig::default();
        config.logging.audit_file = Some(dir.path().join("audit.jsonl").to_string_lossy().into_owned());
        let _audit = audit_logger_for(&config);
        assert!(dir.path().join("audit.jsonl").exists());
    }
}
