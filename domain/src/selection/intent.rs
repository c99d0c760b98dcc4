//! Request intent vocabulary.
//!
//! An [`IntentClassifier`] turns free text into [`IntentSignals`]; the
//! ranker only ever sees the signals. Keeping the classifier behind a trait
//! lets a keyword matcher be swapped for a better model without touching
//! ranking or orchestration.

use serde::{Deserialize, Serialize};

/// Coarse topic of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Database,
    /// Reverse proxy, ports, redirects
    Routing,
    /// Domains and certificates
    Domain,
    /// Hosts and servers
    Server,
    /// Applications, compose stacks, deployments
    Application,
    /// Read-only exploration (nothing matched)
    #[default]
    Query,
}

impl Intent {
    pub fn as_str(&self) -> &str {
        match self {
            Intent::Database => "database",
            Intent::Routing => "routing",
            Intent::Domain => "domain",
            Intent::Server => "server",
            Intent::Application => "application",
            Intent::Query => "query",
        }
    }

    pub fn is_query(&self) -> bool {
        matches!(self, Intent::Query)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything the ranker needs to know about a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentSignals {
    pub intent: Intent,
    /// Database engine named explicitly (e.g. "postgres")
    pub engine: Option<String>,
    pub wants_list: bool,
    pub wants_get: bool,
    pub wants_create: bool,
    pub wants_delete: bool,
    pub wants_deploy: bool,
}

impl IntentSignals {
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            ..Default::default()
        }
    }

    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    /// Whether the request implies creating or destroying something.
    pub fn is_mutating(&self) -> bool {
        self.wants_create || self.wants_delete
    }
}

/// Classifies a request into [`IntentSignals`].
///
/// Implementations must be deterministic: identical text yields identical
/// signals.
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> IntentSignals;
}

/// Classifier that reports every request as read-only exploration.
#[derive(Debug, Clone, Default)]
pub struct QueryOnlyClassifier;

impl IntentClassifier for QueryOnlyClassifier {
    fn classify(&self, _text: &str) -> IntentSignals {
        IntentSignals::default()
    }
}
