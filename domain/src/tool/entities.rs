//! Tool domain entities

use super::schema::{FieldSpec, ParameterSchema};
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Action suffixes that destroy state. Hidden from ranking unless the
/// request explicitly asks for a deletion.
pub const DESTRUCTIVE_ACTIONS: &[&str] = &["delete", "remove", "destroy"];

/// Actions that only read state.
pub const READ_ONLY_ACTIONS: &[&str] = &["list", "get", "one", "info", "status", "logs", "search"];

/// Risk level of a tool operation (blast radius)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Read-only or trivially reversible (e.g., `project_list`)
    Low,
    /// Creates or mutates a single resource (e.g., `postgres_create`)
    Medium,
    /// Deletes resources or touches shared routing (e.g., `domain_delete`)
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    /// Conventional approval default for this tier.
    ///
    /// Only a convention: definitions may override it either way.
    pub fn conventionally_requires_approval(&self) -> bool {
        matches!(self, RiskLevel::High)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Definition of an operation exposed to the agent.
///
/// Names follow `<namespace>_<action>` (e.g. `domain_create`). The namespace
/// is the text before the first underscore, the action is everything after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "mysql_create")
    pub name: String,
    /// Human/model-facing description
    pub description: String,
    /// Grouping used for display and ranking; defaults to the namespace
    pub category: String,
    /// Parameter schema validated before every invocation
    pub schema: ParameterSchema,
    /// Risk tier of this tool
    pub risk_level: RiskLevel,
    /// Whether a human must approve each invocation
    pub requires_approval: bool,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        risk_level: RiskLevel,
    ) -> Self {
        let name = name.into();
        let category = namespace_of(&name).to_string();
        Self {
            name,
            description: description.into(),
            category,
            schema: ParameterSchema::new(),
            risk_level,
            requires_approval: risk_level.conventionally_requires_approval(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_schema(mut self, schema: ParameterSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.schema = self.schema.with_field(field);
        self
    }

    pub fn with_approval(mut self, requires_approval: bool) -> Self {
        self.requires_approval = requires_approval;
        self
    }

    pub fn namespace(&self) -> &str {
        namespace_of(&self.name)
    }

    pub fn action(&self) -> &str {
        self.name
            .split_once('_')
            .map(|(_, action)| action)
            .unwrap_or("")
    }

    /// Whether any word of the action is a destructive verb.
    pub fn is_destructive(&self) -> bool {
        self.action()
            .split('_')
            .any(|word| DESTRUCTIVE_ACTIONS.contains(&word))
    }

    /// Whether the action's leading verb only reads state.
    pub fn is_read_only(&self) -> bool {
        self.action()
            .split('_')
            .next()
            .is_some_and(|verb| READ_ONLY_ACTIONS.contains(&verb))
    }

    pub fn is_low_risk(&self) -> bool {
        self.risk_level == RiskLevel::Low
    }

    /// Check the `<namespace>_<action>` naming convention.
    pub fn validate_name(name: &str) -> Result<(), DomainError> {
        let valid_chars = name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        let segments_ok = name.contains('_') && name.split('_').all(|s| !s.is_empty());
        if valid_chars && segments_ok {
            Ok(())
        } else {
            Err(DomainError::InvalidToolName(name.to_string()))
        }
    }
}

fn namespace_of(name: &str) -> &str {
    name.split_once('_').map(|(ns, _)| ns).unwrap_or(name)
}
