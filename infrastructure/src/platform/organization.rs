//! Organization tools: projects and environments.
//!
//! These are admitted for every non-query intent so the model can resolve
//! ids before acting.

use super::id_field;
use opsgate_domain::tool::entities::{RiskLevel, ToolDefinition};
use opsgate_domain::tool::schema::{FieldSpec, FieldType};

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "project_all",
            "List every project in the organization with its environments",
            RiskLevel::Low,
        ),
        ToolDefinition::new(
            "project_one",
            "Show one project with its environments and services",
            RiskLevel::Low,
        )
        .with_field(id_field("project_id", "project")),
        ToolDefinition::new("project_create", "Create a new project", RiskLevel::Medium)
            .with_field(
                FieldSpec::required("name", "Project name", FieldType::String)
                    .non_empty()
                    .with_max_length(64),
            )
            .with_field(FieldSpec::optional(
                "description",
                "Free-text description",
                FieldType::String,
            )),
        ToolDefinition::new(
            "project_delete",
            "Delete a project and every service in it",
            RiskLevel::High,
        )
        .with_field(id_field("project_id", "project")),
        ToolDefinition::new(
            "environment_one",
            "Show one environment with its services",
            RiskLevel::Low,
        )
        .with_field(id_field("environment_id", "environment")),
        ToolDefinition::new(
            "environment_create",
            "Create an environment inside a project",
            RiskLevel::Medium,
        )
        .with_field(id_field("project_id", "project"))
        .with_field(FieldSpec::required("name", "Environment name", FieldType::String).non_empty()),
        ToolDefinition::new(
            "environment_delete",
            "Delete an environment and every service in it",
            RiskLevel::High,
        )
        .with_field(id_field("environment_id", "environment")),
    ]
}
