//! Database tools, one set per engine namespace.

use super::id_field;
use opsgate_domain::selection::DATABASE_NAMESPACES;
use opsgate_domain::tool::entities::{RiskLevel, ToolDefinition};
use opsgate_domain::tool::schema::{FieldSpec, FieldType};

fn engine_label(engine: &str) -> &str {
    match engine {
        "postgres" => "PostgreSQL",
        "mysql" => "MySQL",
        "mariadb" => "MariaDB",
        "mongo" => "MongoDB",
        "redis" => "Redis",
        other => other,
    }
}

fn engine_definitions(engine: &str) -> Vec<ToolDefinition> {
    let label = engine_label(engine);
    let id = format!("{}_id", engine);
    let name = |action: &str| format!("{}_{}", engine, action);

    vec![
        ToolDefinition::new(
            name("one"),
            format!("Show one {} database with its status and connection info", label),
            RiskLevel::Low,
        )
        .with_field(id_field(&id, "database")),
        ToolDefinition::new(
            name("create"),
            format!("Create a {} database in an environment", label),
            RiskLevel::Medium,
        )
        .with_field(
            FieldSpec::required("name", "Database service name", FieldType::String)
                .non_empty()
                .with_max_length(63),
        )
        .with_field(id_field("environment_id", "environment"))
        .with_field(FieldSpec::optional(
            "docker_image",
            "Image override",
            FieldType::String,
        ))
        .with_field(FieldSpec::optional(
            "password",
            "Initial password; generated when omitted",
            FieldType::String,
        )),
        ToolDefinition::new(
            name("deploy"),
            format!("Deploy a {} database", label),
            RiskLevel::Medium,
        )
        .with_field(id_field(&id, "database")),
        ToolDefinition::new(
            name("start"),
            format!("Start a stopped {} database", label),
            RiskLevel::Medium,
        )
        .with_field(id_field(&id, "database")),
        ToolDefinition::new(
            name("stop"),
            format!("Stop a running {} database", label),
            RiskLevel::Medium,
        )
        .with_field(id_field(&id, "database")),
        ToolDefinition::new(
            name("delete"),
            format!("Delete a {} database and its volumes", label),
            RiskLevel::High,
        )
        .with_field(id_field(&id, "database")),
    ]
}

pub fn definitions() -> Vec<ToolDefinition> {
    DATABASE_NAMESPACES
        .iter()
        .flat_map(|engine| engine_definitions(engine))
        .collect()
}
