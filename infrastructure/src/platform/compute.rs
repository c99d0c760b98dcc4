//! Server and application tools: hosts, containers, applications, compose
//! stacks, and deployments.

use super::id_field;
use opsgate_domain::tool::entities::{RiskLevel, ToolDefinition};
use opsgate_domain::tool::schema::{FieldSpec, FieldType};

fn servers() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new("server_list", "List registered servers", RiskLevel::Low),
        ToolDefinition::new(
            "server_one",
            "Show one server with its resources and status",
            RiskLevel::Low,
        )
        .with_field(id_field("server_id", "server")),
        ToolDefinition::new(
            "server_create",
            "Register a server reachable over SSH",
            RiskLevel::Medium,
        )
        .with_field(FieldSpec::required("name", "Server name", FieldType::String).non_empty())
        .with_field(FieldSpec::required("ip_address", "Public address", FieldType::String).non_empty())
        .with_field(
            FieldSpec::optional("port", "SSH port", FieldType::Integer)
                .with_range(1.0, 65535.0)
                .with_default(22),
        )
        .with_field(FieldSpec::required("ssh_key_id", "SSH key to connect with", FieldType::String)),
        ToolDefinition::new(
            "server_setup",
            "Install the container runtime and proxy on a server",
            RiskLevel::High,
        )
        .with_field(id_field("server_id", "server")),
        ToolDefinition::new(
            "server_delete",
            "Remove a server from the organization",
            RiskLevel::High,
        )
        .with_field(id_field("server_id", "server")),
        ToolDefinition::new(
            "docker_list_containers",
            "List containers running on a server",
            RiskLevel::Low,
        )
        .with_field(FieldSpec::optional("server_id", "Server; local host when omitted", FieldType::String)),
        ToolDefinition::new(
            "docker_logs",
            "Tail the logs of a container",
            RiskLevel::Low,
        )
        .with_field(id_field("container_id", "container"))
        .with_field(
            FieldSpec::optional("tail", "Number of lines", FieldType::Integer)
                .with_range(1.0, 5000.0)
                .with_default(100),
        ),
        ToolDefinition::new(
            "docker_restart_container",
            "Restart a single container",
            RiskLevel::Medium,
        )
        .with_field(id_field("container_id", "container")),
    ]
}

fn applications() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "application_one",
            "Show one application with its build settings and status",
            RiskLevel::Low,
        )
        .with_field(id_field("application_id", "application")),
        ToolDefinition::new(
            "application_create",
            "Create an application in an environment",
            RiskLevel::Medium,
        )
        .with_field(
            FieldSpec::required("name", "Application name", FieldType::String)
                .non_empty()
                .with_max_length(63),
        )
        .with_field(id_field("environment_id", "environment"))
        .with_field(FieldSpec::optional(
            "server_id",
            "Target server; the default server when omitted",
            FieldType::String,
        )),
        ToolDefinition::new(
            "application_deploy",
            "Build and deploy an application",
            RiskLevel::Medium,
        )
        .with_field(id_field("application_id", "application")),
        ToolDefinition::new(
            "application_redeploy",
            "Redeploy an application without rebuilding",
            RiskLevel::Medium,
        )
        .with_field(id_field("application_id", "application")),
        ToolDefinition::new("application_start", "Start an application", RiskLevel::Medium)
            .with_field(id_field("application_id", "application")),
        ToolDefinition::new("application_stop", "Stop an application", RiskLevel::Medium)
            .with_field(id_field("application_id", "application")),
        ToolDefinition::new(
            "application_delete",
            "Delete an application and its deployments",
            RiskLevel::High,
        )
        .with_field(id_field("application_id", "application")),
        ToolDefinition::new(
            "compose_one",
            "Show one compose stack with its services",
            RiskLevel::Low,
        )
        .with_field(id_field("compose_id", "compose stack")),
        ToolDefinition::new(
            "compose_create",
            "Create a compose stack from a compose file",
            RiskLevel::Medium,
        )
        .with_field(FieldSpec::required("name", "Stack name", FieldType::String).non_empty())
        .with_field(id_field("environment_id", "environment"))
        .with_field(FieldSpec::required("compose_file", "docker-compose YAML", FieldType::String).non_empty()),
        ToolDefinition::new("compose_deploy", "Deploy a compose stack", RiskLevel::Medium)
            .with_field(id_field("compose_id", "compose stack")),
        ToolDefinition::new(
            "compose_delete",
            "Delete a compose stack and its volumes",
            RiskLevel::High,
        )
        .with_field(id_field("compose_id", "compose stack")),
        ToolDefinition::new(
            "deployment_list",
            "List recent deployments of an application",
            RiskLevel::Low,
        )
        .with_field(id_field("application_id", "application"))
        .with_field(
            FieldSpec::optional("limit", "Maximum entries", FieldType::Integer)
                .with_range(1.0, 100.0)
                .with_default(10),
        ),
    ]
}

pub fn definitions() -> Vec<ToolDefinition> {
    let mut all = servers();
    all.extend(applications());
    all
}
