//! Routing and domain tools: reverse proxy, ports, redirects, security
//! headers, domains, and certificates.

use super::id_field;
use opsgate_domain::tool::entities::{RiskLevel, ToolDefinition};
use opsgate_domain::tool::schema::{FieldSpec, FieldType};

fn routing() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "traefik_get_config",
            "Show the generated Traefik configuration of an application",
            RiskLevel::Low,
        )
        .with_field(id_field("application_id", "application")),
        ToolDefinition::new(
            "traefik_update_config",
            "Replace the Traefik configuration of an application",
            RiskLevel::High,
        )
        .with_field(id_field("application_id", "application"))
        .with_field(FieldSpec::required("config", "Traefik YAML", FieldType::String).non_empty()),
        ToolDefinition::new(
            "port_list",
            "List published ports of an application",
            RiskLevel::Low,
        )
        .with_field(id_field("application_id", "application")),
        ToolDefinition::new(
            "port_create",
            "Publish a container port on the host",
            RiskLevel::Medium,
        )
        .with_field(id_field("application_id", "application"))
        .with_field(
            FieldSpec::required("published_port", "Host port", FieldType::Integer)
                .with_range(1.0, 65535.0),
        )
        .with_field(
            FieldSpec::required("target_port", "Container port", FieldType::Integer)
                .with_range(1.0, 65535.0),
        )
        .with_field(
            FieldSpec::optional(
                "protocol",
                "Transport protocol",
                FieldType::Enum(vec!["tcp".into(), "udp".into()]),
            )
            .with_default("tcp"),
        ),
        ToolDefinition::new("port_delete", "Unpublish a port", RiskLevel::High)
            .with_field(id_field("port_id", "port")),
        ToolDefinition::new(
            "redirect_list",
            "List redirects of an application",
            RiskLevel::Low,
        )
        .with_field(id_field("application_id", "application")),
        ToolDefinition::new(
            "redirect_create",
            "Add a regex redirect to an application",
            RiskLevel::Medium,
        )
        .with_field(id_field("application_id", "application"))
        .with_field(FieldSpec::required("regex", "Source pattern", FieldType::String).non_empty())
        .with_field(
            FieldSpec::required("replacement", "Target URL", FieldType::String).non_empty(),
        )
        .with_field(
            FieldSpec::optional("permanent", "Use a 301 instead of 302", FieldType::Boolean)
                .with_default(false),
        ),
        ToolDefinition::new("redirect_delete", "Remove a redirect", RiskLevel::High)
            .with_field(id_field("redirect_id", "redirect")),
        ToolDefinition::new(
            "security_create",
            "Add basic-auth protection to an application",
            RiskLevel::Medium,
        )
        .with_field(id_field("application_id", "application"))
        .with_field(FieldSpec::required("username", "Login name", FieldType::String).non_empty())
        .with_field(
            FieldSpec::required("password", "Login password", FieldType::String)
                .with_min_length(8),
        ),
        ToolDefinition::new(
            "security_delete",
            "Remove basic-auth protection",
            RiskLevel::High,
        )
        .with_field(id_field("security_id", "security rule")),
    ]
}

fn domains() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "domain_list",
            "List domains attached to an application",
            RiskLevel::Low,
        )
        .with_field(id_field("application_id", "application")),
        ToolDefinition::new(
            "domain_create",
            "Attach a domain to an application",
            RiskLevel::Medium,
        )
        .with_field(id_field("application_id", "application"))
        .with_field(FieldSpec::required("host", "Fully qualified host name", FieldType::String).non_empty())
        .with_field(
            FieldSpec::optional("https", "Serve over HTTPS", FieldType::Boolean)
                .with_default(true),
        )
        .with_field(
            FieldSpec::optional("port", "Container port to route to", FieldType::Integer)
                .with_range(1.0, 65535.0),
        ),
        ToolDefinition::new(
            "domain_update",
            "Change host, port, or HTTPS of a domain",
            RiskLevel::Medium,
        )
        .with_field(id_field("domain_id", "domain"))
        .with_field(FieldSpec::optional("host", "New host name", FieldType::String))
        .with_field(FieldSpec::optional("https", "Serve over HTTPS", FieldType::Boolean)),
        ToolDefinition::new("domain_delete", "Detach a domain", RiskLevel::High)
            .with_field(id_field("domain_id", "domain")),
        ToolDefinition::new(
            "certificate_list",
            "List uploaded TLS certificates",
            RiskLevel::Low,
        ),
        ToolDefinition::new(
            "certificate_create",
            "Upload a TLS certificate and private key",
            RiskLevel::Medium,
        )
        .with_field(FieldSpec::required("name", "Certificate name", FieldType::String).non_empty())
        .with_field(FieldSpec::required("certificate", "PEM certificate chain", FieldType::String).non_empty())
        .with_field(FieldSpec::required("private_key", "PEM private key", FieldType::String).non_empty()),
        ToolDefinition::new(
            "certificate_delete",
            "Delete an uploaded certificate",
            RiskLevel::High,
        )
        .with_field(id_field("certificate_id", "certificate")),
    ]
}

pub fn definitions() -> Vec<ToolDefinition> {
    let mut all = routing();
    all.extend(domains());
    all
}
