//! Platform tool definitions
//!
//! The definition set of the hosting platform, grouped by namespace:
//!
//! | Module | Namespaces |
//! |--------|------------|
//! | `organization` | project, environment |
//! | `database` | postgres, mysql, mariadb, mongo, redis |
//! | `network` | traefik, port, redirect, security, domain, certificate |
//! | `compute` | server, docker, application, compose, deployment |
//!
//! Only definitions live here. The handler that talks to the platform API is
//! supplied by the embedding service through [`register_platform_tools`].

mod compute;
mod database;
mod network;
mod organization;

use opsgate_application::{CatalogError, ToolCatalog, ToolHandler};
use opsgate_domain::tool::entities::ToolDefinition;
use opsgate_domain::tool::schema::{FieldSpec, FieldType};
use std::sync::Arc;

/// Required, non-empty id parameter.
fn id_field(name: &str, what: &str) -> FieldSpec {
    FieldSpec::required(name, format!("Id of the {}", what), FieldType::String).non_empty()
}

/// Every platform definition in registration order.
pub fn platform_definitions() -> Vec<ToolDefinition> {
    let mut all = organization::definitions();
    all.extend(database::definitions());
    all.extend(network::definitions());
    all.extend(compute::definitions());
    all
}

/// Register every platform definition with one shared handler.
pub fn register_platform_tools(
    catalog: &ToolCatalog,
    handler: Arc<dyn ToolHandler>,
) -> Result<(), CatalogError> {
    catalog.register_all(platform_definitions(), handler)
}
