//! Tool domain module
//!
//! This module defines the **Tool Catalog** vocabulary: how the agent is
//! offered a bounded, typed set of infrastructure operations instead of
//! arbitrary code.
//!
//! # Overview
//!
//! Every operation is described by a [`ToolDefinition`] (name, schema, risk
//! tier, approval flag). Raw parameters are checked by a [`ToolValidator`]
//! and become [`ValidatedParams`]; the handler then produces a [`ToolResult`].
//!
//! ```text
//! ┌────────────────┐    ┌─────────────────┐    ┌──────────────┐
//! │ ToolDefinition │───▶│ ValidatedParams │───▶│ ToolResult   │
//! │ (schema, risk) │    │ (schema-checked)│    │ (outcome)    │
//! └────────────────┘    └─────────────────┘    └──────────────┘
//! ```
//!
//! # Risk and Approval
//!
//! | Risk | Examples | Approval by convention |
//! |------|----------|------------------------|
//! | **Low** | `project_list`, `postgres_list` | No |
//! | **Medium** | `postgres_create`, `application_deploy` | No |
//! | **High** | `domain_delete`, `server_remove_node` | Yes |
//!
//! The approval flag is independent of the tier; the convention is checked
//! as a lint by the catalog rather than enforced by the type.
//!
//! # Architecture
//!
//! - **Domain** (this module): Pure definitions, no I/O
//! - **Application** (`ToolHandler`, `ToolCatalog`, `ExecutionGate`):
//!   registration and invocation
//! - **Infrastructure**: concrete definition sets and handler adapters

pub mod context;
pub mod entities;
pub mod schema;
pub mod traits;
pub mod value_objects;

pub use context::ExecutionContext;
pub use entities::{DESTRUCTIVE_ACTIONS, READ_ONLY_ACTIONS, RiskLevel, ToolDefinition};
pub use schema::{FieldRules, FieldSpec, FieldType, ParameterSchema};
pub use traits::{SchemaValidator, ToolValidator};
pub use value_objects::{FieldError, ToolError, ToolResult, ValidatedParams};
