//! Logging infrastructure: tracing setup and the structured audit trail.
//!
//! - [`init_tracing`] installs the process-wide `tracing` subscriber.
//! - [`JsonlAuditLogger`] is a JSONL file writer that implements the
//!   [`AuditLogger`](opsgate_application::AuditLogger) port.

mod jsonl_audit;
mod subscriber;

pub use jsonl_audit::JsonlAuditLogger;
pub use subscriber::{env_filter, init_tracing};
