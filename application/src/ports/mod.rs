//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.
//! Each carries a built-in implementation usable without any adapter.

pub mod audit_logger;
pub mod run_repository;
pub mod tool_handler;
