//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`SelectionParams`] : default floor and cap for tool selection
//! - [`OrchestratorParams`] : handler and per-run lock time bounds

pub mod orchestrator_params;
pub mod selection_params;

pub use orchestrator_params::OrchestratorParams;
pub use selection_params::SelectionParams;
