//! Use cases
//!
//! Application-level operations that drive the catalog, the execution gate,
//! and run state.

pub mod execute_tool;
pub mod orchestrate_run;
pub mod select_tools;
