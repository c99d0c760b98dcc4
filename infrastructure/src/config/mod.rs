//! Configuration file loading for opsgate
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `OPSGATE_*` environment variables
//! 2. `load(Some(path))` explicit file
//! 3. Project root: `./opsgate.toml` or `./.opsgate.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/opsgate/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileLoggingConfig, FileOrchestratorConfig,
    FileSelectionConfig,
};
pub use loader::ConfigLoader;
