//! Logging configuration from TOML (`[logging]` section)
//!
//! ```toml
//! [logging]
//! level = "debug"                              # overridden by RUST_LOG
//! file = "~/.local/state/opsgate/opsgate.log"  # daily-rolling
//! audit_file = "~/.local/state/opsgate/audit.jsonl"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Default `EnvFilter` directive
    pub level: String,
    /// Tracing output file; stderr when unset
    pub file: Option<String>,
    /// JSONL audit trail; disabled when unset
    pub audit_file: Option<String>,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            audit_file: None,
        }
    }
}

impl FileLoggingConfig {
    pub fn file_path(&self) -> Option<PathBuf> {
        self.file.as_deref().map(expand_home)
    }

    pub fn audit_path(&self) -> Option<PathBuf> {
        self.audit_file.as_deref().map(expand_home)
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_defaults() {
        let config = FileLoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.file_path().is_none());
        assert!(config.audit_path().is_none());
    }

    #[test]
    fn test_home_expansion() {
        let config = FileLoggingConfig {
            audit_file: Some("~/audit.jsonl".to_string()),
            ..Default::default()
        };
        let path = config.audit_path().unwrap();
        assert!(path.ends_with("audit.jsonl"));
        if dirs::home_dir().is_some() {
            assert!(!path.starts_with("~"));
        }
    }

    #[test]
    fn test_absolute_path_unchanged() {
        let config = FileLoggingConfig {
            file: Some("/var/log/opsgate.log".to_string()),
            ..Default::default()
        };
        assert_eq!(config.file_path(), Some(PathBuf::from("/var/log/opsgate.log")));
    }
}
