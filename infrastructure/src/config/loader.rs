//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["opsgate.toml", ".opsgate.toml"];
const ENV_PREFIX: &str = "OPSGATE_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `OPSGATE_*` environment variables (`__` separates sections)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./opsgate.toml` or `./.opsgate.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/opsgate/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path).extract().map_err(Box::new)
    }

    /// The merged provider chain, before extraction.
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load only default configuration
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns `$XDG_CONFIG_HOME/opsgate/config.toml` if set,
    /// otherwise the platform config directory.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("opsgate").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.selection.max_tools, 20);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("opsgate"));
    }

    #[test]
    fn test_project_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "opsgate.toml",
                r#"
[selection]
max_tools = 8
"#,
            )?;
            let config = ConfigLoader::load(None).map_err(|e| *e)?;
            assert_eq!(config.selection.max_tools, 8);
            assert_eq!(config.selection.min_tools, 5);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_path_overrides_project_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "opsgate.toml",
                r#"
[orchestrator]
handler_timeout_secs = 30
"#,
            )?;
            jail.create_file(
                "custom.toml",
                r#"
[orchestrator]
handler_timeout_secs = 90
"#,
            )?;
            let config = ConfigLoader::load(Some(Path::new("custom.toml"))).map_err(|e| *e)?;
            assert_eq!(config.orchestrator.handler_timeout_secs, Some(90));
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_files() {
        Jail::expect_with(|jail| {
            jail.create_file(
                ".opsgate.toml",
                r#"
[selection]
max_tools = 8
"#,
            )?;
            jail.set_env("OPSGATE_SELECTION__MAX_TOOLS", "15");
            jail.set_env("OPSGATE_LOGGING__LEVEL", "debug");
            let config = ConfigLoader::load(None).map_err(|e| *e)?;
            assert_eq!(config.selection.max_tools, 15);
            assert_eq!(config.logging.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        Jail::expect_with(|jail| {
            jail.set_env("OPSGATE_SELECTION__MAX_TOOLS", "many");
            assert!(ConfigLoader::load(None).is_err());
            Ok(())
        });
    }
}
