//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.kiauto/config.toml` (global user preferences)
//! 3. **Project config** - `./.kiauto/config.toml` (project-specific overrides)
//! 4. **CLI arguments** - Command-line flags (highest priority)

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use crate::config::types::{
    AutomationConfig, DisplayConfig, PollingConfig, RecordingConfig, ToolsConfig,
};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;

/// Load configuration from the hierarchy of config files.
///
/// Loads and merges configuration from:
/// 1. Default values
/// 2. User config (`~/.kiauto/config.toml`)
/// 3. Project config (`./.kiauto/config.toml`)
///
/// # Errors
///
/// Returns an error if a file cannot be parsed or validation fails.
/// Missing config files are not errors.
pub fn load_hierarchy() -> Result<AutomationConfig, ConfigError> {
    let user_path = dirs::home_dir().map(|home| config_path_in(&home));
    let project_root = std::env::current_dir()?;
    load_hierarchy_from(user_path.as_deref(), &project_root)
}

/// Load the hierarchy with explicit locations.
///
/// `user_config` is the full path of the user file; the project file is
/// looked up under `project_root`.
pub fn load_hierarchy_from(
    user_config: Option<&Path>,
    project_root: &Path,
) -> Result<AutomationConfig, ConfigError> {
    let mut config = AutomationConfig::default();

    // File not found is expected, parse errors fail
    if let Some(path) = user_config {
        match load_config_file(path) {
            Ok(user) => config = merge_configs(config, user),
            Err(ConfigError::ConfigNotFound { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    match load_config_file(&config_path_in(project_root)) {
        Ok(project) => config = merge_configs(config, project),
        Err(ConfigError::ConfigNotFound { .. }) => {}
        Err(e) => return Err(e),
    }

    validate_config(&config)?;

    Ok(config)
}

fn config_path_in(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// Load a configuration file from the given path.
pub fn load_config_file(path: &Path) -> Result<AutomationConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        Err(e) => return Err(ConfigError::IoError { source: e }),
    };

    let config = toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        message: format!("'{}': {}", path.display(), e),
    })?;
    debug!(event = "core.config.file_loaded", path = %path.display());
    Ok(config)
}

/// Merge two configurations, with override_config taking precedence.
///
/// Override values replace base values only if present.
pub fn merge_configs(base: AutomationConfig, override_config: AutomationConfig) -> AutomationConfig {
    AutomationConfig {
        display: DisplayConfig {
            width: override_config.display.width.or(base.display.width),
            height: override_config.display.height.or(base.display.height),
            color_depth: override_config
                .display
                .color_depth
                .or(base.display.color_depth),
        },
        recording: RecordingConfig {
            output: override_config.recording.output.or(base.recording.output),
        },
        polling: PollingConfig {
            timeout_ms: override_config
                .polling
                .timeout_ms
                .or(base.polling.timeout_ms),
            poll_interval_ms: override_config
                .polling
                .poll_interval_ms
                .or(base.polling.poll_interval_ms),
            server_timeout_ms: override_config
                .polling
                .server_timeout_ms
                .or(base.polling.server_timeout_ms),
            file_timeout_ms: override_config
                .polling
                .file_timeout_ms
                .or(base.polling.file_timeout_ms),
            file_poll_interval_ms: override_config
                .polling
                .file_poll_interval_ms
                .or(base.polling.file_poll_interval_ms),
        },
        tools: ToolsConfig {
            window_tool: override_config.tools.window_tool.or(base.tools.window_tool),
            clipboard_tool: override_config
                .tools
                .clipboard_tool
                .or(base.tools.clipboard_tool),
            display_server: override_config
                .tools
                .display_server
                .or(base.tools.display_server),
            recorder: override_config.tools.recorder.or(base.tools.recorder),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(root: &Path, content: &str) -> PathBuf {
        let path = config_path_in(root);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_files_yield_defaults() {
        let temp = TempDir::new().unwrap();
        let missing_user = temp.path().join("nope.toml");

        let config = load_hierarchy_from(Some(&missing_user), temp.path()).unwrap();
        assert_eq!(config, AutomationConfig::default());
    }

    #[test]
    fn test_config_hierarchy_integration() {
        let user_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();

        let user_path = write_config(
            user_dir.path(),
            r#"
[display]
width = 1280
height = 1024

[tools]
clipboard_tool = "xsel-wrapper"
"#,
        );
        write_config(
            project_dir.path(),
            r#"
[display]
width = 1920

[polling]
timeout_ms = 30000
"#,
        );

        let config = load_hierarchy_from(Some(&user_path), project_dir.path()).unwrap();
        assert_eq!(config.display.width(), 1920); // Overridden by project
        assert_eq!(config.display.height(), 1024); // From user
        assert_eq!(config.display.color_depth(), 24); // Default
        assert_eq!(config.tools.clipboard_tool(), "xsel-wrapper");
        assert_eq!(config.polling.timeout_ms(), 30000);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let project_dir = TempDir::new().unwrap();
        write_config(project_dir.path(), "invalid toml [[[");

        let result = load_hierarchy_from(None, project_dir.path());
        match result {
            Err(ConfigError::ConfigParseError { message }) => {
                assert!(message.contains("config.toml"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_merged_config_rejected() {
        let project_dir = TempDir::new().unwrap();
        write_config(
            project_dir.path(),
            r#"
[display]
color_depth = 12
"#,
        );

        let result = load_hierarchy_from(None, project_dir.path());
        assert!(matches!(
            result,
            Err(ConfigError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_toml_parsing_edge_cases() {
        let empty: AutomationConfig = toml::from_str("").unwrap();
        assert_eq!(empty.display.width(), 1024);

        let partial: AutomationConfig = toml::from_str(
            r#"
[recording]
output = "/tmp/out/session.ogv"
"#,
        )
        .unwrap();
        assert_eq!(
            partial.recording.output,
            Some(PathBuf::from("/tmp/out/session.ogv"))
        );
        assert_eq!(partial.tools.recorder(), "recordmydesktop");
    }

    #[test]
    fn test_merge_keeps_base_when_override_unset() {
        let mut base = AutomationConfig::default();
        base.recording.output = Some(PathBuf::from("/tmp/base.ogv"));
        base.polling.file_timeout_ms = Some(9000);

        let mut override_config = AutomationConfig::default();
        override_config.polling.timeout_ms = Some(1000);

        let merged = merge_configs(base, override_config);
        assert_eq!(
            merged.recording.output,
            Some(PathBuf::from("/tmp/base.ogv"))
        );
        assert_eq!(merged.polling.file_timeout_ms(), 9000);
        assert_eq!(merged.polling.timeout_ms(), 1000);
    }
}
