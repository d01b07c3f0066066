//! TOML config loading: read from a path or the platform default location.

use std::path::{Path, PathBuf};

use harbor_common::ConfigError;
use tracing::{info, warn};

use crate::schema::HarborConfig;
use crate::validation;

/// Get the platform-specific default config file path.
///
/// On macOS: `~/Library/Application Support/harbor/config.toml`
/// On Linux: `~/.config/harbor/config.toml`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))?;
    Ok(config_dir.join("harbor").join("config.toml"))
}

/// Load config from a specific TOML file path.
///
/// Missing fields fall back to serde defaults. After parsing, the config is
/// validated; a validation failure is logged as a warning and the parsed
/// config is returned as-is.
pub fn load_from_path(path: &Path) -> Result<HarborConfig, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config: HarborConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    if let Err(e) = validation::validate(&config) {
        warn!("config validation warning: {e}; using parsed config as-is");
    }

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform default path, creating a commented default
/// file if none exists yet.
pub fn load_default() -> Result<HarborConfig, ConfigError> {
    let path = default_config_path()?;

    match load_from_path(&path) {
        Ok(config) => Ok(config),
        Err(ConfigError::ParseError(msg)) if msg.contains("failed to read") => {
            info!("no config found at {}, creating default", path.display());
            create_default_config(&path)?;
            Ok(HarborConfig::default())
        }
        Err(e) => Err(e),
    }
}

/// Write the default TOML template (with documentation comments) to `path`.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::ParseError(format!(
                "failed to create config directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    std::fs::write(path, DEFAULT_CONFIG_TOML).map_err(|e| {
        ConfigError::ParseError(format!(
            "failed to write default config to {}: {e}",
            path.display()
        ))
    })?;

    info!("created default config at {}", path.display());
    Ok(())
}

/// Template written on first launch. Every value shown is the default, so
/// uncommenting a line and editing it is always safe.
const DEFAULT_CONFIG_TOML: &str = r#"# Harbor configuration.
# Every setting is optional; values shown are the defaults.

[shell]
# Shell program. Empty means auto-detect (powershell.exe on Windows,
# $SHELL falling back to /bin/bash elsewhere).
# program = ""
# args = []
# working_directory = "/home/you"
# login_shell = true

# Extra environment variables for the shell:
# [shell.env]
# EDITOR = "nvim"

[terminal]
# cols = 80
# rows = 24
# term = "xterm-256color"

[server]
# Where the renderer connects.
# host = "127.0.0.1"
# port = 9781

[calendar]
# enabled = false
# client_id = ""        # or HARBOR_OAUTH_CLIENT_ID
# client_secret = ""    # or HARBOR_OAUTH_CLIENT_SECRET
# redirect_port = 8721
# calendars = []        # empty = all calendars on the account
# lookahead_days = 7
# max_events = 50

[logging]
# directive = "harbor=info"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_from_missing_path_is_parse_error() {
        let err = load_from_path(Path::new("/nonexistent/harbor/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(msg) if msg.contains("failed to read")));
    }

    #[test]
    fn load_from_path_reads_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 9999\n").unwrap();

        let config = load_from_path(&path).unwrap();
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.terminal.cols, 80);
    }

    #[test]
    fn load_from_path_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();

        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(msg) if msg.contains("parse TOML")));
    }

    #[test]
    fn create_default_writes_parseable_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        create_default_config(&path).unwrap();
        let config = load_from_path(&path).unwrap();
        assert_eq!(config.server.port, HarborConfig::default().server.port);
    }

    #[test]
    fn template_defaults_match_schema_defaults() {
        // The template has every value commented out, so parsing it must
        // produce exactly the schema defaults.
        let parsed: HarborConfig = toml::from_str(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(parsed.terminal.cols, HarborConfig::default().terminal.cols);
        assert_eq!(parsed.server.port, HarborConfig::default().server.port);
        assert_eq!(
            parsed.calendar.redirect_port,
            HarborConfig::default().calendar.redirect_port
        );
    }
}
