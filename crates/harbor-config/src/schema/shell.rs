//! Shell process configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Shell process settings.
///
/// Controls which shell to launch, its arguments, working directory and
/// extra environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Shell program path. Empty string means platform auto-detect.
    pub program: String,
    /// Extra arguments passed to the shell.
    pub args: Vec<String>,
    /// Initial working directory. `None` means the user's home directory.
    pub working_directory: Option<String>,
    /// Extra environment variables injected into the shell.
    pub env: HashMap<String, String>,
    /// Launch as a login shell (pass `-l` on Unix).
    pub login_shell: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: String::new(),
            args: Vec::new(),
            working_directory: None,
            env: HashMap::new(),
            login_shell: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_config_defaults() {
        let config = ShellConfig::default();
        assert!(config.program.is_empty());
        assert!(config.args.is_empty());
        assert!(config.working_directory.is_none());
        assert!(config.env.is_empty());
        assert!(config.login_shell);
    }

    #[test]
    fn shell_config_partial_toml() {
        let toml_str = r#"
program = "/bin/zsh"
args = ["--no-rcs"]
login_shell = false
"#;
        let config: ShellConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.program, "/bin/zsh");
        assert_eq!(config.args, vec!["--no-rcs"]);
        assert!(!config.login_shell);
        // Defaults preserved
        assert!(config.working_directory.is_none());
        assert!(config.env.is_empty());
    }

    #[test]
    fn shell_config_with_env_vars() {
        let toml_str = r#"
[env]
EDITOR = "nvim"
"#;
        let config: ShellConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.env.get("EDITOR").unwrap(), "nvim");
        assert!(config.login_shell);
    }
}
