//! Config schema: one struct per TOML section, serde defaults throughout.

mod calendar;
mod logging;
mod server;
mod shell;
mod terminal;

pub use calendar::CalendarConfig;
pub use logging::LoggingConfig;
pub use server::ServerConfig;
pub use shell::ShellConfig;
pub use terminal::TerminalConfig;

use serde::{Deserialize, Serialize};

/// Top-level harbor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HarborConfig {
    pub shell: ShellConfig,
    pub terminal: TerminalConfig,
    pub server: ServerConfig,
    pub calendar: CalendarConfig,
    pub logging: LoggingConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: HarborConfig = toml::from_str("").unwrap();
        assert_eq!(config.terminal.cols, 80);
        assert_eq!(config.terminal.rows, 24);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.shell.program.is_empty());
    }

    #[test]
    fn partial_toml_keeps_other_sections_default() {
        let config: HarborConfig = toml::from_str(
            r#"
[server]
port = 9000

[shell]
program = "/bin/zsh"
"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.shell.program, "/bin/zsh");
        // Untouched sections keep defaults
        assert_eq!(config.terminal.term, "xterm-256color");
        assert!(!config.calendar.enabled);
    }

    #[test]
    fn config_serializes_all_sections() {
        let json = serde_json::to_string(&HarborConfig::default()).unwrap();
        assert!(json.contains("\"shell\""));
        assert!(json.contains("\"terminal\""));
        assert!(json.contains("\"server\""));
        assert!(json.contains("\"calendar\""));
        assert!(json.contains("\"logging\""));
    }
}
