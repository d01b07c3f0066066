//! Terminal geometry and identity settings.

use serde::{Deserialize, Serialize};

/// Initial terminal settings. The renderer resizes the viewport after
/// connecting, so these only matter until the first `terminal_resize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Initial terminal columns.
    pub cols: u16,
    /// Initial terminal rows.
    pub rows: u16,
    /// Terminal type advertised to the shell via `TERM`.
    pub term: String,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            cols: 80,
            rows: 24,
            term: "xterm-256color".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_config_defaults() {
        let config = TerminalConfig::default();
        assert_eq!(config.cols, 80);
        assert_eq!(config.rows, 24);
        assert_eq!(config.term, "xterm-256color");
    }

    #[test]
    fn terminal_config_partial_toml() {
        let config: TerminalConfig = toml::from_str("cols = 132").unwrap();
        assert_eq!(config.cols, 132);
        assert_eq!(config.rows, 24);
    }
}
