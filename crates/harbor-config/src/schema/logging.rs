//! Logging settings.

use serde::{Deserialize, Serialize};

/// Default tracing filter applied when `RUST_LOG` is unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directive: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directive: "harbor=info".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_defaults() {
        assert_eq!(LoggingConfig::default().directive, "harbor=info");
    }
}
