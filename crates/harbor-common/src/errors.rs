use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum HarborError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("terminal error: {0}")]
    Terminal(String),

    #[error("calendar error: {0}")]
    Calendar(String),

    #[error("relay error: {0}")]
    Relay(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("rows must be positive".into());
        assert_eq!(
            err.to_string(),
            "config validation error: rows must be positive"
        );
    }

    #[test]
    fn harbor_error_from_config() {
        let config_err = ConfigError::ParseError("bad toml".into());
        let err: HarborError = config_err.into();
        assert!(matches!(err, HarborError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn harbor_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: HarborError = io_err.into();
        assert!(matches!(err, HarborError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn harbor_error_domain_variants() {
        let err = HarborError::Terminal("pty allocation failed".into());
        assert_eq!(err.to_string(), "terminal error: pty allocation failed");

        let err = HarborError::Calendar("token expired".into());
        assert_eq!(err.to_string(), "calendar error: token expired");

        let err = HarborError::Relay("client gone".into());
        assert_eq!(err.to_string(), "relay error: client gone");

        let err = HarborError::Other("something went wrong".into());
        assert_eq!(err.to_string(), "something went wrong");
    }
}
