//! Config validation: range checks that catch typos before they reach the
//! PTY or the network stack.

use harbor_common::ConfigError;

use crate::schema::HarborConfig;

/// Renderer-reported sizes above this are rejected as nonsense.
pub const MAX_DIMENSION: u16 = 500;

/// Validate a parsed config, returning the first problem found.
pub fn validate(config: &HarborConfig) -> Result<(), ConfigError> {
    validate_terminal(config)?;
    validate_server(config)?;
    validate_calendar(config)?;
    Ok(())
}

fn validate_terminal(config: &HarborConfig) -> Result<(), ConfigError> {
    let t = &config.terminal;
    if t.cols == 0 || t.rows == 0 {
        return Err(ConfigError::ValidationError(format!(
            "terminal size must be positive, got {}x{}",
            t.cols, t.rows
        )));
    }
    if t.cols > MAX_DIMENSION || t.rows > MAX_DIMENSION {
        return Err(ConfigError::ValidationError(format!(
            "terminal size {}x{} exceeds maximum {MAX_DIMENSION}",
            t.cols, t.rows
        )));
    }
    if t.term.is_empty() {
        return Err(ConfigError::ValidationError(
            "terminal.term must not be empty".into(),
        ));
    }
    Ok(())
}

fn validate_server(config: &HarborConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port must not be 0".into(),
        ));
    }
    if config.server.host.is_empty() {
        return Err(ConfigError::ValidationError(
            "server.host must not be empty".into(),
        ));
    }
    Ok(())
}

fn validate_calendar(config: &HarborConfig) -> Result<(), ConfigError> {
    let c = &config.calendar;
    if c.redirect_port == 0 {
        return Err(ConfigError::ValidationError(
            "calendar.redirect_port must not be 0".into(),
        ));
    }
    if c.redirect_port == config.server.port {
        return Err(ConfigError::ValidationError(format!(
            "calendar.redirect_port {} collides with server.port",
            c.redirect_port
        )));
    }
    if c.lookahead_days == 0 {
        return Err(ConfigError::ValidationError(
            "calendar.lookahead_days must be at least 1".into(),
        ));
    }
    // Google caps maxResults at 2500 per request.
    if c.max_events == 0 || c.max_events > 2500 {
        return Err(ConfigError::ValidationError(format!(
            "calendar.max_events must be in 1..=2500, got {}",
            c.max_events
        )));
    }
    Ok(())
}
