//! Harbor configuration system.
//!
//! TOML-based configuration with serde defaults on every section, so a
//! partial (or absent) config file works out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! let config = harbor_config::load_config().expect("failed to load config");
//! println!("listening on {}:{}", config.server.host, config.server.port);
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::HarborConfig;
pub use toml_loader::{default_config_path, load_from_path};

use harbor_common::ConfigError;

/// Load config from the platform default path.
///
/// Loads `config.toml` from the OS config directory, creating a commented
/// default file if none exists, and validates the result.
pub fn load_config() -> Result<HarborConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = HarborConfig::default();
        assert!(validation::validate(&config).is_ok());
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = HarborConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: HarborConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(parsed.terminal.cols, config.terminal.cols);
        assert_eq!(parsed.logging.directive, config.logging.directive);
    }
}
