//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatekeeperConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable that overrides `session.token.secret`.
pub const TOKEN_SECRET_ENV: &str = "GATEKEEPER_TOKEN_SECRET";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatekeeperConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Read and parse a TOML file without semantic validation.
pub fn read_config(path: &Path) -> Result<GatekeeperConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content, std::env::var(TOKEN_SECRET_ENV).ok())
}

/// Parse TOML and apply the secret override.
pub fn parse_config(
    content: &str,
    secret_override: Option<String>,
) -> Result<GatekeeperConfig, ConfigError> {
    let mut config: GatekeeperConfig = toml::from_str(content)?;

    if let Some(secret) = secret_override.filter(|s| !s.is_empty()) {
        config.session.token.secret = secret;
    }

    Ok(config)
}
