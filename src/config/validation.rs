//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile public route patterns once to surface bad globs at startup
//! - Check header names/values and CSP directives are representable
//! - Validate URLs, paths and timeouts
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatekeeperConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};
use thiserror::Error;
use url::Url;

use crate::config::schema::{GatekeeperConfig, SessionStrategy};
use crate::routing::matcher::GlobPattern;
use crate::session::token::parse_algorithm;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("{field}: invalid URL '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field}: path '{value}' must start with '/'")]
    InvalidPath { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("invalid public route pattern '{pattern}': {reason}")]
    InvalidRoutePattern { pattern: String, reason: String },

    #[error("invalid security header '{name}': {reason}")]
    InvalidHeader { name: String, reason: &'static str },

    #[error("invalid CSP directive '{0}'")]
    InvalidCspDirective(String),

    #[error("session.token.secret is required for the token strategy")]
    MissingTokenSecret,

    #[error("unsupported token algorithm '{0}' (expected HS256, HS384 or HS512)")]
    UnsupportedAlgorithm(String),

    #[error("redirect.callback_param must not be empty")]
    EmptyCallbackParam,
}

/// Validate a parsed configuration, collecting every error found.
pub fn validate_config(config: &GatekeeperConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.server.bind_address.clone(),
        ));
    }

    if let Some(origin) = &config.server.public_origin {
        check_url(&mut errors, "server.public_origin", origin);
    }
    check_url(&mut errors, "upstream.url", &config.upstream.url);

    for prefix in &config.server.excluded_prefixes {
        check_path(&mut errors, "server.excluded_prefixes", prefix);
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "server.request_timeout_secs",
        });
    }
    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "upstream.timeout_secs",
        });
    }

    for pattern in &config.routes.public {
        if let Err(e) = GlobPattern::compile(pattern) {
            errors.push(ValidationError::InvalidRoutePattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            });
        }
    }

    // Only the active strategy's settings have to be usable.
    match config.session.strategy {
        SessionStrategy::Token => {
            let token = &config.session.token;
            if token.secret.is_empty() {
                errors.push(ValidationError::MissingTokenSecret);
            }
            if parse_algorithm(&token.algorithm).is_none() {
                errors.push(ValidationError::UnsupportedAlgorithm(token.algorithm.clone()));
            }
        }
        SessionStrategy::Lookup => {
            let lookup = &config.session.lookup;
            check_path(&mut errors, "session.lookup.session_path", &lookup.session_path);
            if let Some(origin) = &lookup.origin {
                check_url(&mut errors, "session.lookup.origin", origin);
            }
            if lookup.timeout_ms == 0 {
                errors.push(ValidationError::ZeroTimeout {
                    field: "session.lookup.timeout_ms",
                });
            }
        }
    }

    for entry in &config.security.headers {
        if HeaderName::from_bytes(entry.name.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeader {
                name: entry.name.clone(),
                reason: "not a valid header name",
            });
        } else if HeaderValue::from_str(&entry.value).is_err() {
            errors.push(ValidationError::InvalidHeader {
                name: entry.name.clone(),
                reason: "not a valid header value",
            });
        }
    }

    for directive in &config.security.csp {
        let malformed = directive.name.is_empty()
            || directive.name.contains(|c: char| c.is_whitespace() || c == ';')
            || directive
                .sources
                .iter()
                .any(|s| s.is_empty() || s.contains(|c: char| c.is_whitespace() || c == ';'));
        if malformed {
            errors.push(ValidationError::InvalidCspDirective(directive.name.clone()));
        }
    }

    check_path(&mut errors, "redirect.login_path", &config.redirect.login_path);
    if config.redirect.callback_param.is_empty() {
        errors.push(ValidationError::EmptyCallbackParam);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match Url::parse(value) {
        Ok(url) if url.has_host() => {}
        _ => errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        }),
    }
}

fn check_path(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if !value.starts_with('/') {
        errors.push(ValidationError::InvalidPath {
            field,
            value: value.to_string(),
        });
    }
}
