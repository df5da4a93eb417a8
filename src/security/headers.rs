//! Security response headers.
//!
//! # Responsibilities
//! - Hold the fixed security header set (Referrer-Policy, COEP, COOP, ...)
//! - Produce the Content-Security-Policy value from the directive table
//! - Decide, from the feature flag, whether anything is attached at all
//!
//! # Design Decisions
//! - Names and values are validated once at construction
//! - Output is a pure function of static configuration
//! - Disabled policy still lets the request through, just without headers

use axum::http::header::CONTENT_SECURITY_POLICY;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::security::csp::CspPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("invalid header name '{0}'")]
    InvalidName(String),

    #[error("invalid value for header '{0}'")]
    InvalidValue(String),

    #[error("generated Content-Security-Policy is not a valid header value")]
    InvalidCsp,
}

/// Security headers and CSP, compiled from configuration.
#[derive(Debug, Clone)]
pub struct HeaderPolicy {
    enabled: bool,
    on_public_routes: bool,
    headers: Vec<(HeaderName, HeaderValue)>,
    csp: CspPolicy,
    csp_value: HeaderValue,
}

impl HeaderPolicy {
    pub fn from_config(config: &SecurityConfig) -> Result<Self, PolicyError> {
        let headers = config
            .headers
            .iter()
            .map(|entry| {
                let name = HeaderName::from_bytes(entry.name.as_bytes())
                    .map_err(|_| PolicyError::InvalidName(entry.name.clone()))?;
                let value = HeaderValue::from_str(&entry.value)
                    .map_err(|_| PolicyError::InvalidValue(entry.name.clone()))?;
                Ok((name, value))
            })
            .collect::<Result<Vec<_>, PolicyError>>()?;

        let csp = CspPolicy::from_directives(&config.csp);
        let csp_value =
            HeaderValue::from_str(&csp.build_csp()).map_err(|_| PolicyError::InvalidCsp)?;

        Ok(Self {
            enabled: config.headers_enabled,
            on_public_routes: config.headers_on_public_routes,
            headers,
            csp,
            csp_value,
        })
    }

    /// Whether headers are attached at all.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Whether public routes are enriched too.
    pub fn applies_to_public_routes(&self) -> bool {
        self.enabled && self.on_public_routes
    }

    /// The fixed header set, in configured order. Excludes the CSP header.
    pub fn build_headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        self.headers.clone()
    }

    /// The serialized Content-Security-Policy.
    pub fn build_csp(&self) -> String {
        self.csp.build_csp()
    }

    /// Headers to attach to an admitted response; empty when disabled.
    pub fn response_headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        if !self.enabled {
            return map;
        }
        for (name, value) in &self.headers {
            map.insert(name.clone(), value.clone());
        }
        map.insert(CONTENT_SECURITY_POLICY, self.csp_value.clone());
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeaderEntry;

    #[test]
    fn test_default_headers() {
        let policy = HeaderPolicy::from_config(&SecurityConfig::default()).unwrap();
        let headers = policy.response_headers();

        assert_eq!(headers.len(), 6);
        assert_eq!(headers["referrer-policy"], "strict-origin-when-cross-origin");
        assert_eq!(headers["permissions-policy"], "geolocation=(), microphone=()");
        assert_eq!(headers["cross-origin-embedder-policy"], "require-corp");
        assert_eq!(headers["cross-origin-opener-policy"], "same-origin");
        assert_eq!(headers["cross-origin-resource-policy"], "same-site");
        assert_eq!(
            headers[CONTENT_SECURITY_POLICY].to_str().unwrap(),
            policy.build_csp()
        );
    }

    #[test]
    fn test_build_headers_order() {
        let policy = HeaderPolicy::from_config(&SecurityConfig::default()).unwrap();
        let names: Vec<_> = policy
            .build_headers()
            .into_iter()
            .map(|(name, _)| name.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "referrer-policy",
                "permissions-policy",
                "cross-origin-embedder-policy",
                "cross-origin-opener-policy",
                "cross-origin-resource-policy",
            ]
        );
    }

    #[test]
    fn test_disabled_policy_emits_nothing() {
        let config = SecurityConfig {
            headers_enabled: false,
            ..SecurityConfig::default()
        };
        let policy = HeaderPolicy::from_config(&config).unwrap();
        assert!(!policy.enabled());
        assert!(policy.response_headers().is_empty());
        assert!(!policy.applies_to_public_routes());
    }

    #[test]
    fn test_invalid_entries_rejected() {
        let mut config = SecurityConfig::default();
        config.headers.push(HeaderEntry {
            name: "X Bad".into(),
            value: "1".into(),
        });
        assert_eq!(
            HeaderPolicy::from_config(&config).unwrap_err(),
            PolicyError::InvalidName("X Bad".into())
        );

        let mut config = SecurityConfig::default();
        config.headers.push(HeaderEntry {
            name: "X-Good".into(),
            value: "line\nbreak".into(),
        });
        assert_eq!(
            HeaderPolicy::from_config(&config).unwrap_err(),
            PolicyError::InvalidValue("X-Good".into())
        );
    }
}
