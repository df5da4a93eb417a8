//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gatekeeper.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gatekeeper.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatekeeperConfig {
    /// Listener and hosting-runtime settings.
    pub server: ServerConfig,

    /// The protected application admitted requests are forwarded to.
    pub upstream: UpstreamConfig,

    /// Public (unauthenticated) route patterns.
    pub routes: RoutesConfig,

    /// Session verification strategy and its settings.
    pub session: SessionConfig,

    /// Security headers and Content-Security-Policy.
    pub security: SecurityConfig,

    /// Login redirect settings.
    pub redirect: RedirectConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Externally visible origin (e.g., "https://app.example.com").
    /// Used to rebuild absolute request URLs behind the listener.
    pub public_origin: Option<String>,

    /// Path prefixes that bypass the gatekeeper entirely (static assets,
    /// the session endpoint itself).
    pub excluded_prefixes: Vec<String>,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            public_origin: None,
            excluded_prefixes: vec![
                "/_next/static".to_string(),
                "/_next/image".to_string(),
                "/favicon.ico".to_string(),
                "/api/auth/session".to_string(),
            ],
            request_timeout_secs: 30,
        }
    }
}

/// Upstream application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the protected application (e.g., "http://127.0.0.1:3000").
    pub url: String,

    /// Upstream response timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3000".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Public route configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Glob patterns for routes that don't require authentication.
    pub public: Vec<String>,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        let public = [
            "/api/hello",
            "/api/health",
            "/api/auth/**",
            "/api/oauth/**",
            "/api/scim/v2.0/**",
            "/api/invitations/*",
            "/api/webhooks/stripe",
            "/api/webhooks/dsync",
            "/auth/**",
            "/invitations/*",
            "/terms-condition",
            "/unlock-account",
            "/login/saml",
            "/.well-known/*",
        ];
        Self {
            public: public.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// How sessions are verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionStrategy {
    /// Self-contained signed token, verified locally.
    #[default]
    #[serde(alias = "jwt")]
    Token,
    /// Opaque session reference, confirmed by the identity subsystem.
    #[serde(alias = "database")]
    Lookup,
}

impl SessionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStrategy::Token => "token",
            SessionStrategy::Lookup => "lookup",
        }
    }
}

/// Session verification configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SessionConfig {
    /// Active strategy, fixed for the process lifetime.
    pub strategy: SessionStrategy,

    /// Settings for the token strategy.
    pub token: TokenConfig,

    /// Settings for the lookup strategy.
    pub lookup: LookupConfig,
}

/// Token strategy configuration.
///
/// Tokens must be HMAC-signed JWS (HS256/HS384/HS512) with the shared
/// secret. The default cookie names follow NextAuth, but stock NextAuth
/// writes encrypted JWE session cookies that this strategy cannot read: the
/// issuing application has to sign its session tokens instead (or use the
/// lookup strategy).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Shared signing secret. Overridden by `GATEKEEPER_TOKEN_SECRET`.
    pub secret: String,

    /// Signing algorithm: HS256, HS384 or HS512.
    pub algorithm: String,

    /// Cookie names searched for a session token, in order. Only names;
    /// the cookie still has to carry a signed JWS.
    pub cookie_names: Vec<String>,

    /// Also accept `Authorization: Bearer <token>`.
    pub allow_bearer: bool,

    /// Clock skew tolerance for `exp`/`nbf` in seconds.
    pub leeway_secs: u64,

    /// Expected `aud` claim, if any.
    pub audience: Option<String>,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            algorithm: "HS256".to_string(),
            cookie_names: vec![
                "__Secure-next-auth.session-token".to_string(),
                "next-auth.session-token".to_string(),
            ],
            allow_bearer: true,
            leeway_secs: 0,
            audience: None,
        }
    }
}

/// Lookup strategy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Session introspection path on the application.
    pub session_path: String,

    /// Origin of the application serving the session endpoint. Defaults to
    /// `upstream.url`. Never taken from the request.
    pub origin: Option<String>,

    /// Introspection call timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            session_path: "/api/auth/session".to_string(),
            origin: None,
            timeout_ms: 5_000,
        }
    }
}

/// A single fixed response header.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HeaderEntry {
    pub name: String,
    pub value: String,
}

/// A single Content-Security-Policy directive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CspDirective {
    pub name: String,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl CspDirective {
    pub fn new(name: &str, sources: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Security header configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Attach security headers and CSP to authenticated responses.
    pub headers_enabled: bool,

    /// Also attach them to public routes.
    pub headers_on_public_routes: bool,

    /// Fixed response headers, in emission order.
    pub headers: Vec<HeaderEntry>,

    /// CSP directives, in emission order.
    pub csp: Vec<CspDirective>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        let headers = [
            ("Referrer-Policy", "strict-origin-when-cross-origin"),
            ("Permissions-Policy", "geolocation=(), microphone=()"),
            ("Cross-Origin-Embedder-Policy", "require-corp"),
            ("Cross-Origin-Opener-Policy", "same-origin"),
            ("Cross-Origin-Resource-Policy", "same-site"),
        ]
        .iter()
        .map(|(name, value)| HeaderEntry {
            name: name.to_string(),
            value: value.to_string(),
        })
        .collect();

        let csp = vec![
            CspDirective::new("default-src", &["'self'"]),
            CspDirective::new(
                "img-src",
                &["'self'", "boxyhq.com", "*.boxyhq.com", "*.dicebear.com", "data:"],
            ),
            CspDirective::new(
                "script-src",
                &["'self'", "'unsafe-inline'", "'unsafe-eval'", "*.gstatic.com", "*.google.com"],
            ),
            CspDirective::new("style-src", &["'self'", "'unsafe-inline'"]),
            CspDirective::new(
                "connect-src",
                &[
                    "'self'",
                    "*.google.com",
                    "*.gstatic.com",
                    "boxyhq.com",
                    "*.ingest.sentry.io",
                    "*.mixpanel.com",
                ],
            ),
            CspDirective::new("frame-src", &["'self'", "*.google.com", "*.gstatic.com"]),
            CspDirective::new("font-src", &["'self'"]),
            CspDirective::new("object-src", &["'none'"]),
            CspDirective::new("base-uri", &["'self'"]),
            CspDirective::new("form-action", &["'self'"]),
            CspDirective::new("frame-ancestors", &["'none'"]),
        ];

        Self {
            headers_enabled: true,
            headers_on_public_routes: false,
            headers,
            csp,
        }
    }
}

/// Login redirect configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// Login page path on the request origin.
    pub login_path: String,

    /// Query parameter carrying the original URL.
    pub callback_param: String,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            login_path: "/auth/login".to_string(),
            callback_param: "callbackUrl".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: GatekeeperConfig = toml::from_str("").unwrap();
        assert_eq!(config.session.strategy, SessionStrategy::Token);
        assert!(config.security.headers_enabled);
        assert_eq!(config.security.headers.len(), 5);
        assert_eq!(config.security.csp.len(), 11);
        assert!(config.routes.public.contains(&"/invitations/*".to_string()));
    }

    #[test]
    fn test_parse_lookup_strategy() {
        let config: GatekeeperConfig = toml::from_str(
            r#"
            [session]
            strategy = "lookup"

            [session.lookup]
            timeout_ms = 1500

            [[security.csp]]
            name = "default-src"
            sources = ["'self'"]
            "#,
        )
        .unwrap();

        assert_eq!(config.session.strategy, SessionStrategy::Lookup);
        assert_eq!(config.session.lookup.timeout_ms, 1500);
        assert_eq!(config.session.lookup.session_path, "/api/auth/session");
        assert_eq!(config.security.csp.len(), 1);
    }

    #[test]
    fn test_strategy_aliases() {
        let config: GatekeeperConfig = toml::from_str("[session]\nstrategy = \"database\"").unwrap();
        assert_eq!(config.session.strategy, SessionStrategy::Lookup);

        let config: GatekeeperConfig = toml::from_str("[session]\nstrategy = \"jwt\"").unwrap();
        assert_eq!(config.session.strategy, SessionStrategy::Token);
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        let parsed: Result<GatekeeperConfig, _> = toml::from_str(
            r#"
            [session]
            strategy = "cookie"
            "#,
        );
        assert!(parsed.is_err());
    }
}
