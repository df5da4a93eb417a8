//! Lookup strategy: server-side sessions confirmed by the identity subsystem.
//!
//! # Responsibilities
//! - Call `GET <app origin>/api/auth/session` with the caller's cookies
//! - Classify the answer into a SessionOutcome
//!
//! # Design Decisions
//! - The endpoint is fixed at startup from configuration; Host headers and
//!   absolute-form targets are client-controlled and never pick it
//! - Single attempt per request, no backoff
//! - Bounded by a client-wide timeout
//! - The call future lives inside the request future, so a dropped request
//!   drops the call with it

use std::time::{Duration, Instant};

use axum::http::header::{CONTENT_TYPE, COOKIE};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::LookupConfig;
use crate::http::request::InboundRequest;
use crate::observability::metrics;
use crate::session::{Identity, Rejection, SessionOutcome, SessionSetupError, SessionVerifier};

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("session endpoint unreachable: {0}")]
    Transport(reqwest::Error),

    #[error("session endpoint timed out")]
    Timeout,

    #[error("malformed session payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LookupError::Timeout
        } else if e.is_decode() {
            LookupError::Decode(e.to_string())
        } else {
            LookupError::Transport(e)
        }
    }
}

/// What the introspection endpoint said.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Introspection {
    Status(u16),
    Session(Option<Identity>),
}

#[derive(Debug)]
pub struct LookupVerifier {
    client: reqwest::Client,
    endpoint: Url,
}

impl LookupVerifier {
    /// `app_origin` is used unless `config.origin` is set.
    pub fn from_config(config: &LookupConfig, app_origin: &str) -> Result<Self, SessionSetupError> {
        let origin = config.origin.as_deref().unwrap_or(app_origin);
        if !config.session_path.starts_with('/') {
            return Err(SessionSetupError::InvalidEndpoint(config.session_path.clone()));
        }
        let endpoint = Url::parse(origin)
            .and_then(|base| base.join(&config.session_path))
            .map_err(|e| SessionSetupError::InvalidEndpoint(format!("{}: {}", origin, e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            endpoint,
        })
    }

    /// The introspection URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn introspect(&self, request: &InboundRequest) -> Result<Introspection, LookupError> {
        let cookie = request.cookie_header().unwrap_or_default();

        let response = self
            .client
            .get(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(COOKIE, cookie)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Ok(Introspection::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let session: Value =
            serde_json::from_slice(&body).map_err(|e| LookupError::Decode(e.to_string()))?;
        Ok(Introspection::Session(identity_from_session(&session)))
    }
}

/// The user identity in a session payload, if it names one.
fn identity_from_session(session: &Value) -> Option<Identity> {
    let user = session.get("user")?.as_object()?;
    let field = |key: &str| user.get(key).and_then(Value::as_str).map(str::to_string);
    Some(Identity {
        subject: field("id"),
        email: field("email"),
    })
}

impl SessionVerifier for LookupVerifier {
    fn strategy(&self) -> &'static str {
        "lookup"
    }

    async fn verify(&self, request: &InboundRequest) -> SessionOutcome {
        let start = Instant::now();
        let result = self.introspect(request).await;
        metrics::record_lookup_duration(start);

        match result {
            Ok(Introspection::Session(Some(identity))) => SessionOutcome::Authenticated(identity),
            Ok(Introspection::Session(None)) => {
                tracing::debug!(path = %request.path(), "Session payload has no user");
                SessionOutcome::Unauthenticated(Rejection::NoIdentity)
            }
            Ok(Introspection::Status(status)) => {
                tracing::warn!(
                    path = %request.path(),
                    status = status,
                    "Session introspection returned non-success status"
                );
                SessionOutcome::Unauthenticated(Rejection::IntrospectionStatus(status))
            }
            Err(e) => {
                tracing::error!(path = %request.path(), error = %e, "Session introspection failed");
                SessionOutcome::VerificationFailed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn verifier() -> LookupVerifier {
        LookupVerifier::from_config(&LookupConfig::default(), "http://127.0.0.1:3000").unwrap()
    }

    #[test]
    fn test_identity_extraction() {
        let session = json!({"user": {"id": "u1", "email": "a@b.c", "name": "A"}, "expires": "2030-01-01"});
        assert_eq!(
            identity_from_session(&session),
            Some(Identity {
                subject: Some("u1".into()),
                email: Some("a@b.c".into()),
            })
        );

        assert_eq!(identity_from_session(&json!({"user": {}})), Some(Identity::default()));
        assert_eq!(identity_from_session(&json!({})), None);
        assert_eq!(identity_from_session(&json!({"user": null})), None);
        assert_eq!(identity_from_session(&json!({"user": "u1"})), None);
        assert_eq!(identity_from_session(&json!(null)), None);
    }

    #[test]
    fn test_endpoint_on_app_origin() {
        assert_eq!(
            verifier().endpoint().as_str(),
            "http://127.0.0.1:3000/api/auth/session"
        );
    }

    #[test]
    fn test_endpoint_origin_override() {
        let config = LookupConfig {
            origin: Some("https://app.example.com".into()),
            ..LookupConfig::default()
        };
        let verifier = LookupVerifier::from_config(&config, "http://127.0.0.1:3000").unwrap();
        assert_eq!(
            verifier.endpoint().as_str(),
            "https://app.example.com/api/auth/session"
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = LookupConfig {
            session_path: "api/auth/session".into(),
            ..LookupConfig::default()
        };
        assert!(matches!(
            LookupVerifier::from_config(&config, "http://127.0.0.1:3000"),
            Err(SessionSetupError::InvalidEndpoint(_))
        ));
    }
}
