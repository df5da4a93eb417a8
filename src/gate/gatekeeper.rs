//! Per-request orchestration: match → verify → decide → enrich.

use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use thiserror::Error;

use crate::config::{GatekeeperConfig, RedirectConfig};
use crate::gate::verdict::{login_location, Verdict};
use crate::http::request::InboundRequest;
use crate::observability::metrics;
use crate::routing::{PatternError, PublicRoutes};
use crate::security::{HeaderPolicy, PolicyError};
use crate::session::{SessionOutcome, SessionSetupError, SessionVerifier, Verifier};

#[derive(Debug, Error)]
pub enum GateError {
    #[error("invalid public route pattern: {0}")]
    Pattern(#[from] PatternError),

    #[error("invalid security header policy: {0}")]
    Policy(#[from] PolicyError),

    #[error("session verifier setup failed: {0}")]
    Session(#[from] SessionSetupError),
}

/// Decides, per request, whether it passes, passes with headers, or is
/// redirected to login.
///
/// Built once from immutable configuration and shared behind an `Arc`.
#[derive(Debug)]
pub struct Gatekeeper<V = Verifier> {
    routes: PublicRoutes,
    verifier: V,
    headers: HeaderPolicy,
    redirect: RedirectConfig,
}

impl Gatekeeper<Verifier> {
    pub fn from_config(config: &GatekeeperConfig) -> Result<Self, GateError> {
        let routes = PublicRoutes::from_patterns(&config.routes.public)?;
        let verifier = Verifier::from_config(&config.session, &config.upstream.url)?;
        let headers = HeaderPolicy::from_config(&config.security)?;

        tracing::info!(
            strategy = verifier.strategy(),
            public_routes = routes.len(),
            security_headers = headers.enabled(),
            "Gatekeeper configured"
        );

        Ok(Self::new(routes, verifier, headers, config.redirect.clone()))
    }
}

impl<V: SessionVerifier> Gatekeeper<V> {
    pub fn new(routes: PublicRoutes, verifier: V, headers: HeaderPolicy, redirect: RedirectConfig) -> Self {
        Self {
            routes,
            verifier,
            headers,
            redirect,
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.routes.is_public(path)
    }

    pub fn header_policy(&self) -> &HeaderPolicy {
        &self.headers
    }

    pub fn strategy(&self) -> &'static str {
        self.verifier.strategy()
    }

    /// Produce exactly one verdict for `request`.
    pub async fn handle(&self, request: &InboundRequest) -> Verdict {
        let verdict = if self.routes.is_public(request.path()) {
            tracing::debug!(path = %request.path(), "Public route, skipping authentication");
            if self.headers.applies_to_public_routes() {
                Verdict::ContinueWithHeaders {
                    headers: self.headers.response_headers(),
                    identity: None,
                }
            } else {
                Verdict::Continue
            }
        } else {
            let outcome = self.verify(request).await;
            metrics::record_session_outcome(self.verifier.strategy(), outcome.label());
            self.decide(request, outcome)
        };

        metrics::record_verdict(verdict.label());
        verdict
    }

    /// Run the verifier; a panic inside it becomes a failed verification.
    async fn verify(&self, request: &InboundRequest) -> SessionOutcome {
        match AssertUnwindSafe(self.verifier.verify(request))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::error!(
                    path = %request.path(),
                    strategy = self.verifier.strategy(),
                    "Session verifier panicked, forcing re-authentication"
                );
                SessionOutcome::VerificationFailed("verifier panicked".to_string())
            }
        }
    }

    /// The single point where outcomes become verdicts. Anything but
    /// `Authenticated` redirects; redirects never carry security headers.
    pub fn decide(&self, request: &InboundRequest, outcome: SessionOutcome) -> Verdict {
        match outcome {
            SessionOutcome::Authenticated(identity) => Verdict::ContinueWithHeaders {
                headers: self.headers.response_headers(),
                identity: Some(identity),
            },
            SessionOutcome::Unauthenticated(reason) => {
                tracing::debug!(path = %request.path(), reason = ?reason, "Unauthenticated, redirecting to login");
                self.redirect_for(request)
            }
            SessionOutcome::VerificationFailed(error) => {
                tracing::debug!(path = %request.path(), error = %error, "Verification failed, redirecting to login");
                self.redirect_for(request)
            }
        }
    }

    fn redirect_for(&self, request: &InboundRequest) -> Verdict {
        Verdict::Redirect {
            location: login_location(
                request.url(),
                &self.redirect.login_path,
                &self.redirect.callback_param,
            ),
        }
    }
}
