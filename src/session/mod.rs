//! Session verification subsystem.
//!
//! # Data Flow
//! ```text
//! Protected request
//!     → Verifier (strategy picked once at startup)
//!         token:  cookies.rs (find token) → token.rs (signature + expiry)
//!         lookup: lookup.rs (GET <app origin>/api/auth/session, cookie forwarded)
//!     → SessionOutcome
//! ```
//!
//! # Design Decisions
//! - Every verifier returns an explicit outcome; nothing is thrown
//! - Decoding problems are Unauthenticated, infrastructure problems are
//!   VerificationFailed; both end in a login redirect
//! - One attempt per request, no retries

pub mod cookies;
pub mod lookup;
pub mod token;

use std::future::Future;

use thiserror::Error;

use crate::config::{SessionConfig, SessionStrategy};
use crate::http::request::InboundRequest;

pub use lookup::LookupVerifier;
pub use token::TokenVerifier;

/// Who the session belongs to, as far as the verifier could tell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub subject: Option<String>,
    pub email: Option<String>,
}

/// Why a request was not authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// No credential present.
    MissingCredential,
    /// Credential present but undecodable or badly signed.
    InvalidCredential,
    /// Credential past its expiry.
    Expired,
    /// Introspection endpoint answered with a non-success status.
    IntrospectionStatus(u16),
    /// Introspection succeeded but named no user.
    NoIdentity,
}

/// Result of verifying one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Authenticated(Identity),
    Unauthenticated(Rejection),
    /// Verification could not be completed (network, timeout, bad payload).
    VerificationFailed(String),
}

impl SessionOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionOutcome::Authenticated(_))
    }

    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            SessionOutcome::Authenticated(_) => "authenticated",
            SessionOutcome::Unauthenticated(_) => "unauthenticated",
            SessionOutcome::VerificationFailed(_) => "verification_failed",
        }
    }
}

/// A way to decide whether a request carries a valid session.
pub trait SessionVerifier: Send + Sync {
    /// Strategy name for logs and metrics.
    fn strategy(&self) -> &'static str;

    fn verify(&self, request: &InboundRequest) -> impl Future<Output = SessionOutcome> + Send;
}

#[derive(Debug, Error)]
pub enum SessionSetupError {
    #[error("unsupported token algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    #[error("invalid session endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("failed to build introspection client: {0}")]
    Client(#[from] reqwest::Error),
}

/// The configured strategy.
#[derive(Debug)]
pub enum Verifier {
    Token(TokenVerifier),
    Lookup(LookupVerifier),
}

impl Verifier {
    /// `app_origin` is where the lookup strategy finds the session endpoint
    /// unless `lookup.origin` overrides it.
    pub fn from_config(config: &SessionConfig, app_origin: &str) -> Result<Self, SessionSetupError> {
        match config.strategy {
            SessionStrategy::Token => Ok(Verifier::Token(TokenVerifier::from_config(&config.token)?)),
            SessionStrategy::Lookup => Ok(Verifier::Lookup(LookupVerifier::from_config(
                &config.lookup,
                app_origin,
            )?)),
        }
    }
}

impl SessionVerifier for Verifier {
    fn strategy(&self) -> &'static str {
        match self {
            Verifier::Token(v) => v.strategy(),
            Verifier::Lookup(v) => v.strategy(),
        }
    }

    async fn verify(&self, request: &InboundRequest) -> SessionOutcome {
        match self {
            Verifier::Token(v) => v.verify(request).await,
            Verifier::Lookup(v) => v.verify(request).await,
        }
    }
}
