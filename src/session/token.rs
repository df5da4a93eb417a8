//! Token strategy: self-contained signed session tokens.
//!
//! The token is looked up in the configured session cookies first, then in
//! `Authorization: Bearer`. Signature and `exp` are checked locally; no
//! network call is made. Every decoding failure is an Unauthenticated
//! outcome, including encrypted (JWE) session cookies.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::config::TokenConfig;
use crate::http::request::InboundRequest;
use crate::session::cookies::{bearer_token, session_cookie};
use crate::session::{Identity, Rejection, SessionOutcome, SessionSetupError, SessionVerifier};

/// Map a configured algorithm name to a supported HMAC algorithm.
pub fn parse_algorithm(name: &str) -> Option<Algorithm> {
    match name.to_ascii_uppercase().as_str() {
        "HS256" => Some(Algorithm::HS256),
        "HS384" => Some(Algorithm::HS384),
        "HS512" => Some(Algorithm::HS512),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct SessionClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
    cookie_names: Vec<String>,
    allow_bearer: bool,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .field("cookie_names", &self.cookie_names)
            .field("allow_bearer", &self.allow_bearer)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    pub fn from_config(config: &TokenConfig) -> Result<Self, SessionSetupError> {
        let algorithm = parse_algorithm(&config.algorithm)
            .ok_or_else(|| SessionSetupError::UnsupportedAlgorithm(config.algorithm.clone()))?;

        let mut validation = Validation::new(algorithm);
        validation.leeway = config.leeway_secs;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);
        match &config.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            cookie_names: config.cookie_names.clone(),
            allow_bearer: config.allow_bearer,
        })
    }

    /// The raw token carried by the request, if any.
    fn find_token(&self, request: &InboundRequest) -> Option<String> {
        if let Some(cookies) = request.cookie_header() {
            let from_cookie = self
                .cookie_names
                .iter()
                .find_map(|name| session_cookie(&cookies, name));
            if from_cookie.is_some() {
                return from_cookie;
            }
        }
        if self.allow_bearer {
            return bearer_token(request.headers()).map(str::to_string);
        }
        None
    }

    /// Check a token string.
    pub fn check(&self, token: &str) -> SessionOutcome {
        match decode::<SessionClaims>(token, &self.key, &self.validation) {
            Ok(data) => SessionOutcome::Authenticated(Identity {
                subject: data.claims.sub,
                email: data.claims.email,
            }),
            Err(e) => {
                let rejection = match e.kind() {
                    ErrorKind::ExpiredSignature => Rejection::Expired,
                    _ => Rejection::InvalidCredential,
                };
                tracing::debug!(error = %e, "Session token rejected");
                SessionOutcome::Unauthenticated(rejection)
            }
        }
    }
}

impl SessionVerifier for TokenVerifier {
    fn strategy(&self) -> &'static str {
        "token"
    }

    async fn verify(&self, request: &InboundRequest) -> SessionOutcome {
        match self.find_token(request) {
            Some(token) => self.check(&token),
            None => SessionOutcome::Unauthenticated(Rejection::MissingCredential),
        }
    }
}
