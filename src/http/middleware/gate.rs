//! Gatekeeper middleware.
//! Normalizes the request target, then applies a verdict before the
//! downstream handler runs. Exclusions, route matching and forwarding all see
//! the same normalized target.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use url::Url;

use crate::gate::{Gatekeeper, Verdict};
use crate::http::request::{normalize_target, InboundRequest};
use crate::session::Identity;

/// State required by the gatekeeper middleware.
#[derive(Clone)]
pub struct GateState {
    pub gatekeeper: Arc<Gatekeeper>,
    pub public_origin: Option<Url>,
    pub excluded_prefixes: Arc<Vec<String>>,
}

impl GateState {
    pub fn new(gatekeeper: Arc<Gatekeeper>, public_origin: Option<Url>, excluded_prefixes: Vec<String>) -> Self {
        Self {
            gatekeeper,
            public_origin,
            excluded_prefixes: Arc::new(excluded_prefixes),
        }
    }

    /// Paths the hosting runtime never hands to the gatekeeper.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }
}

/// Context attached to authenticated requests.
#[derive(Clone, Debug)]
pub struct SessionContext {
    pub identity: Identity,
}

pub async fn gatekeeper_middleware(
    State(state): State<GateState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // 0. Resolve dot segments; drop any client-supplied scheme/authority.
    match normalize_target(req.uri()) {
        Some(uri) => *req.uri_mut() = uri,
        None => {
            tracing::debug!(uri = %req.uri(), "Rejecting unparsable request target");
            return (StatusCode::BAD_REQUEST, "Malformed request target").into_response();
        }
    }

    // 1. Runtime exclusions skip the gatekeeper entirely.
    if state.is_excluded(req.uri().path()) {
        return next.run(req).await;
    }

    // 2. Ask for a verdict.
    let inbound = InboundRequest::from_http(&req, state.public_origin.as_ref());
    let verdict = state.gatekeeper.handle(&inbound).await;

    // 3. Apply it.
    match verdict {
        Verdict::Continue => next.run(req).await,
        Verdict::ContinueWithHeaders { headers, identity } => {
            if let Some(identity) = identity {
                req.extensions_mut().insert(SessionContext { identity });
            }
            let mut response = next.run(req).await;
            response.headers_mut().extend(headers);
            response
        }
        Verdict::Redirect { location } => {
            tracing::debug!(path = %inbound.path(), location = %location, "Redirecting to login");
            Redirect::temporary(&location).into_response()
        }
    }
}
