//! Forwarding admitted requests to the protected application.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the upstream base URL
//! - Strip hop-by-hop headers, add X-Forwarded-Host/Proto
//! - Map upstream failures to 502/504
//!
//! # Design Decisions
//! - Single attempt; the gatekeeper is not a load balancer
//! - Streaming bodies both ways, nothing buffered

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{self, HeaderName},
        uri::{Authority, PathAndQuery, Scheme},
        HeaderMap, HeaderValue, Request, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::config::UpstreamConfig;

const X_FORWARDED_HOST: &str = "x-forwarded-host";
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("invalid upstream URL '{0}'")]
    InvalidUrl(String),

    #[error("failed to build upstream request: {0}")]
    Build(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),

    #[error("upstream timed out after {0:?}")]
    Timeout(Duration),
}

impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        let status = match self {
            UpstreamError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        };
        (status, "Upstream request failed").into_response()
    }
}

/// The protected application.
#[derive(Clone)]
pub struct Upstream {
    client: Client<HttpConnector, Body>,
    scheme: Scheme,
    authority: Authority,
    timeout: Duration,
}

impl Upstream {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let base: Uri = config
            .url
            .parse()
            .map_err(|_| UpstreamError::InvalidUrl(config.url.clone()))?;
        let (scheme, authority) = match (base.scheme(), base.authority()) {
            (Some(s), Some(a)) => (s.clone(), a.clone()),
            _ => return Err(UpstreamError::InvalidUrl(config.url.clone())),
        };

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            client,
            scheme,
            authority,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Rewrite `uri` onto the upstream, keeping path and query.
    pub fn target_uri(&self, uri: &Uri) -> Result<Uri, UpstreamError> {
        let path_and_query = uri
            .path_and_query()
            .cloned()
            .unwrap_or_else(|| PathAndQuery::from_static("/"));
        Ok(Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()?)
    }

    pub async fn forward(&self, request: Request<Body>) -> Result<Response, UpstreamError> {
        let (mut parts, body) = request.into_parts();
        parts.uri = self.target_uri(&parts.uri)?;
        prepare_headers(&mut parts.headers);

        let request = Request::from_parts(parts, body);
        let response: hyper::Response<Incoming> = tokio::time::timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| UpstreamError::Timeout(self.timeout))??;

        let (mut parts, body) = response.into_parts();
        for name in HOP_BY_HOP.iter() {
            parts.headers.remove(name);
        }
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

fn prepare_headers(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
    if let Some(host) = headers.get(header::HOST).cloned() {
        headers.insert(X_FORWARDED_HOST, host);
    }
    if !headers.contains_key(X_FORWARDED_PROTO) {
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));
    }
}

/// Fallback handler: everything that got past the gatekeeper is forwarded.
pub async fn forward_handler(State(upstream): State<Upstream>, request: Request<Body>) -> Response {
    let path = request.uri().path().to_string();
    match upstream.forward(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(path = %path, error = %e, "Upstream error");
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream() -> Upstream {
        Upstream::new(&UpstreamConfig {
            url: "http://127.0.0.1:3000".into(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_target_uri() {
        let uri: Uri = "/teams/acme?tab=billing".parse().unwrap();
        assert_eq!(
            upstream().target_uri(&uri).unwrap().to_string(),
            "http://127.0.0.1:3000/teams/acme?tab=billing"
        );
    }

    #[test]
    fn test_invalid_url() {
        let result = Upstream::new(&UpstreamConfig {
            url: "/relative".into(),
            timeout_secs: 5,
        });
        assert!(matches!(result, Err(UpstreamError::InvalidUrl(_))));
    }

    #[test]
    fn test_prepare_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("app.example.com"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::COOKIE, HeaderValue::from_static("a=1"));
        prepare_headers(&mut headers);

        assert!(!headers.contains_key(header::CONNECTION));
        assert_eq!(headers[X_FORWARDED_HOST], "app.example.com");
        assert_eq!(headers[X_FORWARDED_PROTO], "http");
        assert_eq!(headers[header::COOKIE], "a=1");
    }
}
