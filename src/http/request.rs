//! Inbound request view.
//!
//! # Responsibilities
//! - Normalize the request target before anything matches on it
//! - Extract gate-relevant information (path, headers, original URL)
//!
//! # Design Decisions
//! - Read-only snapshot; the gatekeeper never mutates the request
//! - The absolute URL is rebuilt from the configured public origin only.
//!   Host headers and absolute-form targets are client-controlled
//! - Without a public origin the URL stays relative and redirects stay relative

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, Request, Uri};
use url::Url;

/// Placeholder base for resolving origin-form targets.
const TARGET_BASE: &str = "http://gatekeeper.invalid";

/// Resolve dot segments (`.`, `..`, `%2e%2e`) the way a URL parser does and
/// return the origin-form target. Any scheme or authority in the original
/// target is dropped. `None` when the target does not parse.
pub fn normalize_target(uri: &Uri) -> Option<Uri> {
    let target = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    if !target.starts_with('/') {
        return None;
    }

    let parsed = Url::parse(&format!("{}{}", TARGET_BASE, target)).ok()?;
    let normalized = match parsed.query() {
        Some(query) => format!("{}?{}", parsed.path(), query),
        None => parsed.path().to_string(),
    };
    normalized.parse().ok()
}

/// The parts of a request the gatekeeper looks at.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    path: String,
    headers: HeaderMap,
    url: String,
}

impl InboundRequest {
    pub fn new(path: impl Into<String>, headers: HeaderMap, url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            headers,
            url: url.into(),
        }
    }

    /// Snapshot an HTTP request whose target went through `normalize_target`.
    pub fn from_http<B>(req: &Request<B>, public_origin: Option<&Url>) -> Self {
        let uri = req.uri();
        let path_and_query = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        let url = match public_origin {
            Some(origin) => format!("{}{}", origin.origin().ascii_serialization(), path_and_query),
            None => path_and_query.to_string(),
        };

        Self {
            path: uri.path().to_string(),
            headers: req.headers().clone(),
            url,
        }
    }

    /// Path component, without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The original request URL; absolute when an origin was known.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Raw `Cookie` header values joined with `; `, if any.
    pub fn cookie_header(&self) -> Option<String> {
        let values: Vec<&str> = self
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.join("; "))
        }
    }
}
