//! The gatekeeper's per-request decision.

use axum::http::HeaderMap;
use url::form_urlencoded::byte_serialize;
use url::Url;

use crate::session::Identity;

/// What the hosting runtime should do with a request.
#[derive(Debug, Clone)]
pub enum Verdict {
    /// Pass through untouched.
    Continue,
    /// Pass through, then attach `headers` to the response. The header map
    /// is empty when security headers are disabled.
    ContinueWithHeaders {
        headers: HeaderMap,
        identity: Option<Identity>,
    },
    /// Send the caller to the login page.
    Redirect { location: String },
}

impl Verdict {
    /// Metric/log label.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Continue => "continue",
            Verdict::ContinueWithHeaders { .. } => "continue_with_headers",
            Verdict::Redirect { .. } => "redirect",
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Verdict::Redirect { .. })
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Verdict::Redirect { location } => Some(location),
            _ => None,
        }
    }

    pub fn headers(&self) -> Option<&HeaderMap> {
        match self {
            Verdict::ContinueWithHeaders { headers, .. } => Some(headers),
            _ => None,
        }
    }
}

fn encode_component(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

/// Build `<origin><login_path>?<param>=<encoded original URL>`.
///
/// When `original_url` carries no origin the location is relative.
pub fn login_location(original_url: &str, login_path: &str, callback_param: &str) -> String {
    let query = format!(
        "{}={}",
        encode_component(callback_param),
        encode_component(original_url)
    );

    match Url::parse(original_url) {
        Ok(url) if url.has_host() && matches!(url.scheme(), "http" | "https") => {
            format!("{}{}?{}", url.origin().ascii_serialization(), login_path, query)
        }
        _ => format!("{}?{}", login_path, query),
    }
}
