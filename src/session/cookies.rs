//! Credential extraction from request headers.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

/// Upper bound on chunk suffixes searched for a split session cookie.
const MAX_COOKIE_CHUNKS: usize = 16;

/// Find a cookie value by name in a raw `Cookie` header.
pub fn parse_cookie(cookie_header: &str, name: &str) -> Option<String> {
    for part in cookie_header.split(';') {
        let p = part.trim();
        if let Some((k, v)) = p.split_once('=') {
            if k.trim() == name {
                return Some(v.trim().to_string());
            }
        }
    }
    None
}

/// Find a session cookie, reassembling `name.0`, `name.1`, ... when the
/// identity provider split an oversized token across several cookies.
pub fn session_cookie(cookie_header: &str, name: &str) -> Option<String> {
    if let Some(value) = parse_cookie(cookie_header, name).filter(|v| !v.is_empty()) {
        return Some(value);
    }

    let mut joined = String::new();
    for index in 0..MAX_COOKIE_CHUNKS {
        match parse_cookie(cookie_header, &format!("{}.{}", name, index)) {
            Some(chunk) => joined.push_str(&chunk),
            None => break,
        }
    }
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
