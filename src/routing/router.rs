//! Public route classification.
//!
//! # Responsibilities
//! - Store the compiled public route patterns
//! - Classify a request path as public or protected
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Logical OR over all patterns; order is irrelevant
//! - No match means protected, never an error

use crate::routing::matcher::{GlobPattern, PatternError};

/// The set of routes exempt from authentication.
#[derive(Debug, Clone, Default)]
pub struct PublicRoutes {
    patterns: Vec<GlobPattern>,
}

impl PublicRoutes {
    /// Compile every pattern; the first invalid one aborts construction.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PatternError> {
        let patterns = patterns
            .iter()
            .map(|p| GlobPattern::compile(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Returns true if `path` matches any public pattern.
    pub fn is_public(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }

    /// The first pattern that matches `path`, for diagnostics.
    pub fn matching_pattern(&self, path: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|p| p.matches(path))
            .map(|p| p.as_str())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoutesConfig;

    fn default_routes() -> PublicRoutes {
        PublicRoutes::from_patterns(&RoutesConfig::default().public).unwrap()
    }

    #[test]
    fn test_default_public_routes() {
        let routes = default_routes();
        assert!(routes.is_public("/api/health"));
        assert!(routes.is_public("/api/auth/callback/github"));
        assert!(routes.is_public("/api/scim/v2.0/acme/Users"));
        assert!(routes.is_public("/auth/login"));
        assert!(routes.is_public("/invitations/abc123"));
        assert!(routes.is_public("/.well-known/security.txt"));

        assert!(!routes.is_public("/dashboard"));
        assert!(!routes.is_public("/invitations/abc/def"));
        assert!(!routes.is_public("/api/webhooks/github"));
        assert!(!routes.is_public("/api/health/"));
    }

    #[test]
    fn test_order_independent() {
        let a = PublicRoutes::from_patterns(&["/auth/**", "/auth/login"]).unwrap();
        let b = PublicRoutes::from_patterns(&["/auth/login", "/auth/**"]).unwrap();
        for path in ["/auth/login", "/auth/x/y", "/other"] {
            assert_eq!(a.is_public(path), b.is_public(path));
        }
    }

    #[test]
    fn test_matching_pattern() {
        let routes = default_routes();
        assert_eq!(routes.matching_pattern("/auth/join"), Some("/auth/**"));
        assert_eq!(routes.matching_pattern("/settings"), None);
    }

    #[test]
    fn test_empty_set_is_all_protected() {
        let routes = PublicRoutes::from_patterns::<&str>(&[]).unwrap();
        assert!(routes.is_empty());
        assert!(!routes.is_public("/"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        assert!(PublicRoutes::from_patterns(&["/ok", "bad"]).is_err());
    }
}
