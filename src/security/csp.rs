//! Content-Security-Policy assembly.

use crate::config::CspDirective;

/// Directive appended to every policy, without a value.
pub const UPGRADE_INSECURE_REQUESTS: &str = "upgrade-insecure-requests";

/// Ordered CSP directive table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CspPolicy {
    directives: Vec<(String, Vec<String>)>,
}

impl CspPolicy {
    pub fn from_directives(directives: &[CspDirective]) -> Self {
        Self {
            directives: directives
                .iter()
                .map(|d| (d.name.clone(), d.sources.clone()))
                .collect(),
        }
    }

    /// Serialize the table: `name src src; name src; ...; upgrade-insecure-requests`.
    ///
    /// Directives keep table order. A directive without sources is emitted
    /// as its bare name.
    pub fn build_csp(&self) -> String {
        self.directives
            .iter()
            .map(|(name, sources)| {
                if sources.is_empty() {
                    name.clone()
                } else {
                    format!("{} {}", name, sources.join(" "))
                }
            })
            .chain(std::iter::once(UPGRADE_INSECURE_REQUESTS.to_string()))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}
