//! Security header subsystem.
//!
//! # Data Flow
//! ```text
//! SecurityConfig (startup)
//!     → headers.rs (validate fixed header set)
//!     → csp.rs (serialize directive table)
//!     → HeaderPolicy (immutable)
//!
//! Authenticated request:
//!     → HeaderPolicy::response_headers()
//!     → attached to the downstream response
//! ```
//!
//! # Design Decisions
//! - Headers only ride on admitted responses, never on redirects
//! - One feature flag switches the whole set, CSP included

pub mod csp;
pub mod headers;

pub use csp::CspPolicy;
pub use headers::{HeaderPolicy, PolicyError};
