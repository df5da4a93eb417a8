//! Gatekeeper orchestration.
//!
//! # Data Flow
//! ```text
//! InboundRequest
//!     → routing (public?) ── yes → Continue
//!     → session verifier  ── not authenticated → Redirect(login?callbackUrl=...)
//!     → security headers  → ContinueWithHeaders
//! ```
//!
//! # Design Decisions
//! - Exactly one verdict per request
//! - Outcome → verdict mapping lives in one function (`Gatekeeper::decide`)
//! - Fail closed: every non-authenticated outcome, panics included, redirects

pub mod gatekeeper;
pub mod verdict;

pub use gatekeeper::{GateError, Gatekeeper};
pub use verdict::{login_location, Verdict};
