//! HTTP authentication gatekeeper.
//!
//! Sits in front of an application and decides per request whether the
//! caller is authenticated, which security headers ride on the response, and
//! where unauthenticated traffic is redirected.
//!
//! ```text
//!     request ──▶ routing (public?) ──▶ session (token | lookup) ──▶ security headers
//!                     │                        │                          │
//!                  Continue              Redirect(login)        ContinueWithHeaders
//! ```

pub mod config;
pub mod gate;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;
pub mod session;

pub use config::GatekeeperConfig;
pub use gate::{Gatekeeper, Verdict};
pub use http::{HttpServer, InboundRequest};
pub use lifecycle::Shutdown;
pub use session::{SessionOutcome, SessionVerifier};
