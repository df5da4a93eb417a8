//! HTTP hosting subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → middleware/gate.rs (exclusions, verdict from the gatekeeper)
//!         Redirect → 307 to login, done
//!         Continue / ContinueWithHeaders ↓
//!     → upstream.rs (forward to the protected application)
//!     → middleware/gate.rs (attach security headers)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod server;
pub mod upstream;

pub use request::InboundRequest;
pub use server::{HttpServer, ServerError};
