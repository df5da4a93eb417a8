//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path (no query string)
//!     → router.rs (any public pattern?)
//!     → matcher.rs (evaluate one compiled glob)
//!     → Return: public or protected
//!
//! Pattern Compilation (at startup):
//!     routes.public[]
//!     → Compile globs into segment matchers
//!     → Freeze as immutable PublicRoutes
//! ```
//!
//! # Design Decisions
//! - Patterns compiled at startup, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always yields the same classification

pub mod matcher;
pub mod router;

pub use matcher::{GlobPattern, PatternError};
pub use router::PublicRoutes;
