//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gatekeeper, verifiers, server produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (verdict and outcome counters, lookup latency)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
