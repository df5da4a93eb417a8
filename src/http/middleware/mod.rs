//! Request middleware.

pub mod gate;

pub use gate::{gatekeeper_middleware, GateState, SessionContext};
