//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, deserialize, apply env secret override)
//!     → validation.rs (semantic checks)
//!     → GatekeeperConfig (validated, immutable)
//!     → compiled into the gatekeeper components at startup
//! ```
//!
//! # Design Decisions
//! - Config is loaded once and never changes for the process lifetime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::GatekeeperConfig;
pub use schema::{
    CspDirective, HeaderEntry, LookupConfig, ObservabilityConfig, RedirectConfig, RoutesConfig,
    SecurityConfig, ServerConfig, SessionConfig, SessionStrategy, TokenConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
