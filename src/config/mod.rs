//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides: PORT, WEATHER_API_KEY, ...)
//!     → validation.rs (semantic checks for the running role)
//!     → ServiceConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - One file describes both hops; each process validates only its role

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    EdgeConfig, LogFormat, ObservabilityConfig, ProvidersConfig, ResolverConfig, Role,
    ServiceConfig, TimeoutConfig,
};
pub use validation::ValidationError;
