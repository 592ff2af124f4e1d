//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! service config (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RedirectorConfig (validated, immutable)
//!
//! rule table (JSON)
//!     → loader.rs (routing::table::RuleSet::load)
//!     → validation.rs (rule checks, warnings logged)
//!     → RuleSet → routing::Router, shared via Arc
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_rules, ConfigError};
pub use schema::{
    ClientIpConfig, GeolocationConfig, ListenerConfig, ObservabilityConfig, RedirectorConfig,
    RulesConfig, TimeoutConfig,
};
