//! Location resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Request headers + peer address
//!     → client_ip.rs (forwarded header or peer address, port stripped)
//!     → LocationResolver::resolve (ip_api.rs in production)
//!     → location string, e.g. "United States"
//! ```
//!
//! # Design Decisions
//! - The provider sits behind a trait so handlers can run against stubs
//! - One attempt per request: no retries, no cache, no fallback location
//! - Every lookup has a deadline
//! - Location strings are passed through verbatim; rule keys must match
//!   them exactly

pub mod client_ip;
pub mod ip_api;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use client_ip::client_identifier;
pub use ip_api::IpApiResolver;

/// Errors raised while resolving a client's location.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The identifier is not an IP address.
    #[error("invalid client identifier '{0}'")]
    InvalidIdentifier(String),

    /// Connection or protocol failure talking to the provider.
    #[error("geolocation request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider did not answer in time.
    #[error("geolocation request timed out after {0:?}")]
    Timeout(Duration),

    /// Non-success HTTP status.
    #[error("geolocation provider returned status {0}")]
    Status(reqwest::StatusCode),

    /// Body is not JSON.
    #[error("geolocation response could not be decoded: {0}")]
    Decode(String),

    /// Body is JSON but lacks the location field.
    #[error("geolocation response has no string field '{0}'")]
    MissingField(String),

    /// The provider answered but refused the query.
    #[error("geolocation provider rejected lookup: {0}")]
    Rejected(String),
}

impl LookupError {
    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            LookupError::InvalidIdentifier(_) => "invalid_identifier",
            LookupError::Transport(_) => "transport",
            LookupError::Timeout(_) => "timeout",
            LookupError::Status(_) => "status",
            LookupError::Decode(_) => "decode",
            LookupError::MissingField(_) => "missing_field",
            LookupError::Rejected(_) => "rejected",
        }
    }
}

/// Resolves a client identifier to a location name.
#[async_trait]
pub trait LocationResolver: Send + Sync {
    async fn resolve(&self, identifier: &str) -> Result<String, LookupError>;
}
