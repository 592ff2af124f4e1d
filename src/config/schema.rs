//! Configuration schema definitions.
//!
//! This module defines the service configuration for the redirector.
//! All types derive Serde traits for deserialization from TOML files.
//! The rule table itself lives in its own JSON document; see
//! [`crate::routing::table`].

use serde::{Deserialize, Serialize};

/// Root configuration for the redirector.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RedirectorConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Where the rule table is loaded from.
    pub rules: RulesConfig,

    /// Geolocation provider settings.
    pub geolocation: GeolocationConfig,

    /// How the client identifier is derived from a request.
    pub client_ip: ClientIpConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Rule table source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Path to the JSON rule table.
    pub path: String,

    /// Refuse to start when a rule has no `"Default"` location.
    pub require_default: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            path: "mapping_rules.json".to_string(),
            require_default: false,
        }
    }
}

/// Geolocation provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeolocationConfig {
    /// Provider base URL. Lookups go to `{provider_url}/json/{ip}`.
    pub provider_url: String,

    /// Upper bound for a single lookup in seconds.
    pub timeout_secs: u64,

    /// JSON field carrying the location string.
    pub location_field: String,

    /// Treat a `"status": "fail"` body or a missing location field as a
    /// lookup failure. Otherwise the location is empty and the rule's
    /// `"Default"` backend applies.
    pub strict_location: bool,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            provider_url: "http://ip-api.com".to_string(),
            timeout_secs: 5,
            location_field: "country".to_string(),
            strict_location: false,
        }
    }
}

/// Client identification settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientIpConfig {
    /// Header carrying the forwarded client address chain.
    pub forwarded_header: String,

    /// Whether the forwarded header is honoured at all.
    pub trust_forwarded: bool,
}

impl Default for ClientIpConfig {
    fn default() -> Self {
        Self {
            forwarded_header: "x-forwarded-for".to_string(),
            trust_forwarded: true,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time to produce a response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
