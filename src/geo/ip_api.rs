//! ip-api.com style geolocation client.
//!
//! # Responsibilities
//! - Query `{provider_url}/json/{ip}` once per request
//! - Enforce the configured deadline
//! - Extract the configured location field from the JSON body
//!
//! # Design Decisions
//! - Identifiers must parse as IP addresses before they go into the URL
//! - A `"status": "fail"` body or a missing field resolves to the empty
//!   location, so the rule's `"Default"` applies; `strict_location` turns
//!   both into failures
//! - Connection pool is shared across requests (one `reqwest::Client`)

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::timeout;

use crate::config::GeolocationConfig;
use crate::geo::{LocationResolver, LookupError};

/// Geolocation resolver backed by an HTTP JSON API.
#[derive(Debug, Clone)]
pub struct IpApiResolver {
    client: reqwest::Client,
    base_url: String,
    location_field: String,
    strict: bool,
    timeout: Duration,
}

impl IpApiResolver {
    /// Build a resolver from configuration.
    pub fn new(config: &GeolocationConfig) -> Result<Self, LookupError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            base_url: config.provider_url.trim_end_matches('/').to_string(),
            location_field: config.location_field.clone(),
            strict: config.strict_location,
            timeout,
        })
    }

    fn lookup_url(&self, ip: &IpAddr) -> String {
        format!("{}/json/{}", self.base_url, ip)
    }

    async fn fetch(&self, ip: &IpAddr) -> Result<String, LookupError> {
        let response = self.client.get(self.lookup_url(ip)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status));
        }

        let body = response.bytes().await?;
        parse_location(&body, &self.location_field, self.strict)
    }
}

#[async_trait]
impl LocationResolver for IpApiResolver {
    async fn resolve(&self, identifier: &str) -> Result<String, LookupError> {
        let ip: IpAddr = identifier
            .parse()
            .map_err(|_| LookupError::InvalidIdentifier(identifier.to_string()))?;

        let location = timeout(self.timeout, self.fetch(&ip))
            .await
            .map_err(|_| LookupError::Timeout(self.timeout))??;

        tracing::debug!(ip = %ip, location = %location, "Location resolved");
        Ok(location)
    }
}

/// Extract `field` from a provider response body.
///
/// Unless `strict` is set, a rejection or an absent (or null) field yields
/// the empty location. A field of the wrong type is always a decode error.
pub fn parse_location(body: &[u8], field: &str, strict: bool) -> Result<String, LookupError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| LookupError::Decode(e.to_string()))?;

    if value.get("status").and_then(Value::as_str) == Some("fail") {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unspecified failure");
        if strict {
            return Err(LookupError::Rejected(message.to_string()));
        }
        tracing::debug!(message = %message, "Provider rejected lookup, using empty location");
    }

    match value.get(field) {
        Some(Value::String(location)) => Ok(location.clone()),
        None | Some(Value::Null) if strict => Err(LookupError::MissingField(field.to_string())),
        None | Some(Value::Null) => Ok(String::new()),
        Some(other) => Err(LookupError::Decode(format!(
            "field {field} is not a string: {other}"
        ))),
    }
}
