//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate the rule table
//! - Initialize subsystems in dependency order
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, no traffic without rules
//! - Listener binds last (traffic only when ready)

use std::net::AddrParseError;
use std::sync::Arc;

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{load_rules, ConfigError, RedirectorConfig};
use crate::geo::{IpApiResolver, LookupError};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::routing::Router;

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("geolocation client error: {0}")]
    Resolver(#[from] LookupError),

    #[error("metrics exporter error: {0}")]
    Metrics(#[from] BuildError),

    #[error("invalid metrics address {address}: {source}")]
    MetricsAddress {
        address: String,
        #[source]
        source: AddrParseError,
    },

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Load the rule table named in `config` and compile it.
pub fn load_router(config: &RedirectorConfig) -> Result<Arc<Router>, StartupError> {
    let rule_set = load_rules(&config.rules)?;
    Ok(Arc::new(Router::new(rule_set)))
}

/// Assemble the HTTP server with the production geolocation client.
pub fn build_server(config: RedirectorConfig) -> Result<HttpServer, StartupError> {
    let router = load_router(&config)?;
    let resolver = IpApiResolver::new(&config.geolocation)?;

    tracing::info!(
        provider = %config.geolocation.provider_url,
        timeout_secs = config.geolocation.timeout_secs,
        paths = router.path_count(),
        "Subsystems initialized"
    );

    Ok(HttpServer::new(config, router, Arc::new(resolver)))
}

/// Start everything and serve until `shutdown` fires.
pub async fn serve(config: RedirectorConfig, shutdown: Arc<Shutdown>) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let address = &config.observability.metrics_address;
        let addr = address
            .parse()
            .map_err(|source| StartupError::MetricsAddress {
                address: address.clone(),
                source,
            })?;
        metrics::init_metrics(addr)?;
    }

    let server = build_server(config)?;
    let bind_address = &server.config().listener.bind_address;

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: bind_address.clone(),
            source,
        })?;

    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bad_metrics_address_is_fatal() {
        let mut config = RedirectorConfig::default();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "not-an-address".into();

        match serve(config, Arc::new(Shutdown::new())).await {
            Err(StartupError::MetricsAddress { address, .. }) => {
                assert_eq!(address, "not-an-address")
            }
            other => panic!("expected metrics address error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_rules_is_fatal_before_bind() {
        let mut config = RedirectorConfig::default();
        config.rules.path = "/nonexistent/mapping_rules.json".into();

        assert!(matches!(
            serve(config, Arc::new(Shutdown::new())).await,
            Err(StartupError::Config(_))
        ));
    }
}
