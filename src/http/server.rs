//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the catch-all redirect handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Derive the client identifier for each request
//! - Bind server to listener and stop on shutdown signal

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ClientIpConfig, RedirectorConfig};
use crate::geo::{client_identifier, LocationResolver};
use crate::http::dispatch::{Dispatcher, Outcome};
use crate::http::request::{request_id, MakeRequestUuid, X_REQUEST_ID};
use crate::observability::metrics;
use crate::routing::Router as RuleRouter;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub client_ip: Arc<ClientIpConfig>,
}

/// HTTP server for the redirector.
pub struct HttpServer {
    router: Router,
    config: RedirectorConfig,
}

impl HttpServer {
    /// Create a new HTTP server from a compiled rule table and a resolver.
    pub fn new(
        config: RedirectorConfig,
        rules: Arc<RuleRouter>,
        resolver: Arc<dyn LocationResolver>,
    ) -> Self {
        let state = AppState {
            dispatcher: Dispatcher::new(rules, resolver),
            client_ip: Arc::new(config.client_ip.clone()),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RedirectorConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(redirect_handler))
            .route("/", any(redirect_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// The assembled Axum router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RedirectorConfig {
        &self.config
    }
}

/// Catch-all handler: resolve, match, redirect.
async fn redirect_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&headers);
    let client = client_identifier(&headers, &addr.to_string(), &state.client_ip);

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %uri.path(),
        client = %client,
        "Dispatching request"
    );

    let outcome = state.dispatcher.dispatch(uri.path(), &client).await;

    if let Outcome::LookupFailed(e) = &outcome {
        metrics::record_lookup_failure(e.kind());
    }
    let label = outcome.label();
    let response = outcome.into_response();
    metrics::record_request(label, response.status().as_u16(), start_time);

    response
}
