//! Per-request orchestration.
//!
//! # Responsibilities
//! - Normalize the request path (percent-decoded, one trailing slash
//!   stripped)
//! - Resolve the client's location
//! - Match the rule table and pick the outcome
//! - Map each outcome to an HTTP response
//!
//! # Design Decisions
//! - Linear: resolve, then match, then respond; no state between requests
//! - Resolution failure never falls back to "Default"; it is a 500
//! - A matched rule with an empty backend still redirects (logged)

use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use percent_encoding::percent_decode_str;

use crate::geo::{LocationResolver, LookupError};
use crate::routing::Router;

/// What the service does with a request.
#[derive(Debug)]
pub enum Outcome {
    /// 302 to the selected backend.
    Redirect(String),
    /// No rule governs the path.
    NotFound,
    /// The client's location could not be determined.
    LookupFailed(LookupError),
}

impl Outcome {
    /// Label used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Redirect(_) => "redirect",
            Outcome::NotFound => "not_found",
            Outcome::LookupFailed(_) => "lookup_failed",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Redirect(_) => StatusCode::FOUND,
            Outcome::NotFound => StatusCode::NOT_FOUND,
            Outcome::LookupFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Outcome::Redirect(target) => match HeaderValue::try_from(target.as_str()) {
                Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
                Err(_) => {
                    tracing::error!(target = %target, "Backend URL is not a valid Location header");
                    (StatusCode::INTERNAL_SERVER_ERROR, "Invalid redirect target").into_response()
                }
            },
            Outcome::NotFound => (StatusCode::NOT_FOUND, "Not Found").into_response(),
            Outcome::LookupFailed(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Error getting location").into_response()
            }
        }
    }
}

/// Percent-decode a raw request path. Invalid UTF-8 is replaced lossily.
pub fn decode_path(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw).decode_utf8_lossy()
}

/// Strip a single trailing slash. The root path becomes empty.
pub fn normalize_path(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

/// Ties location resolution to rule matching.
#[derive(Clone)]
pub struct Dispatcher {
    router: Arc<Router>,
    resolver: Arc<dyn LocationResolver>,
}

impl Dispatcher {
    pub fn new(router: Arc<Router>, resolver: Arc<dyn LocationResolver>) -> Self {
        Self { router, resolver }
    }

    /// Decide the outcome for a request to the raw (still percent-encoded)
    /// `path` from `identifier`.
    pub async fn dispatch(&self, path: &str, identifier: &str) -> Outcome {
        let decoded = decode_path(path);
        let path = normalize_path(&decoded);

        let location = match self.resolver.resolve(identifier).await {
            Ok(location) => location,
            Err(e) => {
                tracing::error!(
                    client = %identifier,
                    path = %path,
                    kind = e.kind(),
                    error = %e,
                    "Location lookup failed"
                );
                return Outcome::LookupFailed(e);
            }
        };

        tracing::info!(client = %identifier, location = %location, "Client location resolved");

        let route = self.router.match_path(path, &location);
        if !route.matched {
            tracing::debug!(path = %path, location = %location, "No rule matched");
            return Outcome::NotFound;
        }

        if route.is_missing_backend() {
            tracing::warn!(
                path = %path,
                location = %location,
                "Rule matched but has neither this location nor a Default backend"
            );
        }

        Outcome::Redirect(route.backend.to_string())
    }
}
