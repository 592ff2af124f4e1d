//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, URLs and timeouts
//! - Check the rule table for unreachable or broken entries
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure: config in, list of problems out
//! - Runs before config is accepted into the system

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;
use url::Url;

use crate::config::schema::RedirectorConfig;
use crate::routing::table::{RuleSet, DEFAULT_LOCATION};

/// A single semantic problem found in the configuration or rule table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: invalid URL '{value}': {reason}")]
    InvalidUrl {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("client_ip.forwarded_header: invalid header name '{0}'")]
    InvalidHeaderName(String),

    #[error("rule #{index}: path '{path}' must start with '/'")]
    RelativePath { index: usize, path: String },

    #[error("rule #{index}: path '{path}' ends with '/' and can never match")]
    TrailingSlash { index: usize, path: String },

    #[error("rule #{index}: path '{path}' duplicates rule #{first} and is never evaluated")]
    DuplicatePath {
        index: usize,
        first: usize,
        path: String,
    },

    #[error("rule #{index}: path '{path}' has no \"Default\" location")]
    MissingDefault { index: usize, path: String },

    #[error("rule #{index}: location '{location}' has an empty backend URL")]
    EmptyBackend { index: usize, location: String },

    #[error("rule set is empty, every request will be answered with 404")]
    NoRules,
}

/// Validate the service configuration.
pub fn validate_config(config: &RedirectorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(
        "listener.bind_address",
        &config.listener.bind_address,
        &mut errors,
    );
    check_address(
        "observability.metrics_address",
        &config.observability.metrics_address,
        &mut errors,
    );

    if config.rules.path.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "rules.path" });
    }

    match Url::parse(&config.geolocation.provider_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::InvalidUrl {
            field: "geolocation.provider_url".into(),
            value: config.geolocation.provider_url.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidUrl {
            field: "geolocation.provider_url".into(),
            value: config.geolocation.provider_url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.geolocation.location_field.is_empty() {
        errors.push(ValidationError::Empty {
            field: "geolocation.location_field",
        });
    }
    if config.geolocation.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "geolocation.timeout_secs",
        });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "timeouts.request_secs",
        });
    }

    if HeaderName::from_bytes(config.client_ip.forwarded_header.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidHeaderName(
            config.client_ip.forwarded_header.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

/// Outcome of checking a rule table.
#[derive(Debug, Default)]
pub struct RuleReport {
    /// Problems that make the table unusable.
    pub errors: Vec<ValidationError>,
    /// Problems worth logging that still let the service start.
    pub warnings: Vec<ValidationError>,
}

impl RuleReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    fn push(&mut self, problem: ValidationError, fatal: bool) {
        if fatal {
            self.errors.push(problem);
        } else {
            self.warnings.push(problem);
        }
    }
}

/// Check a rule table.
///
/// Request paths have their trailing slash stripped before matching, so the
/// root is reachable only through a rule with an empty path.
pub fn validate_rules(rule_set: &RuleSet, require_default: bool) -> RuleReport {
    let mut report = RuleReport::default();
    let mut seen: HashMap<&str, usize> = HashMap::new();

    if rule_set.is_empty() {
        report.warnings.push(ValidationError::NoRules);
    }

    for (index, rule) in rule_set.rules().iter().enumerate() {
        let path = rule.path.as_str();

        if !path.is_empty() && !path.starts_with('/') {
            report.errors.push(ValidationError::RelativePath {
                index,
                path: path.to_string(),
            });
        }
        if path.ends_with('/') {
            report.errors.push(ValidationError::TrailingSlash {
                index,
                path: path.to_string(),
            });
        }

        if let Some(&first) = seen.get(path) {
            report.warnings.push(ValidationError::DuplicatePath {
                index,
                first,
                path: path.to_string(),
            });
            continue;
        }
        seen.insert(path, index);

        if !rule.locations.contains_key(DEFAULT_LOCATION) {
            report.push(
                ValidationError::MissingDefault {
                    index,
                    path: path.to_string(),
                },
                require_default,
            );
        }

        let mut locations: Vec<_> = rule.locations.iter().collect();
        locations.sort();
        for (location, backend) in locations {
            check_backend(&mut report, index, location, backend, require_default);
        }
    }

    report
}

/// An empty backend redirects with an empty `Location`, like a missing
/// `"Default"`, and shares its severity.
fn check_backend(
    report: &mut RuleReport,
    index: usize,
    location: &str,
    backend: &str,
    require_default: bool,
) {
    if backend.is_empty() {
        report.push(
            ValidationError::EmptyBackend {
                index,
                location: location.to_string(),
            },
            require_default,
        );
        return;
    }
    // Relative targets are valid Location values.
    if backend.starts_with('/') {
        return;
    }
    if let Err(e) = Url::parse(backend) {
        report.errors.push(ValidationError::InvalidUrl {
            field: format!("rule #{index} location '{location}'"),
            value: backend.to_string(),
            reason: e.to_string(),
        });
    }
}
