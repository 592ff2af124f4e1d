//! Rule matching logic.
//!
//! # Responsibilities
//! - Find the rule governing a request path (exact, case-sensitive)
//! - Select the backend for the client's location
//! - Fall back to the `"Default"` location
//!
//! # Design Decisions
//! - No normalization here; callers strip the trailing slash
//! - First rule with a matching path wins, later duplicates are never read
//! - A path match is a match even if no backend could be selected

use crate::routing::table::RuleSet;

/// Result of matching a `(path, location)` pair against the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    /// Selected backend URL. Empty when nothing matched, or when the matched
    /// rule has neither the location nor a `"Default"` entry.
    pub backend: &'a str,
    /// Whether a rule's path matched.
    pub matched: bool,
}

impl<'a> RouteMatch<'a> {
    /// No rule governs the path.
    pub const NONE: RouteMatch<'static> = RouteMatch {
        backend: "",
        matched: false,
    };

    pub fn found(backend: &'a str) -> Self {
        Self {
            backend,
            matched: true,
        }
    }

    /// Matched, but the rule yielded no usable backend.
    pub fn is_missing_backend(&self) -> bool {
        self.matched && self.backend.is_empty()
    }
}

/// Scan `rule_set` in order and select a backend for `location`.
pub fn apply_rules<'a>(rule_set: &'a RuleSet, path: &str, location: &str) -> RouteMatch<'a> {
    rule_set
        .rules()
        .iter()
        .find(|rule| rule.path == path)
        .map(|rule| RouteMatch::found(rule.backend_for(location)))
        .unwrap_or(RouteMatch::NONE)
}
