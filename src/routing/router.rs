//! Route lookup.
//!
//! # Responsibilities
//! - Own the loaded rule table
//! - Look up the rule for a request path
//! - Return the selected backend or an explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) path lookup via HashMap instead of a linear scan
//! - The index keeps the first-registered rule for each path, so results
//!   are identical to [`apply_rules`](crate::routing::matcher::apply_rules)

use std::collections::HashMap;

use crate::routing::matcher::RouteMatch;
use crate::routing::table::RuleSet;

/// Compiled, read-only view of a [`RuleSet`].
#[derive(Debug, Clone)]
pub struct Router {
    rule_set: RuleSet,
    by_path: HashMap<String, usize>,
}

impl Router {
    /// Compile a rule table into a path index.
    pub fn new(rule_set: RuleSet) -> Self {
        let mut by_path = HashMap::with_capacity(rule_set.len());
        for (index, rule) in rule_set.rules().iter().enumerate() {
            by_path.entry(rule.path.clone()).or_insert(index);
        }

        tracing::debug!(
            rules = rule_set.len(),
            distinct_paths = by_path.len(),
            "Router compiled"
        );

        Self { rule_set, by_path }
    }

    /// Select a backend for `location` under the rule governing `path`.
    pub fn match_path(&self, path: &str, location: &str) -> RouteMatch<'_> {
        match self.by_path.get(path) {
            Some(&index) => RouteMatch::found(self.rule_set.rules()[index].backend_for(location)),
            None => RouteMatch::NONE,
        }
    }

    pub fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }

    /// Number of distinct routable paths.
    pub fn path_count(&self) -> usize {
        self.by_path.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::matcher::apply_rules;
    use crate::routing::table::Rule;

    fn rules() -> RuleSet {
        RuleSet::new(vec![
            Rule::new(
                "/search",
                [
                    ("United States", "https://duckduckgo.com/?q=news"),
                    ("Luxembourg", "https://www.bing.com/search?q=news"),
                    ("Default", "https://www.google.com/search?q=news"),
                ],
            ),
            Rule::new("", [("Default", "https://home.example")]),
            Rule::new("/no-default", [("Luxembourg", "https://lu.example")]),
            Rule::new("/search", [("Default", "https://shadowed.example")]),
        ])
    }

    #[test]
    fn test_scenarios() {
        let router = Router::new(rules());

        assert_eq!(
            router.match_path("/search", "United States"),
            RouteMatch::found("https://duckduckgo.com/?q=news")
        );
        assert_eq!(
            router.match_path("/search", "Germany"),
            RouteMatch::found("https://www.google.com/search?q=news")
        );
        assert_eq!(router.match_path("/unknown/url", "US"), RouteMatch::NONE);
    }

    #[test]
    fn test_first_registered_wins() {
        let router = Router::new(rules());
        assert_eq!(router.path_count(), 3);
        assert_eq!(
            router.match_path("/search", "Mars").backend,
            "https://www.google.com/search?q=news"
        );
    }

    #[test]
    fn test_agrees_with_linear_scan() {
        let rs = rules();
        let router = Router::new(rs.clone());

        let paths = ["/search", "", "/no-default", "/missing", "/search/"];
        let locations = ["United States", "Luxembourg", "Germany", "Default", ""];

        for path in paths {
            for location in locations {
                assert_eq!(
                    router.match_path(path, location),
                    apply_rules(&rs, path, location),
                    "path={path:?} location={location:?}"
                );
            }
        }
    }
}
