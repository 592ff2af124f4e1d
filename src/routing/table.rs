//! The rule table.
//!
//! # Format
//! ```json
//! {
//!   "rules": [
//!     {
//!       "path": "/search",
//!       "locations": {
//!         "United States": "https://duckduckgo.com/?q=news",
//!         "Default": "https://www.google.com/search?q=news"
//!       }
//!     }
//!   ]
//! }
//! ```
//!
//! # Design Decisions
//! - Loaded once at startup, read-only afterwards (shared via Arc)
//! - No mutation API; a new table means a new process
//! - Order of `rules` is significant: first rule with a given path wins

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::loader::ConfigError;

/// Reserved location key consulted when the client's location has no entry.
pub const DEFAULT_LOCATION: &str = "Default";

/// One routable path and its location → backend URL mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Rule {
    /// Exact request path this rule governs.
    pub path: String,

    /// Location name (or `"Default"`) to backend URL.
    #[serde(default)]
    pub locations: HashMap<String, String>,
}

impl Rule {
    /// Build a rule from a path and `(location, backend)` pairs.
    pub fn new<I, K, V>(path: impl Into<String>, locations: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            path: path.into(),
            locations: locations
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Backend for `location`, falling back to the `"Default"` entry.
    ///
    /// Returns an empty string when neither key exists.
    pub fn backend_for(&self, location: &str) -> &str {
        self.locations
            .get(location)
            .or_else(|| self.locations.get(DEFAULT_LOCATION))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Whether the rule carries a `"Default"` entry.
    pub fn has_default(&self) -> bool {
        self.locations.contains_key(DEFAULT_LOCATION)
    }
}

/// The full, ordered rule table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleSet {
    #[serde(default)]
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Read and parse a rule table from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse a rule table from a JSON document.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(ConfigError::Json)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "rules": [
            {
                "path": "/search",
                "locations": {
                    "United States": "https://duckduckgo.com/?q=news",
                    "Luxembourg": "https://www.bing.com/search?q=news",
                    "Default": "https://www.google.com/search?q=news"
                }
            },
            {
                "path": "/maps",
                "locations": {
                    "Default": "https://www.openstreetmap.org"
                }
            }
        ]
    }"#;

    #[test]
    fn test_parse_preserves_order() {
        let rs = RuleSet::from_json(SAMPLE).unwrap();
        assert_eq!(rs.len(), 2);
        assert_eq!(rs.rules()[0].path, "/search");
        assert_eq!(rs.rules()[1].path, "/maps");
        assert_eq!(rs.rules()[0].locations.len(), 3);
    }

    #[test]
    fn test_malformed_json_fails() {
        let err = RuleSet::from_json("{\"rules\": [ {\"path\": 42} ]}").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));

        let err = RuleSet::from_json("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_missing_rules_key_is_empty_table() {
        let rs = RuleSet::from_json("{}").unwrap();
        assert!(rs.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let rs = RuleSet::load(file.path()).unwrap();
        assert_eq!(rs.len(), 2);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = RuleSet::load(Path::new("/nonexistent/mapping_rules.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_backend_for_falls_back_to_default() {
        let rule = Rule::new("/x", [("Luxembourg", "https://lu"), ("Default", "https://any")]);
        assert_eq!(rule.backend_for("Luxembourg"), "https://lu");
        assert_eq!(rule.backend_for("Germany"), "https://any");

        let bare = Rule::new("/y", [("Luxembourg", "https://lu")]);
        assert!(!bare.has_default());
        assert_eq!(bare.backend_for("Germany"), "");
    }
}
