//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{RedirectorConfig, RulesConfig};
use crate::config::validation::{validate_config, validate_rules, ValidationError};
use crate::routing::table::RuleSet;

/// Error type for configuration and rule table loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Rule table parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate the service configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RedirectorConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: RedirectorConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load the rule table named by `config` and run semantic checks on it.
///
/// Warnings are logged; errors abort the load.
pub fn load_rules(config: &RulesConfig) -> Result<RuleSet, ConfigError> {
    let rule_set = RuleSet::load(Path::new(&config.path))?;

    let report = validate_rules(&rule_set, config.require_default);
    for warning in &report.warnings {
        tracing::warn!(path = %config.path, "{}", warning);
    }
    if !report.errors.is_empty() {
        return Err(ConfigError::Validation(report.errors));
    }

    tracing::info!(
        path = %config.path,
        rules = rule_set.len(),
        "Rule table loaded"
    );

    Ok(rule_set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_config() {
        let file = write_temp(
            r#"
            [listener]
            bind_address = "127.0.0.1:18080"

            [rules]
            path = "rules.json"
            require_default = true
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:18080");
        assert_eq!(config.rules.path, "rules.json");
        assert!(config.rules.require_default);
    }

    #[test]
    fn test_load_config_rejects_bad_toml() {
        let file = write_temp("[listener\nbind_address = 1");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let file = write_temp(
            r#"
            [listener]
            bind_address = "not-an-address"

            [geolocation]
            timeout_secs = 0
            "#,
        );

        match load_config(file.path()) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_rules_tolerates_missing_default() {
        let file = write_temp(r#"{"rules": [{"path": "/a", "locations": {"Luxembourg": "https://lu"}}]}"#);
        let config = RulesConfig {
            path: file.path().to_string_lossy().into_owned(),
            require_default: false,
        };

        let rs = load_rules(&config).unwrap();
        assert_eq!(rs.len(), 1);
    }

    #[test]
    fn test_load_rules_strict_default() {
        let file = write_temp(r#"{"rules": [{"path": "/a", "locations": {"Luxembourg": "https://lu"}}]}"#);
        let config = RulesConfig {
            path: file.path().to_string_lossy().into_owned(),
            require_default: true,
        };

        assert!(matches!(load_rules(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_rules_missing_file() {
        let config = RulesConfig {
            path: "/nonexistent/rules.json".into(),
            require_default: false,
        };
        let err = load_rules(&config).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rules.json"));
    }
}
