// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::CadenceConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns all collected validation errors (does not fail fast).
pub fn validate_config(config: &CadenceConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let namespace = config.storage.namespace.trim();
    if namespace.is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.namespace must not be empty".to_string(),
        });
    } else if namespace.contains(':') {
        errors.push(ConfigError::Validation {
            message: format!("storage.namespace `{namespace}` must not contain `:`"),
        });
    }

    if config.sync.poll_interval_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "sync.poll_interval_ms must be greater than 0".to_string(),
        });
    }

    let base_url = config.companion.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        errors.push(ConfigError::Validation {
            message: format!("companion.base_url `{base_url}` must start with http:// or https://"),
        });
    }

    if config.companion.verification_poll_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "companion.verification_poll_secs must be greater than 0".to_string(),
        });
    }

    if config.companion.verification_max_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "companion.verification_max_attempts must be at least 1".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.log.level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = CadenceConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = CadenceConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn namespace_with_separator_fails_validation() {
        let mut config = CadenceConfig::default();
        config.storage.namespace = "a:b".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "namespace"));
    }

    #[test]
    fn zero_poll_interval_fails_validation() {
        let mut config = CadenceConfig::default();
        config.sync.poll_interval_ms = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "poll_interval_ms"));
    }

    #[test]
    fn non_http_base_url_fails_validation() {
        let mut config = CadenceConfig::default();
        config.companion.base_url = "ftp://example.com".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "base_url"));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = CadenceConfig::default();
        config.log.level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "log.level"));
    }

    #[test]
    fn errors_are_collected_not_short_circuited() {
        let mut config = CadenceConfig::default();
        config.storage.database_path = String::new();
        config.companion.verification_max_attempts = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
