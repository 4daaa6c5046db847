// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as bind addresses, non-empty paths and positive lookup budgets.

use crate::diagnostic::ConfigError;
use crate::model::LecternConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &LecternConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::invalid("server.host", "must not be empty"));
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::invalid(
                "server.host",
                format!("`{host}` is not a valid IP address or hostname"),
            ));
        }
    }

    if config.server.port == 0 {
        errors.push(ConfigError::invalid("server.port", "must be non-zero"));
    }

    if !LOG_LEVELS.contains(&config.server.log_level.as_str()) {
        errors.push(ConfigError::invalid(
            "server.log_level",
            format!(
                "`{}` must be one of: {}",
                config.server.log_level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::invalid("storage.database_path", "must not be empty"));
    }

    if config.lookup.time_budgets_secs.is_empty() {
        errors.push(ConfigError::invalid(
            "lookup.time_budgets_secs",
            "must list at least one budget",
        ));
    }

    for (i, budget) in config.lookup.time_budgets_secs.iter().enumerate() {
        if *budget == 0 {
            errors.push(ConfigError::invalid(
                &format!("lookup.time_budgets_secs[{i}]"),
                "must be greater than zero",
            ));
        }
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
            .any(|e| matches!(e, ConfigError::Validation { .. }) && e.to_string().contains(needle))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&LecternConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = LecternConfig::default();
        config.storage.database_path = " ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn zero_lookup_budget_fails_validation() {
        let mut config = LecternConfig::default();
        config.lookup.time_budgets_secs = vec![30, 0];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "time_budgets_secs[1]"));
    }

    #[test]
    fn empty_lookup_budgets_fail_validation() {
        let mut config = LecternConfig::default();
        config.lookup.time_budgets_secs.clear();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "at least one budget"));
    }

    #[test]
    fn collects_every_error() {
        let mut config = LecternConfig::default();
        config.server.host = "not a host!".to_string();
        config.server.port = 0;
        config.server.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = LecternConfig::default();
        config.server.host = "0.0.0.0".to_string();
        config.server.log_level = "debug".to_string();
        config.storage.database_path = "/tmp/lectern.db".to_string();
        config.lookup.time_budgets_secs = vec![20, 40];
        assert!(validate_config(&config).is_ok());
    }
}
