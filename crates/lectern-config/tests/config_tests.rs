// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Lectern configuration system.

use lectern_config::diagnostic::ConfigError;
use lectern_config::model::SessionBackend;
use lectern_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_lectern_config() {
    let toml = r#"
[server]
host = "0.0.0.0"
port = 3000
bearer_token = "idp-token"
log_level = "debug"

[storage]
database_path = "/tmp/lectern-test.db"
wal_mode = false

[session]
backend = "memory"

[lookup]
time_budgets_secs = [20, 40, 60, 90]
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.bearer_token.as_deref(), Some("idp-token"));
    assert_eq!(config.server.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/lectern-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.session.backend, SessionBackend::Memory);
    assert_eq!(config.lookup.time_budgets_secs, vec![20, 40, 60, 90]);
}

/// Empty input falls back to compiled defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults should validate");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.lookup.time_budgets_secs, vec![30, 45, 60]);
}

/// A typo in a known section yields an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_key_gets_suggestion() {
    let toml = r#"
[server]
prot = 9000
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey {
                key, suggestion, ..
            } => Some((key.clone(), suggestion.clone())),
            _ => None,
        })
        .expect("should produce an UnknownKey error");
    assert_eq!(unknown.0, "prot");
    assert_eq!(unknown.1.as_deref(), Some("port"));
}

/// Unknown top-level sections are rejected.
#[test]
fn unknown_section_is_rejected() {
    let toml = r#"
[telemetry]
enabled = true
"#;
    assert!(load_config_from_str(toml).is_err());
}

/// A wrong value type produces an InvalidType diagnostic.
#[test]
fn wrong_type_produces_invalid_type() {
    let toml = r#"
[server]
port = "eighty"
"#;
    let errors = load_and_validate_str(toml).expect_err("should reject string port");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("port"))));
}

/// Semantic validation runs after successful deserialization.
#[test]
fn validation_errors_surface_through_load() {
    let toml = r#"
[lookup]
time_budgets_secs = []
"#;
    let errors = load_and_validate_str(toml).expect_err("empty budgets are invalid");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { key, .. } if key.contains("lookup"))));
}
