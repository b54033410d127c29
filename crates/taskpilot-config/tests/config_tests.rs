// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Taskpilot configuration system.

use taskpilot_config::diagnostic::{suggest_key, ConfigError};
use taskpilot_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_taskpilot_config() {
    let toml = r#"
[agent]
name = "test-agent"
log_level = "debug"
history_window = 5

[anthropic]
api_key = "sk-ant-123"
default_model = "claude-sonnet-4-20250514"
max_tokens = 2048

[storage]
database_path = "/tmp/test.db"
wal_mode = false
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "test-agent");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.agent.history_window, 5);
    assert_eq!(config.anthropic.api_key.as_deref(), Some("sk-ant-123"));
    assert_eq!(config.anthropic.max_tokens, 2048);
    assert_eq!(config.storage.database_path, "/tmp/test.db");
    assert!(!config.storage.wal_mode);
}

/// Unknown field in the [agent] section produces an error.
#[test]
fn unknown_field_in_agent_produces_error() {
    let toml = r#"
[agent]
naem = "test"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("naem"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "taskpilot");
    assert_eq!(config.agent.log_level, "info");
    assert_eq!(config.agent.history_window, 10);
    assert!(config.anthropic.api_key.is_none());
    assert_eq!(config.anthropic.api_version, "2023-06-01");
    assert_eq!(config.storage.database_path, "taskpilot.db");
    assert!(config.storage.wal_mode);
}

/// load_and_validate_str surfaces semantic validation errors.
#[test]
fn validation_errors_surface_through_load_and_validate() {
    let toml = r#"
[agent]
history_window = 0
log_level = "loud"
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| matches!(e, ConfigError::Validation { .. })));
}

/// Typo'd keys produce a fuzzy-match suggestion.
#[test]
fn unknown_key_gets_suggestion() {
    let toml = r#"
[anthropic]
api_kye = "sk-test"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject typo");
    let has_suggestion = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { suggestion: Some(s), .. } if s == "api_key")
    });
    assert!(has_suggestion, "expected a `api_key` suggestion, got: {errors:?}");
}

/// Wrong value type produces an InvalidType diagnostic.
#[test]
fn wrong_type_produces_invalid_type_error() {
    let toml = r#"
[agent]
history_window = "lots"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject wrong type");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidType { .. })));
}

/// The suggestion helper respects its similarity threshold.
#[test]
fn suggest_key_threshold() {
    let valid = &["database_path", "wal_mode"];
    assert_eq!(
        suggest_key("database_pth", valid),
        Some("database_path".to_string())
    );
    assert_eq!(suggest_key("quux", valid), None);
}
