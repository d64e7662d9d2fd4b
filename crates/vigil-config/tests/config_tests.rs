// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Vigil configuration system.

use vigil_config::{ConfigError, load_and_validate_str, load_config_from_str};

#[test]
fn valid_toml_deserializes_into_vigil_config() {
    let toml = r#"
[agent]
name = "edge-agent"
log_level = "debug"
hostname = "edge-01.example.net"

[scheduler]
interval_secs = 30
update_marker_path = "/tmp/vigil-update-stamp"

[plugins]
dir = "/opt/vigil/plugins"
handshake_timeout_secs = 5
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "edge-agent");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.agent.hostname.as_deref(), Some("edge-01.example.net"));
    assert_eq!(config.scheduler.interval_secs, 30);
    assert_eq!(config.scheduler.update_marker_path, "/tmp/vigil-update-stamp");
    assert_eq!(config.plugins.dir, "/opt/vigil/plugins");
    assert_eq!(config.plugins.handshake_timeout_secs, 5);
}

#[test]
fn empty_toml_yields_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config.agent.name, "vigil");
    assert_eq!(config.scheduler.interval_secs, 60);
}

#[test]
fn unknown_field_is_rejected() {
    let toml = r#"
[scheduler]
intervl_secs = 30
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("intervl_secs"),
        "error should mention the unknown field, got: {err_str}"
    );
}

#[test]
fn unknown_field_gets_typo_suggestion() {
    let toml = r#"
[scheduler]
intervl_secs = 30
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce diagnostics");
    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey { key, suggestion, .. } => Some((key, suggestion)),
            _ => None,
        })
        .expect("should contain an UnknownKey diagnostic");
    assert_eq!(unknown.0, "intervl_secs");
    assert_eq!(unknown.1.as_deref(), Some("interval_secs"));
}

#[test]
fn wrong_type_is_rejected() {
    let toml = r#"
[scheduler]
interval_secs = "soon"
"#;

    assert!(load_and_validate_str(toml).is_err());
}

#[test]
fn semantic_validation_runs_after_deserialization() {
    let toml = r#"
[scheduler]
interval_secs = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero interval should fail validation");
    assert!(
        errors
            .iter()
            .any(|e| e.to_string().contains("interval_secs")),
        "expected an interval_secs validation error"
    );
}
