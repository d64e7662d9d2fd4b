// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as positive intervals and recognized log levels.

use crate::diagnostic::ConfigError;
use crate::model::VigilConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects all validation errors rather than failing fast.
pub fn validate_config(config: &VigilConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.agent.name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "agent.name must not be empty".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level `{}` is not one of: {}",
                config.agent.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.scheduler.interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "scheduler.interval_secs must be at least 1".to_string(),
        });
    }

    if config.scheduler.update_marker_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "scheduler.update_marker_path must not be empty".to_string(),
        });
    }

    if config.plugins.dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "plugins.dir must not be empty".to_string(),
        });
    }

    if config.plugins.handshake_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "plugins.handshake_timeout_secs must be at least 1".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&VigilConfig::default()).is_ok());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = VigilConfig::default();
        config.scheduler.interval_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("interval_secs"));
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let mut config = VigilConfig::default();
        config.agent.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("log_level"));
    }

    #[test]
    fn multiple_failures_all_collected() {
        let mut config = VigilConfig::default();
        config.agent.name = " ".to_string();
        config.scheduler.interval_secs = 0;
        config.plugins.handshake_timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
