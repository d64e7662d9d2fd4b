// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Vigil monitoring agent.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Vigil configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VigilConfig {
    /// Agent identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Scheduling loop settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Out-of-process plugin settings.
    #[serde(default)]
    pub plugins: PluginConfig,
}

/// Agent identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Hostname reported to status providers. Defaults to the system
    /// hostname when unset.
    #[serde(default)]
    pub hostname: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            hostname: None,
        }
    }
}

fn default_agent_name() -> String {
    "vigil".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Scheduling loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Seconds between cycles in continuous mode.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Marker file holding the update gate's last-fired Unix timestamp.
    #[serde(default = "default_update_marker_path")]
    pub update_marker_path: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            update_marker_path: default_update_marker_path(),
        }
    }
}

fn default_interval_secs() -> u64 {
    60
}

fn default_update_marker_path() -> String {
    "/var/lib/vigil/last-update-check".to_string()
}

/// Out-of-process plugin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginConfig {
    /// Directory scanned (non-recursively) for plugin executables.
    /// A missing directory means zero plugins, not an error.
    #[serde(default = "default_plugin_dir")]
    pub dir: String,

    /// Seconds allowed for a plugin to connect back and complete its
    /// handshake after launch.
    #[serde(default = "default_handshake_timeout_secs")]
    pub handshake_timeout_secs: u64,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            dir: default_plugin_dir(),
            handshake_timeout_secs: default_handshake_timeout_secs(),
        }
    }
}

fn default_plugin_dir() -> String {
    "/usr/lib/vigil/plugins".to_string()
}

fn default_handshake_timeout_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = VigilConfig::default();
        assert_eq!(config.agent.name, "vigil");
        assert_eq!(config.agent.log_level, "info");
        assert_eq!(config.scheduler.interval_secs, 60);
        assert_eq!(config.plugins.handshake_timeout_secs, 10);
        assert!(config.agent.hostname.is_none());
    }
}
