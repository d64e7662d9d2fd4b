// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vigil run` command implementation.
//!
//! Wires the full agent: registry with built-in components, plugin host
//! discovery over the configured directory, and the scheduler in the
//! requested mode. Plugin teardown runs after the scheduler returns,
//! whether it stopped on its own or on a shutdown signal.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use vigil_agent::{Dispatcher, Scheduler, SchedulerMode, SchedulerOptions, UpdateGate, shutdown};
use vigil_checks::{AGENT_VERSION_COMPONENT, ReleaseProbe};
use vigil_config::VigilConfig;
use vigil_core::{ComponentRegistry, InvocationFlags, Platform, VigilError};
use vigil_plugin::{PluginHost, ProviderRegistrar};

/// Runs the `vigil run` command.
pub async fn run_agent(
    config: VigilConfig,
    mode: SchedulerMode,
    flags: InvocationFlags,
) -> Result<(), VigilError> {
    info!(agent_name = config.agent.name.as_str(), "starting vigil");

    let hostname = resolve_hostname(&config);
    let registry = Arc::new(ComponentRegistry::new());
    vigil_checks::register_builtins(&registry)?;
    info!(count = registry.len(), "built-in components registered");

    let registrar: ProviderRegistrar = {
        let registry = registry.clone();
        Arc::new(move |provider| registry.register_provider(provider, Platform::Any))
    };
    let host = PluginHost::new(
        &config.plugins.dir,
        Duration::from_secs(config.plugins.handshake_timeout_secs),
        registrar,
    );
    let loaded = host.discover().await?;
    info!(count = loaded, "plugin discovery complete");

    let scheduler = Scheduler::new(
        registry,
        Dispatcher::new(hostname),
        UpdateGate::new(&config.scheduler.update_marker_path),
        Arc::new(ReleaseProbe),
        SchedulerOptions {
            interval: Duration::from_secs(config.scheduler.interval_secs),
            always_run: AGENT_VERSION_COMPONENT.to_string(),
            platform: std::env::consts::OS.to_string(),
            flags,
        },
    );

    let cancel = shutdown::install_signal_handler();
    let result = scheduler.run(mode, cancel).await;

    host.teardown();
    info!("vigil stopped");
    result
}

/// Hostname reported to status providers: config override first, then the
/// system hostname.
pub(crate) fn resolve_hostname(config: &VigilConfig) -> String {
    config
        .agent
        .hostname
        .clone()
        .or_else(sysinfo::System::host_name)
        .unwrap_or_else(|| "localhost".to_string())
}

/// Initializes the tracing subscriber from the configured log level,
/// overridable via `RUST_LOG`.
pub(crate) fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vigil={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_override_wins() {
        let mut config = VigilConfig::default();
        config.agent.hostname = Some("edge-01.example.net".to_string());
        assert_eq!(resolve_hostname(&config), "edge-01.example.net");
    }

    #[test]
    fn hostname_falls_back_to_system_or_localhost() {
        let config = VigilConfig::default();
        let hostname = resolve_hostname(&config);
        assert!(!hostname.is_empty());
    }
}
