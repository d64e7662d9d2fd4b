// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vigil component` command implementation.
//!
//! Executes exactly one registered component in-process and exits with its
//! outcome. The dispatcher re-execs this subcommand under the target user
//! for privilege-separated components, so execution here never recurses
//! into another re-exec.

use tracing::info;
use vigil_agent::Dispatcher;
use vigil_config::VigilConfig;
use vigil_core::{ComponentRegistry, InvocationFlags, VigilError};

use crate::run::resolve_hostname;

/// Runs the `vigil component <name>` command.
pub async fn run_component(
    config: VigilConfig,
    name: &str,
    flags: InvocationFlags,
) -> Result<(), VigilError> {
    let registry = ComponentRegistry::new();
    vigil_checks::register_builtins(&registry)?;

    let descriptor = registry
        .lookup(name)
        .ok_or_else(|| VigilError::ComponentNotFound {
            name: name.to_string(),
        })?;

    info!(component = name, "executing single component");

    // Forced in-process: this process is already the re-exec target.
    let dispatcher = Dispatcher::with_capabilities(resolve_hostname(&config), false, None);
    dispatcher.execute(&descriptor, flags).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_component_is_an_error() {
        let err = run_component(
            VigilConfig::default(),
            "no-such-check",
            InvocationFlags::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, VigilError::ComponentNotFound { .. }));
    }

    #[tokio::test]
    async fn built_in_component_executes() {
        run_component(
            VigilConfig::default(),
            "agent-version",
            InvocationFlags::default(),
        )
        .await
        .unwrap();
    }
}
