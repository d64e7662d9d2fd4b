// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The always-run version/compatibility check.

use async_trait::async_trait;
use serde::Serialize;
use vigil_core::{StatusProvider, VigilError};
use vigil_plugin_proto::PROTOCOL_VERSION;

/// Name of the component the scheduler executes unconditionally each cycle.
pub const AGENT_VERSION_COMPONENT: &str = "agent-version";

/// Reports the agent's own version and plugin protocol version.
pub struct VersionProvider;

#[derive(Serialize)]
struct VersionPayload<'a> {
    hostname: &'a str,
    agent_version: &'a str,
    plugin_protocol_version: u32,
}

#[async_trait]
impl StatusProvider for VersionProvider {
    fn name(&self) -> &str {
        AGENT_VERSION_COMPONENT
    }

    async fn collect(&self, hostname: &str) -> Result<Vec<u8>, VigilError> {
        Ok(format!(
            "{hostname}: vigil {} (plugin protocol v{PROTOCOL_VERSION})",
            env!("CARGO_PKG_VERSION")
        )
        .into_bytes())
    }

    async fn collect_structured(&self, hostname: &str) -> Result<Vec<u8>, VigilError> {
        let payload = VersionPayload {
            hostname,
            agent_version: env!("CARGO_PKG_VERSION"),
            plugin_protocol_version: PROTOCOL_VERSION,
        };
        serde_json::to_vec(&payload).map_err(|e| VigilError::check("serializing version payload", e))
    }
}
