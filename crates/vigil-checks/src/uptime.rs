// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host uptime check.

use async_trait::async_trait;
use serde::Serialize;
use vigil_core::{StatusProvider, VigilError};

/// Reports how long the host has been up.
pub struct UptimeProvider;

#[derive(Serialize)]
struct UptimePayload<'a> {
    hostname: &'a str,
    uptime_secs: u64,
}

fn render_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[async_trait]
impl StatusProvider for UptimeProvider {
    fn name(&self) -> &str {
        "uptime"
    }

    async fn collect(&self, hostname: &str) -> Result<Vec<u8>, VigilError> {
        let secs = sysinfo::System::uptime();
        Ok(format!("{hostname}: up {}", render_uptime(secs)).into_bytes())
    }

    async fn collect_structured(&self, hostname: &str) -> Result<Vec<u8>, VigilError> {
        let payload = UptimePayload {
            hostname,
            uptime_secs: sysinfo::System::uptime(),
        };
        serde_json::to_vec(&payload).map_err(|e| VigilError::check("serializing uptime payload", e))
    }
}
