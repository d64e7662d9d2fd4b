// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The once-daily self-update probe.
//!
//! The probe only reports; applying updates belongs to the packaging layer
//! outside this agent. It is idempotent, which is what lets the update
//! gate stay lock-free across concurrent agent instances.

use async_trait::async_trait;
use tracing::info;
use vigil_core::{UpdateProbe, VigilError};

/// Logs the running agent version for the daily update check.
pub struct ReleaseProbe;

#[async_trait]
impl UpdateProbe for ReleaseProbe {
    async fn run(&self) -> Result<(), VigilError> {
        info!(
            agent_version = env!("CARGO_PKG_VERSION"),
            "daily update check: agent version recorded"
        );
        Ok(())
    }
}
