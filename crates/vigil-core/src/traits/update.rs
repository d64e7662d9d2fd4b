// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The once-daily side task guarded by the update gate.

use async_trait::async_trait;

use crate::error::VigilError;

/// The task the scheduler runs at most once per rolling 24h window.
///
/// Implementations must be idempotent: the gate is deliberately not
/// lock-protected against multiple agent instances sharing a marker path,
/// so redundant execution under a race is accepted.
#[async_trait]
pub trait UpdateProbe: Send + Sync {
    /// Runs the self-update check.
    async fn run(&self) -> Result<(), VigilError>;
}
