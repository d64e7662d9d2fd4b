// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The uniform status-provider capability set.

use async_trait::async_trait;

use crate::error::VigilError;

/// A named source of host status, compiled-in or plugin-backed.
///
/// The registry and scheduler only ever see this trait; whether a provider
/// runs in-process or forwards to a plugin subprocess is invisible to them.
///
/// Concurrent calls into the same provider are not guaranteed to be safe;
/// callers serialize access per provider instance.
#[async_trait]
pub trait StatusProvider: Send + Sync + 'static {
    /// Canonical component name, unique within a registry.
    fn name(&self) -> &str;

    /// Collects status for `hostname` and returns pre-rendered display text.
    async fn collect(&self, hostname: &str) -> Result<Vec<u8>, VigilError>;

    /// Collects status for `hostname` and returns an opaque serialized
    /// payload whose schema is private to the provider and its consumers.
    async fn collect_structured(&self, hostname: &str) -> Result<Vec<u8>, VigilError>;
}
