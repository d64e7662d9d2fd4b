// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Component descriptors: the unit of scheduling.
//!
//! A descriptor carries a unique name, exactly how the component is invoked
//! (an entry point taking an [`InvocationContext`], a zero-argument execute
//! function, or both), and the constraints the scheduler consults: platform
//! tag, optional run-as user, and an optional auto-detect predicate.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::VigilError;
use crate::traits::provider::StatusProvider;
use crate::types::{InvocationContext, Platform};

/// Entry point accepting a synthesized invocation context.
pub type EntryPointFn =
    Arc<dyn Fn(InvocationContext) -> BoxFuture<'static, Result<(), VigilError>> + Send + Sync>;

/// Zero-argument execute function.
///
/// Known limitation: flags cannot reach an execute function; it must infer
/// context from ambient state if it needs any.
pub type ExecuteFn = Arc<dyn Fn() -> BoxFuture<'static, Result<(), VigilError>> + Send + Sync>;

/// Auto-detect predicate deciding current eligibility.
///
/// Predicates may perform local I/O (probing config files or sockets) and
/// must not be assumed cheap; the registry runs them without holding locks.
pub type DetectFn = Arc<dyn Fn() -> bool + Send + Sync>;

/// Descriptor for one named, independently schedulable component.
///
/// Created once at process initialization and never removed. All callable
/// fields are `Arc`, so cloning a descriptor is cheap.
#[derive(Clone)]
pub struct ComponentDescriptor {
    name: String,
    entry_point: Option<EntryPointFn>,
    execute: Option<ExecuteFn>,
    platform: Platform,
    run_as_user: Option<String>,
    auto_detect: Option<DetectFn>,
    provider: Option<Arc<dyn StatusProvider>>,
}

impl ComponentDescriptor {
    /// Creates a descriptor invoked through an entry point.
    pub fn with_entry_point(name: impl Into<String>, entry_point: EntryPointFn) -> Self {
        Self {
            name: name.into(),
            entry_point: Some(entry_point),
            execute: None,
            platform: Platform::Any,
            run_as_user: None,
            auto_detect: None,
            provider: None,
        }
    }

    /// Creates a descriptor backed by a status provider.
    ///
    /// The synthesized entry point collects from the provider and logs the
    /// rendered status text under the component name. The provider itself
    /// stays reachable through [`ComponentDescriptor::status_provider`].
    pub fn for_provider(provider: Arc<dyn StatusProvider>) -> Self {
        let name = provider.name().to_string();
        let collector = provider.clone();
        let entry_point: EntryPointFn = Arc::new(move |ctx: InvocationContext| {
            let provider = collector.clone();
            Box::pin(async move {
                let body = provider.collect(&ctx.hostname).await?;
                tracing::info!(
                    component = provider.name(),
                    "{}",
                    String::from_utf8_lossy(&body).trim_end()
                );
                Ok(())
            })
        });
        Self::with_entry_point(name, entry_point).provider(provider)
    }

    /// Creates a descriptor invoked through a zero-argument execute function.
    pub fn with_execute(name: impl Into<String>, execute: ExecuteFn) -> Self {
        Self {
            name: name.into(),
            entry_point: None,
            execute: Some(execute),
            platform: Platform::Any,
            run_as_user: None,
            auto_detect: None,
            provider: None,
        }
    }

    /// Restricts the component to one platform tag.
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Requests execution under a different OS account.
    ///
    /// The value is baked in at registration time, never taken from
    /// untrusted runtime input.
    pub fn run_as(mut self, user: impl Into<String>) -> Self {
        self.run_as_user = Some(user.into());
        self
    }

    /// Attaches an eligibility predicate. Absent means always eligible.
    pub fn auto_detect(mut self, detect: DetectFn) -> Self {
        self.auto_detect = Some(detect);
        self
    }

    /// Attaches the provider backing this component, exposing the uniform
    /// capability set through registry lookups.
    pub fn provider(mut self, provider: Arc<dyn StatusProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Component name, the registry key.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry_point(&self) -> Option<&EntryPointFn> {
        self.entry_point.as_ref()
    }

    pub fn execute(&self) -> Option<&ExecuteFn> {
        self.execute.as_ref()
    }

    pub fn platform_constraint(&self) -> &Platform {
        &self.platform
    }

    pub fn run_as_user(&self) -> Option<&str> {
        self.run_as_user.as_deref()
    }

    pub fn detect(&self) -> Option<&DetectFn> {
        self.auto_detect.as_ref()
    }

    pub fn status_provider(&self) -> Option<&Arc<dyn StatusProvider>> {
        self.provider.as_ref()
    }

    /// True if the component is currently eligible: platform matches and the
    /// auto-detect predicate (when present) returns true.
    pub fn eligible_on(&self, current_platform: &str) -> bool {
        self.platform.matches(current_platform)
            && self.auto_detect.as_ref().is_none_or(|detect| detect())
    }
}

impl std::fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("name", &self.name)
            .field("entry_point", &self.entry_point.is_some())
            .field("execute", &self.execute.is_some())
            .field("platform", &self.platform)
            .field("run_as_user", &self.run_as_user)
            .field("auto_detect", &self.auto_detect.is_some())
            .field("provider", &self.provider.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_execute() -> ExecuteFn {
        Arc::new(|| Box::pin(async { Ok(()) }))
    }

    #[test]
    fn descriptor_defaults_to_any_platform() {
        let desc = ComponentDescriptor::with_execute("disk", noop_execute());
        assert_eq!(desc.name(), "disk");
        assert_eq!(*desc.platform_constraint(), Platform::Any);
        assert!(desc.run_as_user().is_none());
        assert!(desc.entry_point().is_none());
        assert!(desc.execute().is_some());
    }

    #[test]
    fn eligible_requires_platform_match() {
        let desc =
            ComponentDescriptor::with_execute("linux-only", noop_execute()).platform(Platform::Os("linux"));
        assert!(desc.eligible_on("linux"));
        assert!(!desc.eligible_on("macos"));
    }

    #[test]
    fn eligible_consults_auto_detect() {
        let desc = ComponentDescriptor::with_execute("gated", noop_execute())
            .auto_detect(Arc::new(|| false));
        assert!(!desc.eligible_on("linux"));

        let desc = ComponentDescriptor::with_execute("gated", noop_execute())
            .auto_detect(Arc::new(|| true));
        assert!(desc.eligible_on("linux"));
    }

    #[test]
    fn absent_auto_detect_behaves_as_always_true() {
        let desc = ComponentDescriptor::with_execute("plain", noop_execute());
        assert!(desc.eligible_on("linux"));
    }
}
