// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The component registry: an append-at-registration, read-many catalog.
//!
//! Constructed once at startup and shared by reference with the scheduler
//! and the plugin host. Registration rejects duplicate names instead of
//! silently overwriting.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::component::ComponentDescriptor;
use crate::error::VigilError;
use crate::traits::provider::StatusProvider;
use crate::types::Platform;

/// Registry of named component descriptors.
///
/// Interior locking keeps registration usable from the plugin host's
/// callback while the registry is already shared. The write lock is held
/// only for map mutation; `runnable_names` snapshots descriptors and runs
/// auto-detect predicates (which may do local I/O) with the lock released.
pub struct ComponentRegistry {
    components: RwLock<HashMap<String, ComponentDescriptor>>,
}

impl ComponentRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            components: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a descriptor.
    ///
    /// Fails with [`VigilError::DuplicateComponent`] if the name is already
    /// taken; the existing registration is left untouched.
    pub fn register(&self, descriptor: ComponentDescriptor) -> Result<(), VigilError> {
        let name = descriptor.name().to_string();
        let mut components = self
            .components
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if components.contains_key(&name) {
            return Err(VigilError::DuplicateComponent { name });
        }
        components.insert(name, descriptor);
        Ok(())
    }

    /// Registers a status provider as a schedulable component.
    ///
    /// Used for compiled-in providers and by the plugin host's registration
    /// callback alike. Callers needing an auto-detect predicate or run-as
    /// user build on [`ComponentDescriptor::for_provider`] directly.
    pub fn register_provider(
        &self,
        provider: Arc<dyn StatusProvider>,
        platform: Platform,
    ) -> Result<(), VigilError> {
        self.register(ComponentDescriptor::for_provider(provider).platform(platform))
    }

    /// Looks up a descriptor by name. Descriptors clone cheaply (all heavy
    /// fields are `Arc`).
    pub fn lookup(&self, name: &str) -> Option<ComponentDescriptor> {
        self.components
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
            .cloned()
    }

    /// Computes the names currently runnable on `current_platform`, sorted.
    ///
    /// A name is included iff its platform constraint matches and its
    /// auto-detect predicate (when present) returns true. Side-effect-free
    /// with respect to the registry; callable any number of times per cycle.
    pub fn runnable_names(&self, current_platform: &str) -> Vec<String> {
        let snapshot: Vec<ComponentDescriptor> = self
            .components
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .cloned()
            .collect();

        let mut names: Vec<String> = snapshot
            .into_iter()
            .filter(|desc| desc.eligible_on(current_platform))
            .map(|desc| desc.name().to_string())
            .collect();
        names.sort();
        names
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .components
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.components
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// True if no components are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::component::ExecuteFn;

    fn noop(name: &str) -> ComponentDescriptor {
        let execute: ExecuteFn = Arc::new(|| Box::pin(async { Ok(()) }));
        ComponentDescriptor::with_execute(name, execute)
    }

    struct FixedProvider {
        name: String,
        body: &'static str,
    }

    #[async_trait]
    impl StatusProvider for FixedProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn collect(&self, _hostname: &str) -> Result<Vec<u8>, VigilError> {
            Ok(self.body.as_bytes().to_vec())
        }

        async fn collect_structured(&self, _hostname: &str) -> Result<Vec<u8>, VigilError> {
            Ok(format!("{{\"body\":\"{}\"}}", self.body).into_bytes())
        }
    }

    #[test]
    fn register_and_lookup_roundtrip() {
        let registry = ComponentRegistry::new();
        registry.register(noop("uptime")).unwrap();

        let desc = registry.lookup("uptime").unwrap();
        assert_eq!(desc.name(), "uptime");
        assert!(registry.lookup("missing").is_none());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let registry = ComponentRegistry::new();
        registry.register(noop("uptime")).unwrap();

        let err = registry.register(noop("uptime")).unwrap_err();
        assert!(matches!(
            err,
            VigilError::DuplicateComponent { ref name } if name == "uptime"
        ));
        // The original registration survives.
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn runnable_names_filters_by_platform() {
        let registry = ComponentRegistry::new();
        registry.register(noop("everywhere")).unwrap();
        registry
            .register(noop("linux-only").platform(Platform::Os("linux")))
            .unwrap();

        assert_eq!(
            registry.runnable_names("linux"),
            vec!["everywhere", "linux-only"]
        );
        assert_eq!(registry.runnable_names("macos"), vec!["everywhere"]);
    }

    #[test]
    fn runnable_names_consults_auto_detect() {
        let registry = ComponentRegistry::new();
        registry
            .register(noop("detected").auto_detect(Arc::new(|| true)))
            .unwrap();
        registry
            .register(noop("undetected").auto_detect(Arc::new(|| false)))
            .unwrap();

        assert_eq!(registry.runnable_names("linux"), vec!["detected"]);
    }

    #[test]
    fn auto_detect_runs_on_every_call() {
        // Predicates are re-evaluated per call, not cached at registration.
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let registry = ComponentRegistry::new();
        registry
            .register(noop("probed").auto_detect(Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            })))
            .unwrap();

        registry.runnable_names("linux");
        registry.runnable_names("linux");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn scenario_alpha_beta() {
        // alpha: any platform, no auto-detect; beta: platform X with a false
        // predicate. On platform X only alpha is runnable.
        let registry = ComponentRegistry::new();
        registry.register(noop("alpha")).unwrap();
        registry
            .register(
                noop("beta")
                    .platform(Platform::Os("X"))
                    .auto_detect(Arc::new(|| false)),
            )
            .unwrap();

        assert_eq!(registry.runnable_names("X"), vec!["alpha"]);
    }

    #[tokio::test]
    async fn register_provider_exposes_capability_set() {
        let registry = ComponentRegistry::new();
        registry
            .register_provider(
                Arc::new(FixedProvider {
                    name: "fooHealth".to_string(),
                    body: "foo is healthy",
                }),
                Platform::Any,
            )
            .unwrap();

        let desc = registry.lookup("fooHealth").unwrap();
        let provider = desc.status_provider().unwrap();
        let rendered = provider.collect("host1").await.unwrap();
        assert_eq!(rendered, b"foo is healthy");

        // The synthesized entry point is also invocable.
        let entry = desc.entry_point().unwrap();
        entry(crate::types::InvocationContext {
            flags: crate::types::InvocationFlags::default(),
            hostname: "host1".to_string(),
        })
        .await
        .unwrap();
    }
}
