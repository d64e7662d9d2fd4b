// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in checks for the Vigil agent.
//!
//! These components are always compiled in, exercising the same registry
//! and provider surface plugin-backed checks use. Real fleets ship their
//! operational checks as plugins; the built-ins cover the agent itself.

pub mod disk;
pub mod update;
pub mod uptime;
pub mod version;

use std::sync::Arc;

use vigil_core::{ComponentDescriptor, ComponentRegistry, Platform, VigilError};

pub use disk::DiskProvider;
pub use update::ReleaseProbe;
pub use uptime::UptimeProvider;
pub use version::{AGENT_VERSION_COMPONENT, VersionProvider};

/// Registers all built-in components into the given registry.
pub fn register_builtins(registry: &ComponentRegistry) -> Result<(), VigilError> {
    registry.register_provider(Arc::new(VersionProvider), Platform::Any)?;
    registry.register_provider(Arc::new(UptimeProvider), Platform::Any)?;
    registry.register(
        ComponentDescriptor::for_provider(Arc::new(DiskProvider))
            .platform(Platform::Os("linux"))
            .auto_detect(Arc::new(disk::mounts_present)),
    )?;
    Ok(())
}
