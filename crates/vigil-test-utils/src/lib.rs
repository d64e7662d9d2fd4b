// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared test doubles for Vigil crates.
//!
//! `MockProvider` stands in for a compiled-in status provider;
//! `ScriptedLauncher` stands in for plugin subprocesses, running each
//! "plugin" as a tokio task on the far end of a duplex pipe so the host's
//! handshake, registration, and teardown paths run without real binaries.

pub mod mock_provider;
pub mod scripted_plugin;

pub use mock_provider::MockProvider;
pub use scripted_plugin::{PluginBehavior, ScriptedLauncher};
