// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Out-of-process plugin host.
//!
//! The [`PluginHost`] scans a directory for plugin executables and runs each
//! candidate through a load sequence: spawn with the handshake environment,
//! accept the connection back, validate the version/cookie handshake,
//! negotiate a transport, query the canonical name, wrap the remote in a
//! [`StatusProvider`](vigil_core::StatusProvider) adapter, and hand it to a
//! registration callback supplied at construction. A failure anywhere in
//! the sequence terminates that candidate's process and skips only that
//! candidate.

pub mod adapter;
pub mod client;
pub mod handle;
pub mod host;
pub mod launch;

pub use adapter::RemoteProvider;
pub use client::RpcClient;
pub use handle::PluginHandle;
pub use host::{PluginHost, ProviderRegistrar};
pub use launch::{CommandLauncher, LaunchedPlugin, PluginIo, PluginLauncher, ProcessControl};
