// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core types for the Vigil monitoring agent.
//!
//! This crate defines the vocabulary shared by every other Vigil crate:
//! the [`VigilError`] error type, the [`ComponentDescriptor`] describing a
//! single schedulable health check, the [`ComponentRegistry`] catalog, and
//! the [`StatusProvider`] trait implemented by both compiled-in checks and
//! plugin-backed remotes.

pub mod component;
pub mod error;
pub mod registry;
pub mod traits;
pub mod types;

pub use component::{ComponentDescriptor, DetectFn, EntryPointFn, ExecuteFn};
pub use error::VigilError;
pub use registry::ComponentRegistry;
pub use traits::provider::StatusProvider;
pub use traits::update::UpdateProbe;
pub use types::{InvocationContext, InvocationFlags, Platform};
