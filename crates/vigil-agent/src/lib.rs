// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduling and dispatch for the Vigil monitoring agent.
//!
//! The [`Scheduler`] drives cycles over the component registry: consult the
//! [`UpdateGate`], run the designated always-run component, compute the
//! runnable subset, and hand each descriptor to the [`Dispatcher`]
//! sequentially. Component failures are isolated at the dispatch boundary;
//! the cycle, and the agent, keep going.

pub mod dispatcher;
pub mod scheduler;
pub mod shutdown;
pub mod update_gate;

pub use dispatcher::{Dispatcher, ExecutionStrategy};
pub use scheduler::{Scheduler, SchedulerMode, SchedulerOptions};
pub use shutdown::install_signal_handler;
pub use update_gate::UpdateGate;
