// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-descriptor execution strategies.
//!
//! The dispatcher selects one of a closed set of strategies for each
//! descriptor and runs it. Whatever a component raises is caught at this
//! boundary, logged with the component name, and converted into a
//! non-fatal outcome; nothing a component does can terminate the scheduler.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};
use vigil_core::{ComponentDescriptor, InvocationContext, InvocationFlags, VigilError};

/// How one descriptor will be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Re-exec this agent under another OS account via `sudo`, naming the
    /// target user and component and propagating the flag whitelist.
    PrivilegeSeparated { user: String },
    /// Call the entry point with a synthesized invocation context.
    ContextCall,
    /// Call the zero-argument execute function. Flags cannot reach it.
    PlainCall,
}

/// Executes component descriptors.
pub struct Dispatcher {
    hostname: String,
    /// Whether the current platform supports privilege separation.
    privilege_separation: bool,
    /// This agent's own executable path, resolved once at construction.
    self_exe: Option<PathBuf>,
}

impl Dispatcher {
    /// Creates a dispatcher with the real platform capabilities.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self::with_capabilities(hostname, cfg!(unix), std::env::current_exe().ok())
    }

    /// Creates a dispatcher with explicit capabilities. Test seam, and the
    /// re-exec'd child uses it to force in-process execution.
    pub fn with_capabilities(
        hostname: impl Into<String>,
        privilege_separation: bool,
        self_exe: Option<PathBuf>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            privilege_separation,
            self_exe,
        }
    }

    /// Selects the execution strategy for a descriptor.
    ///
    /// Privilege separation requires a run-as user, platform support, and a
    /// resolved self-executable path; otherwise execution falls back
    /// in-process and the skip is logged.
    pub fn strategy_for(&self, descriptor: &ComponentDescriptor) -> ExecutionStrategy {
        if let Some(user) = descriptor.run_as_user() {
            if self.privilege_separation && self.self_exe.is_some() {
                return ExecutionStrategy::PrivilegeSeparated {
                    user: user.to_string(),
                };
            }
            warn!(
                component = descriptor.name(),
                user,
                "privilege separation unavailable, executing in-process"
            );
        }
        if descriptor.entry_point().is_some() {
            ExecutionStrategy::ContextCall
        } else {
            ExecutionStrategy::PlainCall
        }
    }

    /// Executes a descriptor, absorbing any failure.
    pub async fn dispatch(&self, descriptor: &ComponentDescriptor, flags: InvocationFlags) {
        debug!(component = descriptor.name(), "dispatching component");
        match self.execute(descriptor, flags).await {
            Ok(()) => debug!(component = descriptor.name(), "component completed"),
            Err(e) => warn!(
                component = descriptor.name(),
                error = %e,
                "component failed"
            ),
        }
    }

    /// Executes a descriptor under its selected strategy.
    pub async fn execute(
        &self,
        descriptor: &ComponentDescriptor,
        flags: InvocationFlags,
    ) -> Result<(), VigilError> {
        match self.strategy_for(descriptor) {
            ExecutionStrategy::PrivilegeSeparated { user } => {
                self.run_separated(descriptor, &user, flags).await
            }
            ExecutionStrategy::ContextCall => {
                let entry = descriptor.entry_point().ok_or_else(|| {
                    VigilError::Internal(format!(
                        "context-call strategy selected for {} without an entry point",
                        descriptor.name()
                    ))
                })?;
                entry(InvocationContext {
                    flags,
                    hostname: self.hostname.clone(),
                })
                .await
            }
            ExecutionStrategy::PlainCall => {
                let execute = descriptor.execute().ok_or_else(|| {
                    VigilError::Internal(format!(
                        "descriptor {} has no callable",
                        descriptor.name()
                    ))
                })?;
                execute().await
            }
        }
    }

    async fn run_separated(
        &self,
        descriptor: &ComponentDescriptor,
        user: &str,
        flags: InvocationFlags,
    ) -> Result<(), VigilError> {
        let exe = self.self_exe.as_deref().ok_or_else(|| {
            VigilError::Internal("privilege separation selected without a self-exe path".to_string())
        })?;

        let argv = separation_argv(exe, user, descriptor.name(), flags);
        let Some((program, args)) = argv.split_first() else {
            return Err(VigilError::Internal("empty re-exec argv".to_string()));
        };

        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| VigilError::Check {
                message: format!("spawning re-exec for {} as {user}", descriptor.name()),
                source: Some(Box::new(e)),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(VigilError::Check {
                message: format!(
                    "re-exec of {} as {user} exited with {status}",
                    descriptor.name()
                ),
                source: None,
            })
        }
    }
}

/// Builds the re-exec argument vector: privilege-elevation program, target
/// user, our own executable, the component subcommand, and the explicit
/// flag whitelist. The parent's original argv is never forwarded.
fn separation_argv(self_exe: &Path, user: &str, component: &str, flags: InvocationFlags) -> Vec<OsString> {
    let mut argv: Vec<OsString> = vec![
        "sudo".into(),
        "-u".into(),
        user.into(),
        self_exe.as_os_str().to_os_string(),
        "component".into(),
        component.into(),
    ];
    if flags.skip_lockfile {
        argv.push("--skip-lockfile".into());
    }
    argv
}
