// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin process launching.
//!
//! The [`PluginLauncher`] seam exists so host behavior (discovery,
//! handshake, registration, teardown) is testable without real child
//! processes; production uses [`CommandLauncher`].

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::process::Command;
use vigil_core::VigilError;
use vigil_plugin_proto::{ENV_COOKIE, ENV_ENDPOINT, ENV_PROTOCOL_VERSION, HANDSHAKE_COOKIE, PROTOCOL_VERSION};

/// The bidirectional byte stream between host and plugin.
pub trait PluginIo: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> PluginIo for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// Handle to a launched plugin process, independent of how it was spawned.
pub trait ProcessControl: Send {
    /// Best-effort forceful termination. Never blocks, never escalates; a
    /// process that ignores the signal is left to the OS at host exit.
    fn terminate(&mut self);

    /// OS process id, when one exists.
    fn id(&self) -> Option<u32>;
}

impl ProcessControl for tokio::process::Child {
    fn terminate(&mut self) {
        let _ = self.start_kill();
    }

    fn id(&self) -> Option<u32> {
        tokio::process::Child::id(self)
    }
}

/// A spawned plugin candidate: its connection and its process handle.
pub struct LaunchedPlugin {
    pub io: Box<dyn PluginIo>,
    pub process: Box<dyn ProcessControl>,
}

/// Spawns one plugin candidate and produces its connection.
#[async_trait]
pub trait PluginLauncher: Send + Sync {
    async fn launch(&self, path: &Path) -> Result<LaunchedPlugin, VigilError>;
}

/// Production launcher: spawns the candidate executable with the handshake
/// environment and waits for it to connect back over loopback TCP.
///
/// The child's stdout/stderr are inherited, connecting them live to the
/// host's streams; the RPC channel is the separate loopback connection.
pub struct CommandLauncher;

#[async_trait]
impl PluginLauncher for CommandLauncher {
    async fn launch(&self, path: &Path) -> Result<LaunchedPlugin, VigilError> {
        let listener = TcpListener::bind(("127.0.0.1", 0))
            .await
            .map_err(|e| VigilError::Io {
                context: "binding plugin handshake listener".to_string(),
                source: e,
            })?;
        let endpoint = listener.local_addr().map_err(|e| VigilError::Io {
            context: "resolving plugin handshake listener address".to_string(),
            source: e,
        })?;

        // kill_on_drop: the surrounding load sequence may be cancelled by
        // its deadline while we are still waiting in accept(); the child
        // must not outlive that.
        let mut child = Command::new(path)
            .env(ENV_PROTOCOL_VERSION, PROTOCOL_VERSION.to_string())
            .env(ENV_COOKIE, HANDSHAKE_COOKIE)
            .env(ENV_ENDPOINT, endpoint.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| VigilError::Plugin {
                message: format!("failed to spawn plugin candidate {}", path.display()),
                source: Some(Box::new(e)),
            })?;

        let stream = tokio::select! {
            accepted = listener.accept() => {
                let (stream, _peer) = accepted.map_err(|e| VigilError::Io {
                    context: "accepting plugin connection".to_string(),
                    source: e,
                })?;
                stream
            }
            status = child.wait() => {
                return Err(match status {
                    Ok(status) => VigilError::plugin(format!(
                        "plugin candidate {} exited during launch ({status})",
                        path.display()
                    )),
                    Err(e) => VigilError::Plugin {
                        message: format!(
                            "plugin candidate {} failed while launching",
                            path.display()
                        ),
                        source: Some(Box::new(e)),
                    },
                });
            }
        };

        Ok(LaunchedPlugin {
            io: Box::new(stream),
            process: Box::new(child),
        })
    }
}
