// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The plugin host: discovery, loading, and teardown.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info, warn};
use vigil_core::{StatusProvider, VigilError};

use crate::adapter::RemoteProvider;
use crate::client::RpcClient;
use crate::handle::PluginHandle;
use crate::launch::{CommandLauncher, LaunchedPlugin, PluginLauncher};

/// Callback through which loaded plugins enter the registry.
///
/// Supplied by the registry owner at host construction; the host never
/// depends on the registry type directly.
pub type ProviderRegistrar =
    Arc<dyn Fn(Arc<dyn StatusProvider>) -> Result<(), VigilError> + Send + Sync>;

/// Discovers, loads, and tracks out-of-process plugins.
///
/// The tracked handle list is the one piece of state touched from two call
/// paths at once -- discovery appending, teardown draining -- so it sits
/// behind a mutex held only around the list mutation itself, never around
/// a launch or handshake.
pub struct PluginHost {
    plugin_dir: PathBuf,
    handshake_timeout: Duration,
    registrar: ProviderRegistrar,
    launcher: Box<dyn PluginLauncher>,
    handles: Mutex<Vec<PluginHandle>>,
}

impl PluginHost {
    /// Creates a host that spawns real plugin processes.
    ///
    /// The registration callback is a required constructor argument: a host
    /// without one is a configuration error, not a silent no-op.
    pub fn new(
        plugin_dir: impl Into<PathBuf>,
        handshake_timeout: Duration,
        registrar: ProviderRegistrar,
    ) -> Self {
        Self::with_launcher(plugin_dir, handshake_timeout, registrar, Box::new(CommandLauncher))
    }

    /// Creates a host with a custom launcher. Test seam.
    pub fn with_launcher(
        plugin_dir: impl Into<PathBuf>,
        handshake_timeout: Duration,
        registrar: ProviderRegistrar,
        launcher: Box<dyn PluginLauncher>,
    ) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
            handshake_timeout,
            registrar,
            launcher,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Scans the plugin directory and loads every candidate.
    ///
    /// A missing directory means zero plugins and is not an error; any
    /// other directory-read failure aborts the pass. Per-candidate failures
    /// are logged and skipped, so one broken plugin never affects the
    /// others, and scan order cannot change which of the remaining
    /// candidates register. Returns the number of plugins loaded.
    pub async fn discover(&self) -> Result<usize, VigilError> {
        let mut dir = match tokio::fs::read_dir(&self.plugin_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %self.plugin_dir.display(), "plugin directory absent, zero plugins");
                return Ok(0);
            }
            Err(e) => {
                return Err(VigilError::PluginDirectory {
                    path: self.plugin_dir.clone(),
                    source: e,
                });
            }
        };

        let mut candidates = Vec::new();
        loop {
            let entry = match dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    return Err(VigilError::PluginDirectory {
                        path: self.plugin_dir.clone(),
                        source: e,
                    });
                }
            };
            let file_type = entry.file_type().await.map_err(|e| VigilError::PluginDirectory {
                path: self.plugin_dir.clone(),
                source: e,
            })?;
            // Any non-directory entry is a candidate.
            if !file_type.is_dir() {
                candidates.push(entry.path());
            }
        }
        candidates.sort();

        let mut loaded = 0;
        for path in &candidates {
            match tokio::time::timeout(self.handshake_timeout, self.load_candidate(path)).await {
                Ok(Ok(name)) => {
                    info!(plugin = name.as_str(), path = %path.display(), "plugin registered");
                    loaded += 1;
                }
                Ok(Err(e)) => {
                    warn!(path = %path.display(), error = %e, "skipping plugin candidate");
                }
                Err(_) => {
                    warn!(
                        path = %path.display(),
                        timeout_secs = self.handshake_timeout.as_secs(),
                        "plugin did not complete its handshake in time, skipping"
                    );
                }
            }
        }

        Ok(loaded)
    }

    /// Runs one candidate through launch, handshake, name query, and
    /// registration. The [`PluginHandle`] created right after launch owns
    /// the subprocess, so an error on any subsequent step terminates it.
    async fn load_candidate(&self, path: &Path) -> Result<String, VigilError> {
        let LaunchedPlugin { io, process } = self.launcher.launch(path).await?;
        let mut handle = PluginHandle::new(path.to_path_buf(), process);

        let client = Arc::new(RpcClient::establish(io).await?);

        let name = match client.name().await {
            Ok(name) => name,
            Err(e) => {
                let fallback = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
                    .ok_or_else(|| {
                        VigilError::plugin(format!(
                            "plugin {} has no usable file name",
                            path.display()
                        ))
                    })?;
                debug!(
                    error = %e,
                    fallback = fallback.as_str(),
                    "plugin name query failed, using file name"
                );
                fallback
            }
        };

        let adapter: Arc<dyn StatusProvider> =
            Arc::new(RemoteProvider::new(name.clone(), client));
        (self.registrar)(adapter)?;

        handle.set_name(name.clone());
        self.handles
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(handle);

        Ok(name)
    }

    /// Terminates every tracked plugin process, best-effort.
    ///
    /// Handles are drained under the lock and dropped outside it; a handle
    /// that ignores the signal is not escalated further.
    pub fn teardown(&self) {
        let drained: Vec<PluginHandle> = {
            let mut handles = self
                .handles
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            std::mem::take(&mut *handles)
        };
        let count = drained.len();
        drop(drained);
        if count > 0 {
            info!(count, "plugin teardown complete");
        }
    }

    /// Number of currently tracked plugin handles.
    pub fn tracked(&self) -> usize {
        self.handles
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl Drop for PluginHost {
    fn drop(&mut self) {
        self.teardown();
    }
}
