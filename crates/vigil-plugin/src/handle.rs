// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracked plugin process handles.

use std::path::PathBuf;

use tracing::debug;

use crate::launch::ProcessControl;

/// One loaded plugin's process, owned exclusively by the host.
///
/// Termination happens on [`Drop`], so every exit path -- including a
/// handshake or registration failure partway through loading -- releases
/// the subprocess.
pub struct PluginHandle {
    path: PathBuf,
    name: Option<String>,
    process: Box<dyn ProcessControl>,
}

impl PluginHandle {
    pub fn new(path: PathBuf, process: Box<dyn ProcessControl>) -> Self {
        Self {
            path,
            name: None,
            process,
        }
    }

    /// Records the canonical name once the remote has reported it.
    pub fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Drop for PluginHandle {
    fn drop(&mut self) {
        debug!(
            plugin = self.name.as_deref().unwrap_or("<unnamed>"),
            path = %self.path.display(),
            "terminating plugin process"
        );
        self.process.terminate();
    }
}
