// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File-timestamp throttle for the once-daily side task.
//!
//! A marker file holds one decimal Unix timestamp. A missing or unparseable
//! marker reads as "due": the gate fails open, never closed. The marker is
//! deliberately not lock-protected against other agent instances sharing
//! the path; the guarded task is idempotent, so a redundant run under a
//! race is an accepted trade-off.

use std::path::PathBuf;

use tracing::debug;
use vigil_core::VigilError;

/// Seconds in the rolling window: the side task runs at most once per 24h.
const GATE_WINDOW_SECS: i64 = 24 * 60 * 60;

/// The update gate over a marker file.
pub struct UpdateGate {
    marker_path: PathBuf,
}

impl UpdateGate {
    pub fn new(marker_path: impl Into<PathBuf>) -> Self {
        Self {
            marker_path: marker_path.into(),
        }
    }

    /// True if the side task is due now.
    pub fn is_due(&self) -> bool {
        self.is_due_at(chrono::Utc::now().timestamp())
    }

    /// True if the side task is due at `now` (epoch seconds).
    pub fn is_due_at(&self, now: i64) -> bool {
        let contents = match std::fs::read_to_string(&self.marker_path) {
            Ok(contents) => contents,
            Err(_) => {
                debug!(marker = %self.marker_path.display(), "gate marker unreadable, due");
                return true;
            }
        };
        match contents.trim().parse::<i64>() {
            Ok(last_fired) => now - last_fired >= GATE_WINDOW_SECS,
            Err(_) => {
                debug!(marker = %self.marker_path.display(), "gate marker unparseable, due");
                true
            }
        }
    }

    /// Records the current time as the last firing.
    pub fn mark_fired(&self) -> Result<(), VigilError> {
        self.mark_fired_at(chrono::Utc::now().timestamp())
    }

    /// Records `now` (epoch seconds) as the last firing.
    pub fn mark_fired_at(&self, now: i64) -> Result<(), VigilError> {
        if let Some(parent) = self.marker_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| VigilError::Io {
                context: format!("creating gate marker directory {}", parent.display()),
                source: e,
            })?;
        }
        std::fs::write(&self.marker_path, now.to_string()).map_err(|e| VigilError::Io {
            context: format!("writing gate marker {}", self.marker_path.display()),
            source: e,
        })
    }
}
