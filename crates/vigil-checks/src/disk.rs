// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mounted filesystem capacity check.

use async_trait::async_trait;
use serde::Serialize;
use sysinfo::Disks;
use vigil_core::{StatusProvider, VigilError};

/// Reports free space per mounted filesystem.
pub struct DiskProvider;

/// Auto-detect predicate: the check only makes sense where the mount table
/// is readable.
pub fn mounts_present() -> bool {
    std::path::Path::new("/proc/mounts").exists()
}

#[derive(Serialize)]
struct MountPayload {
    mount_point: String,
    total_bytes: u64,
    available_bytes: u64,
}

#[derive(Serialize)]
struct DiskPayload<'a> {
    hostname: &'a str,
    mounts: Vec<MountPayload>,
}

fn snapshot() -> Vec<MountPayload> {
    Disks::new_with_refreshed_list()
        .iter()
        .map(|disk| MountPayload {
            mount_point: disk.mount_point().display().to_string(),
            total_bytes: disk.total_space(),
            available_bytes: disk.available_space(),
        })
        .collect()
}

fn render_gib(bytes: u64) -> String {
    format!("{:.1}GiB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
}

#[async_trait]
impl StatusProvider for DiskProvider {
    fn name(&self) -> &str {
        "disk-space"
    }

    async fn collect(&self, hostname: &str) -> Result<Vec<u8>, VigilError> {
        let mounts = snapshot();
        let mut lines = vec![format!("{hostname}: {} mounted filesystems", mounts.len())];
        for mount in &mounts {
            lines.push(format!(
                "  {} {} free of {}",
                mount.mount_point,
                render_gib(mount.available_bytes),
                render_gib(mount.total_bytes)
            ));
        }
        Ok(lines.join("\n").into_bytes())
    }

    async fn collect_structured(&self, hostname: &str) -> Result<Vec<u8>, VigilError> {
        let payload = DiskPayload {
            hostname,
            mounts: snapshot(),
        };
        serde_json::to_vec(&payload).map_err(|e| VigilError::check("serializing disk payload", e))
    }
}
