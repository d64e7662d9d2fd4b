// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted plugin launcher: in-memory plugin processes for host tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use vigil_core::VigilError;
use vigil_plugin::{LaunchedPlugin, PluginLauncher, ProcessControl};
use vigil_plugin_proto::{
    HANDSHAKE_COOKIE, Handshake, HandshakeAck, PROTOCOL_VERSION, PluginFrame, Request,
    RequestFrame, Response, Transport, read_frame_async, write_frame_async,
};

/// What the fake plugin on the far end of the pipe does.
#[derive(Clone)]
pub enum PluginBehavior {
    /// Completes the handshake and serves requests under this name.
    Good { name: &'static str },
    /// Sends a handshake with the wrong cookie.
    BadCookie,
    /// Sends a handshake claiming an incompatible protocol version.
    WrongVersion,
    /// Connects but never sends anything.
    Silent,
    /// Completes the handshake but answers the name query with an error.
    NameQueryFails,
}

struct MockProcess {
    terminated: Arc<AtomicBool>,
}

impl ProcessControl for MockProcess {
    fn terminate(&mut self) {
        self.terminated.store(true, Ordering::SeqCst);
    }

    fn id(&self) -> Option<u32> {
        None
    }
}

struct Inner {
    behaviors: HashMap<String, PluginBehavior>,
    termination_flags: Mutex<HashMap<String, Arc<AtomicBool>>>,
}

/// Launcher returning in-memory pipes instead of spawning processes.
///
/// Clones share state, so a test can keep one clone to inspect termination
/// flags after handing another to the host.
#[derive(Clone)]
pub struct ScriptedLauncher {
    inner: Arc<Inner>,
}

impl ScriptedLauncher {
    pub fn new(behaviors: &[(&str, PluginBehavior)]) -> Self {
        Self {
            inner: Arc::new(Inner {
                behaviors: behaviors
                    .iter()
                    .map(|(name, b)| (name.to_string(), b.clone()))
                    .collect(),
                termination_flags: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// True if the plugin launched for `file_name` has been terminated.
    pub fn terminated(&self, file_name: &str) -> bool {
        self.inner
            .termination_flags
            .lock()
            .unwrap()
            .get(file_name)
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(false)
    }
}

#[async_trait]
impl PluginLauncher for ScriptedLauncher {
    async fn launch(&self, path: &Path) -> Result<LaunchedPlugin, VigilError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let behavior = self
            .inner
            .behaviors
            .get(&file_name)
            .cloned()
            .ok_or_else(|| VigilError::plugin(format!("no scripted behavior for {file_name}")))?;

        let (host_io, plugin_io) = tokio::io::duplex(4096);
        tokio::spawn(run_fake_plugin(plugin_io, behavior));

        let terminated = Arc::new(AtomicBool::new(false));
        self.inner
            .termination_flags
            .lock()
            .unwrap()
            .insert(file_name, terminated.clone());

        Ok(LaunchedPlugin {
            io: Box::new(host_io),
            process: Box::new(MockProcess { terminated }),
        })
    }
}

async fn run_fake_plugin(io: tokio::io::DuplexStream, behavior: PluginBehavior) {
    let (mut reader, mut writer) = tokio::io::split(io);

    let (version, cookie, serves) = match &behavior {
        PluginBehavior::Good { .. } | PluginBehavior::NameQueryFails => {
            (PROTOCOL_VERSION, HANDSHAKE_COOKIE, true)
        }
        PluginBehavior::BadCookie => (PROTOCOL_VERSION, "not-the-cookie", false),
        PluginBehavior::WrongVersion => (PROTOCOL_VERSION + 1, HANDSHAKE_COOKIE, false),
        PluginBehavior::Silent => {
            // Hold the pipe open without speaking until the host gives up.
            let mut sink = Vec::new();
            use tokio::io::AsyncReadExt;
            let _ = reader.read_to_end(&mut sink).await;
            return;
        }
    };

    if write_frame_async(
        &mut writer,
        &Handshake {
            version,
            cookie: cookie.to_string(),
            transport: Transport::Multiplexed,
        },
    )
    .await
    .is_err()
    {
        return;
    }

    // The host drops the connection without acking a rejected handshake.
    let Ok(_ack) = read_frame_async::<_, HandshakeAck>(&mut reader).await else {
        return;
    };

    if !serves {
        return;
    }

    loop {
        let Ok(frame) = read_frame_async::<_, RequestFrame>(&mut reader).await else {
            return;
        };
        let response = match (&behavior, frame.request) {
            (PluginBehavior::NameQueryFails, Request::Name) => Response::Err {
                message: "name lookup exploded".to_string(),
            },
            (PluginBehavior::Good { name }, Request::Name) => Response::Name {
                name: name.to_string(),
            },
            (_, Request::Collect { hostname }) => Response::Rendered {
                body: format!("status for {hostname}: OK").into_bytes(),
            },
            (_, Request::CollectStructured { hostname }) => Response::Structured {
                body: format!("{{\"host\":\"{hostname}\",\"state\":\"ok\"}}").into_bytes(),
            },
            (_, Request::Shutdown) => Response::Ok,
            (_, Request::Name) => Response::Err {
                message: "unnamed".to_string(),
            },
        };
        if write_frame_async(
            &mut writer,
            &PluginFrame::Response {
                id: frame.id,
                response,
            },
        )
        .await
        .is_err()
        {
            return;
        }
    }
}
