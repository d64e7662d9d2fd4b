// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RPC client over an established plugin connection.
//!
//! [`RpcClient::establish`] runs the host side of the handshake: validate
//! the plugin's version/cookie echo, negotiate the transport (multiplexed
//! preferred over the legacy lockstep fallback), and acknowledge the
//! selection. After that, [`RpcClient::call`] performs one round trip.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{ReadHalf, WriteHalf};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use vigil_core::VigilError;
use vigil_plugin_proto::{
    Handshake, HandshakeAck, PROTOCOL_VERSION, PluginFrame, Request, RequestFrame, Response,
    Transport, read_frame_async, validate_handshake, write_frame_async,
};

use crate::launch::PluginIo;

struct ClientIo {
    reader: ReadHalf<Box<dyn PluginIo>>,
    writer: WriteHalf<Box<dyn PluginIo>>,
}

/// One plugin's RPC channel.
///
/// Calls are serialized through an async mutex: the underlying connection
/// is not safe for interleaved concurrent use, and the provider contract
/// requires callers to serialize access per adapter anyway. No deadline is
/// attached to individual calls; a wedged plugin blocks its caller (known
/// limitation -- wrap calls in `tokio::time::timeout` where that matters).
pub struct RpcClient {
    transport: Transport,
    io: Mutex<ClientIo>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl RpcClient {
    /// Runs the host side of the handshake over a fresh connection.
    pub async fn establish(io: Box<dyn PluginIo>) -> Result<Self, VigilError> {
        let (mut reader, mut writer) = tokio::io::split(io);

        let handshake: Handshake =
            read_frame_async(&mut reader).await.map_err(|e| VigilError::Plugin {
                message: "reading plugin handshake".to_string(),
                source: Some(Box::new(e)),
            })?;
        validate_handshake(&handshake).map_err(|e| VigilError::Plugin {
            message: "plugin handshake rejected".to_string(),
            source: Some(Box::new(e)),
        })?;

        // Prefer the multiplexed transport; accept the plugin's legacy
        // fallback when that is all it offers.
        let transport = handshake.transport;
        if transport == Transport::Legacy {
            warn!("plugin only offers legacy transport, falling back");
        }

        write_frame_async(
            &mut writer,
            &HandshakeAck {
                version: PROTOCOL_VERSION,
                transport,
            },
        )
        .await
        .map_err(|e| VigilError::Plugin {
            message: "acknowledging plugin handshake".to_string(),
            source: Some(Box::new(e)),
        })?;

        debug!(%transport, "plugin handshake complete");

        Ok(Self {
            transport,
            io: Mutex::new(ClientIo { reader, writer }),
            next_id: AtomicU64::new(1),
        })
    }

    /// Performs one request/response round trip.
    ///
    /// Plugin framework log frames arriving on the channel are dropped
    /// here: they are noisy and redundant with the host's own logging, so
    /// the host side routes them to a discard sink.
    pub async fn call(&self, request: Request) -> Result<Response, VigilError> {
        let id = match self.transport {
            Transport::Multiplexed => self.next_id.fetch_add(1, Ordering::Relaxed),
            Transport::Legacy => 0,
        };

        let mut io = self.io.lock().await;

        write_frame_async(&mut io.writer, &RequestFrame { id, request })
            .await
            .map_err(|e| VigilError::Plugin {
                message: "sending plugin request".to_string(),
                source: Some(Box::new(e)),
            })?;

        loop {
            let frame: PluginFrame =
                read_frame_async(&mut io.reader).await.map_err(|e| VigilError::Plugin {
                    message: "reading plugin response".to_string(),
                    source: Some(Box::new(e)),
                })?;

            match frame {
                PluginFrame::Log { .. } => continue,
                PluginFrame::Response { id: got, response } => {
                    if self.transport == Transport::Multiplexed && got != id {
                        return Err(VigilError::plugin(format!(
                            "plugin response id {got} does not match request id {id}"
                        )));
                    }
                    return Ok(response);
                }
            }
        }
    }

    /// Queries the plugin's canonical name.
    pub async fn name(&self) -> Result<String, VigilError> {
        match self.call(Request::Name).await? {
            Response::Name { name } => Ok(name),
            Response::Err { message } => Err(VigilError::plugin(message)),
            other => Err(VigilError::plugin(format!(
                "unexpected response to name query: {other:?}"
            ))),
        }
    }

    /// Negotiated transport, for logging.
    pub fn transport(&self) -> Transport {
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use vigil_plugin_proto::{HANDSHAKE_COOKIE, LogLevel};

    use super::*;

    /// Runs a scripted plugin over the other end of a duplex pipe.
    async fn scripted_plugin(
        io: tokio::io::DuplexStream,
        cookie: &str,
        transport: Transport,
        responses: Vec<PluginFrame>,
    ) {
        let (mut reader, mut writer) = tokio::io::split(io);
        write_frame_async(
            &mut writer,
            &Handshake {
                version: PROTOCOL_VERSION,
                cookie: cookie.to_string(),
                transport,
            },
        )
        .await
        .unwrap();
        // The host drops the connection without acking a rejected handshake.
        let Ok(_ack) = read_frame_async::<_, HandshakeAck>(&mut reader).await else {
            return;
        };

        for frame in responses {
            let _req: RequestFrame = read_frame_async(&mut reader).await.unwrap();
            write_frame_async(&mut writer, &frame).await.unwrap();
        }
    }

    #[tokio::test]
    async fn establish_rejects_bad_cookie() {
        let (host_io, plugin_io) = tokio::io::duplex(4096);
        tokio::spawn(async move {
            scripted_plugin(plugin_io, "wrong-cookie", Transport::Multiplexed, vec![]).await;
        });

        let err = RpcClient::establish(Box::new(host_io)).await.unwrap_err();
        assert!(matches!(err, VigilError::Plugin { .. }));
    }

    #[tokio::test]
    async fn establish_negotiates_legacy_fallback() {
        let (host_io, plugin_io) = tokio::io::duplex(4096);
        tokio::spawn(async move {
            scripted_plugin(plugin_io, HANDSHAKE_COOKIE, Transport::Legacy, vec![]).await;
        });

        let client = RpcClient::establish(Box::new(host_io)).await.unwrap();
        assert_eq!(client.transport(), Transport::Legacy);
    }

    #[tokio::test]
    async fn call_discards_interleaved_log_frames() {
        let (host_io, plugin_io) = tokio::io::duplex(4096);

        tokio::spawn(async move {
            let (mut reader, mut writer) = tokio::io::split(plugin_io);
            write_frame_async(
                &mut writer,
                &Handshake {
                    version: PROTOCOL_VERSION,
                    cookie: HANDSHAKE_COOKIE.to_string(),
                    transport: Transport::Multiplexed,
                },
            )
            .await
            .unwrap();
            let _ack: HandshakeAck = read_frame_async(&mut reader).await.unwrap();

            let req: RequestFrame = read_frame_async(&mut reader).await.unwrap();
            // Chatter first, then the real answer.
            write_frame_async(
                &mut writer,
                &PluginFrame::Log {
                    level: LogLevel::Debug,
                    message: "noisy internal detail".to_string(),
                },
            )
            .await
            .unwrap();
            write_frame_async(
                &mut writer,
                &PluginFrame::Response {
                    id: req.id,
                    response: Response::Name {
                        name: "chatty".to_string(),
                    },
                },
            )
            .await
            .unwrap();
        });

        let client = RpcClient::establish(Box::new(host_io)).await.unwrap();
        assert_eq!(client.name().await.unwrap(), "chatty");
    }

    #[tokio::test]
    async fn call_rejects_mismatched_response_id() {
        let (host_io, plugin_io) = tokio::io::duplex(4096);

        tokio::spawn(async move {
            scripted_plugin(
                plugin_io,
                HANDSHAKE_COOKIE,
                Transport::Multiplexed,
                vec![PluginFrame::Response {
                    id: 999,
                    response: Response::Ok,
                }],
            )
            .await;
        });

        let client = RpcClient::establish(Box::new(host_io)).await.unwrap();
        let err = client.call(Request::Name).await.unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[tokio::test]
    async fn call_surfaces_disconnect_as_error() {
        let (host_io, plugin_io) = tokio::io::duplex(4096);
        tokio::spawn(async move {
            scripted_plugin(plugin_io, HANDSHAKE_COOKIE, Transport::Multiplexed, vec![]).await;
            // Task returns, dropping the plugin end.
        });

        let client = RpcClient::establish(Box::new(host_io)).await.unwrap();
        let err = client.call(Request::Name).await.unwrap_err();
        assert!(matches!(err, VigilError::Plugin { .. }));
    }
}
