// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire protocol between the Vigil plugin host and plugin binaries.
//!
//! The host passes three environment variables to a spawned plugin:
//! protocol version, handshake cookie, and the loopback endpoint to connect
//! back to. The plugin opens the connection, sends a [`Handshake`] echoing
//! version and cookie, and then serves [`Request`]s until EOF or
//! [`Request::Shutdown`]. Frames are postcard payloads behind a
//! little-endian u32 length prefix.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Version of this protocol. Bumped on any incompatible frame change.
pub const PROTOCOL_VERSION: u32 = 1;

/// Handshake cookie, a fixed constant shared between host and plugins.
///
/// Proves a subprocess was intentionally launched as a Vigil plugin and is
/// not an arbitrary binary that happened to live in the plugin directory.
pub const HANDSHAKE_COOKIE: &str = "c7f2b8d1-vigil-plugin-4e6a9035";

/// Environment variable carrying [`PROTOCOL_VERSION`] to the plugin.
pub const ENV_PROTOCOL_VERSION: &str = "VIGIL_PLUGIN_PROTOCOL_VERSION";

/// Environment variable carrying [`HANDSHAKE_COOKIE`] to the plugin.
pub const ENV_COOKIE: &str = "VIGIL_PLUGIN_COOKIE";

/// Environment variable carrying the host's loopback endpoint (`ip:port`).
pub const ENV_ENDPOINT: &str = "VIGIL_PLUGIN_ENDPOINT";

/// Upper bound on a single frame payload. Status text and structured
/// payloads are small; anything past this is a protocol violation.
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// Transport flavor negotiated at handshake time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transport {
    /// Request-id correlated frames; log frames may interleave with
    /// responses. Preferred by the host.
    Multiplexed,
    /// Lockstep single-connection fallback: one request in flight, ids
    /// ignored.
    Legacy,
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Multiplexed => write!(f, "multiplexed"),
            Transport::Legacy => write!(f, "legacy"),
        }
    }
}

/// First frame a plugin sends after connecting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Handshake {
    /// Must echo [`PROTOCOL_VERSION`] as received via the environment.
    pub version: u32,
    /// Must echo [`HANDSHAKE_COOKIE`] as received via the environment.
    pub cookie: String,
    /// The best transport the plugin supports.
    pub transport: Transport,
}

/// Host's reply to a valid handshake, fixing the transport for the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandshakeAck {
    pub version: u32,
    pub transport: Transport,
}

/// Calls the host makes into a plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Request {
    /// Canonical provider name.
    Name,
    /// Pre-rendered, human-readable status text for `hostname`.
    Collect { hostname: String },
    /// Opaque serialized payload for machine consumption, uninterpreted by
    /// the host.
    CollectStructured { hostname: String },
    /// Polite end of session; the plugin exits its serve loop.
    Shutdown,
}

/// Plugin replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Response {
    Name { name: String },
    Rendered { body: Vec<u8> },
    Structured { body: Vec<u8> },
    Err { message: String },
    Ok,
}

/// Severity tag on plugin-side diagnostic chatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Host-to-plugin frame: a request with a correlation id.
///
/// Legacy-transport sessions set `id` to zero and rely on lockstep ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestFrame {
    pub id: u64,
    pub request: Request,
}

/// Plugin-to-host frame: either a correlated response or framework-internal
/// diagnostic chatter, which the host routes to a discard sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PluginFrame {
    Response { id: u64, response: Response },
    Log { level: LogLevel, message: String },
}

/// Protocol-level failures.
#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("postcard: {0}")]
    Codec(#[from] postcard::Error),

    #[error("frame of {0} bytes exceeds limit")]
    FrameTooLarge(usize),

    #[error("protocol version mismatch: host={host}, plugin={plugin}")]
    VersionMismatch { host: u32, plugin: u32 },

    #[error("handshake cookie mismatch")]
    CookieMismatch,

    #[error("unexpected frame: {0}")]
    UnexpectedFrame(String),
}

/// Writes one length-prefixed postcard frame to a blocking writer.
pub fn write_frame<W: std::io::Write, T: Serialize>(mut w: W, msg: &T) -> Result<(), ProtoError> {
    let payload = postcard::to_stdvec(msg)?;
    if payload.len() > MAX_FRAME_BYTES {
        return Err(ProtoError::FrameTooLarge(payload.len()));
    }
    let len = payload.len() as u32;
    w.write_all(&len.to_le_bytes())?;
    w.write_all(&payload)?;
    w.flush()?;
    Ok(())
}

/// Reads one length-prefixed postcard frame from a blocking reader.
pub fn read_frame<R: std::io::Read, T: for<'de> Deserialize<'de>>(
    mut r: R,
) -> Result<T, ProtoError> {
    let mut len_bytes = [0u8; 4];
    r.read_exact(&mut len_bytes)?;
    let len = u32::from_le_bytes(len_bytes) as usize;
    if len > MAX_FRAME_BYTES {
        return Err(ProtoError::FrameTooLarge(len));
    }
    let mut payload = vec![0u8; len];
    r.read_exact(&mut payload)?;
    Ok(postcard::from_bytes(&payload)?)
}

/// Writes one frame to a tokio writer.
pub async fn write_frame_async<W, T>(w: &mut W, msg: &T) -> Result<(), ProtoError>
where
    W: AsyncWriteExt + Unpin,
    T: Serialize,
{
    let payload = postcard::to_stdvec(msg)?;
    if payload.len() > MAX_FRAME_BYTES {
        return Err(ProtoError::FrameTooLarge(payload.len()));
    }
    let len = payload.len() as u32;
    w.write_all(&len.to_le_bytes()).await?;
    w.write_all(&payload).await?;
    w.flush().await?;
    Ok(())
}

/// Reads one frame from a tokio reader.
pub async fn read_frame_async<R, T>(r: &mut R) -> Result<T, ProtoError>
where
    R: AsyncReadExt + Unpin,
    T: for<'de> Deserialize<'de>,
{
    let mut len_bytes = [0u8; 4];
    r.read_exact(&mut len_bytes).await?;
    let len = u32::from_le_bytes(len_bytes) as usize;
    if len > MAX_FRAME_BYTES {
        return Err(ProtoError::FrameTooLarge(len));
    }
    let mut payload = vec![0u8; len];
    r.read_exact(&mut payload).await?;
    Ok(postcard::from_bytes(&payload)?)
}

/// Validates a received handshake against this build's constants.
pub fn validate_handshake(handshake: &Handshake) -> Result<(), ProtoError> {
    if handshake.version != PROTOCOL_VERSION {
        return Err(ProtoError::VersionMismatch {
            host: PROTOCOL_VERSION,
            plugin: handshake.version,
        });
    }
    if handshake.cookie != HANDSHAKE_COOKIE {
        return Err(ProtoError::CookieMismatch);
    }
    Ok(())
}
