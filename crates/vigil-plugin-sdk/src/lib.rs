// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin-side serve loop for Vigil plugin binaries.
//!
//! A plugin executable implements [`PluginProvider`] and calls [`serve`]
//! from `main`. The SDK reads the handshake environment the host set,
//! connects back to the host's loopback endpoint, completes the handshake,
//! and answers requests until EOF or shutdown.
//!
//! ```no_run
//! use vigil_plugin_sdk::{PluginProvider, serve};
//!
//! struct FooHealth;
//!
//! impl PluginProvider for FooHealth {
//!     fn name(&self) -> &str {
//!         "fooHealth"
//!     }
//!
//!     fn collect(&self, hostname: &str) -> Result<Vec<u8>, String> {
//!         Ok(format!("foo on {hostname}: OK").into_bytes())
//!     }
//!
//!     fn collect_structured(&self, _hostname: &str) -> Result<Vec<u8>, String> {
//!         Ok(br#"{"state":"ok"}"#.to_vec())
//!     }
//! }
//!
//! fn main() {
//!     if let Err(e) = serve(FooHealth) {
//!         eprintln!("fooHealth plugin: {e}");
//!         std::process::exit(1);
//!     }
//! }
//! ```

use std::net::TcpStream;

use thiserror::Error;
use vigil_plugin_proto::{
    ENV_COOKIE, ENV_ENDPOINT, ENV_PROTOCOL_VERSION, Handshake, HandshakeAck, LogLevel,
    PROTOCOL_VERSION, PluginFrame, ProtoError, Request, RequestFrame, Response, Transport,
    read_frame, write_frame,
};

/// The capability set a plugin binary implements.
///
/// Mirrors the host-side provider trait, minus async: a plugin process
/// serves one lockstep connection and blocking calls are the simplest
/// correct shape.
pub trait PluginProvider {
    /// Canonical provider name, reported to the host during registration.
    fn name(&self) -> &str;

    /// Pre-rendered, human-readable status text for `hostname`.
    fn collect(&self, hostname: &str) -> Result<Vec<u8>, String>;

    /// Opaque serialized payload for machine consumption.
    fn collect_structured(&self, hostname: &str) -> Result<Vec<u8>, String>;
}

/// Failures in the SDK serve loop.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("missing environment variable {0}; was this binary launched by a Vigil host?")]
    MissingEnv(&'static str),

    #[error("host requested protocol version {host}, this SDK speaks {sdk}")]
    VersionUnsupported { host: u32, sdk: u32 },

    #[error("protocol: {0}")]
    Proto(#[from] ProtoError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads the handshake environment and serves the provider until the host
/// disconnects or sends a shutdown request.
pub fn serve<P: PluginProvider>(provider: P) -> Result<(), SdkError> {
    let version: u32 = std::env::var(ENV_PROTOCOL_VERSION)
        .map_err(|_| SdkError::MissingEnv(ENV_PROTOCOL_VERSION))?
        .parse()
        .map_err(|_| SdkError::MissingEnv(ENV_PROTOCOL_VERSION))?;
    let cookie =
        std::env::var(ENV_COOKIE).map_err(|_| SdkError::MissingEnv(ENV_COOKIE))?;
    let endpoint =
        std::env::var(ENV_ENDPOINT).map_err(|_| SdkError::MissingEnv(ENV_ENDPOINT))?;

    if version != PROTOCOL_VERSION {
        return Err(SdkError::VersionUnsupported {
            host: version,
            sdk: PROTOCOL_VERSION,
        });
    }

    let stream = TcpStream::connect(&endpoint)?;
    serve_connection(stream, version, cookie, provider)
}

/// Serves one established connection. Split from [`serve`] so tests can
/// drive the loop over a socket pair without touching process environment.
pub fn serve_connection<P: PluginProvider>(
    stream: TcpStream,
    version: u32,
    cookie: String,
    provider: P,
) -> Result<(), SdkError> {
    let mut reader = stream.try_clone()?;
    let mut writer = stream;

    write_frame(
        &mut writer,
        &Handshake {
            version,
            cookie,
            transport: Transport::Multiplexed,
        },
    )?;

    let ack: HandshakeAck = read_frame(&mut reader)?;
    let transport = ack.transport;

    // Framework-internal chatter; the host discards it.
    write_frame(
        &mut writer,
        &PluginFrame::Log {
            level: LogLevel::Debug,
            message: format!("{} serving over {transport} transport", provider.name()),
        },
    )?;

    loop {
        let frame: RequestFrame = match read_frame(&mut reader) {
            Ok(frame) => frame,
            Err(ProtoError::Io(ref io)) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
                // Host went away; normal end of session.
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let response = match frame.request {
            Request::Name => Response::Name {
                name: provider.name().to_string(),
            },
            Request::Collect { hostname } => match provider.collect(&hostname) {
                Ok(body) => Response::Rendered { body },
                Err(message) => Response::Err { message },
            },
            Request::CollectStructured { hostname } => {
                match provider.collect_structured(&hostname) {
                    Ok(body) => Response::Structured { body },
                    Err(message) => Response::Err { message },
                }
            }
            Request::Shutdown => {
                write_frame(
                    &mut writer,
                    &PluginFrame::Response {
                        id: frame.id,
                        response: Response::Ok,
                    },
                )?;
                return Ok(());
            }
        };

        write_frame(
            &mut writer,
            &PluginFrame::Response {
                id: frame.id,
                response,
            },
        )?;
    }
}
