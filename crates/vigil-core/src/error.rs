// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Vigil monitoring agent.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type used across all Vigil crates.
#[derive(Debug, Error)]
pub enum VigilError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// A component with this name is already registered.
    #[error("duplicate component registration: {name}")]
    DuplicateComponent { name: String },

    /// The named component does not exist in the registry.
    #[error("component not found: {name}")]
    ComponentNotFound { name: String },

    /// A check failed while executing (in-process or re-exec'd).
    #[error("check error: {message}")]
    Check {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Plugin launch, handshake, or remote-call errors.
    #[error("plugin error: {message}")]
    Plugin {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The plugin directory exists but could not be scanned.
    #[error("cannot read plugin directory {path}: {source}")]
    PluginDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Filesystem errors with operational context (update gate marker, exe resolution).
    #[error("{context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VigilError {
    /// Shorthand for a check failure wrapping another error.
    pub fn check(message: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        VigilError::Check {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Shorthand for a plugin failure with no underlying source.
    pub fn plugin(message: impl Into<String>) -> Self {
        VigilError::Plugin {
            message: message.into(),
            source: None,
        }
    }
}
