// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote provider adapter.
//!
//! Wraps a plugin's RPC client behind the same [`StatusProvider`] trait
//! compiled-in checks implement; the registry and scheduler cannot tell the
//! difference.

use std::sync::Arc;

use async_trait::async_trait;
use vigil_core::{StatusProvider, VigilError};
use vigil_plugin_proto::{Request, Response};

use crate::client::RpcClient;

/// A status provider backed by a plugin subprocess.
pub struct RemoteProvider {
    name: String,
    client: Arc<RpcClient>,
}

impl RemoteProvider {
    pub fn new(name: String, client: Arc<RpcClient>) -> Self {
        Self { name, client }
    }
}

#[async_trait]
impl StatusProvider for RemoteProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn collect(&self, hostname: &str) -> Result<Vec<u8>, VigilError> {
        match self
            .client
            .call(Request::Collect {
                hostname: hostname.to_string(),
            })
            .await?
        {
            Response::Rendered { body } => Ok(body),
            Response::Err { message } => Err(VigilError::plugin(message)),
            other => Err(VigilError::plugin(format!(
                "unexpected response to collect: {other:?}"
            ))),
        }
    }

    async fn collect_structured(&self, hostname: &str) -> Result<Vec<u8>, VigilError> {
        match self
            .client
            .call(Request::CollectStructured {
                hostname: hostname.to_string(),
            })
            .await?
        {
            Response::Structured { body } => Ok(body),
            Response::Err { message } => Err(VigilError::plugin(message)),
            other => Err(VigilError::plugin(format!(
                "unexpected response to collect_structured: {other:?}"
            ))),
        }
    }
}
