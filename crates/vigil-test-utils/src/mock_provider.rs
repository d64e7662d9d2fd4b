// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock status provider for deterministic testing.

use std::sync::Mutex;

use async_trait::async_trait;
use vigil_core::{StatusProvider, VigilError};

/// A status provider returning a fixed body and recording every call.
pub struct MockProvider {
    name: String,
    body: String,
    fail: bool,
    collected_hostnames: Mutex<Vec<String>>,
}

impl MockProvider {
    /// Creates a provider that renders `body` for every hostname.
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
            fail: false,
            collected_hostnames: Mutex::new(Vec::new()),
        }
    }

    /// Creates a provider whose collect calls always fail.
    pub fn failing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: String::new(),
            fail: true,
            collected_hostnames: Mutex::new(Vec::new()),
        }
    }

    /// Hostnames passed to collect/collect_structured so far.
    pub fn collected_hostnames(&self) -> Vec<String> {
        self.collected_hostnames.lock().unwrap().clone()
    }

    fn record(&self, hostname: &str) -> Result<(), VigilError> {
        self.collected_hostnames
            .lock()
            .unwrap()
            .push(hostname.to_string());
        if self.fail {
            Err(VigilError::Check {
                message: format!("{} mock failure", self.name),
                source: None,
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StatusProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn collect(&self, hostname: &str) -> Result<Vec<u8>, VigilError> {
        self.record(hostname)?;
        Ok(self.body.clone().into_bytes())
    }

    async fn collect_structured(&self, hostname: &str) -> Result<Vec<u8>, VigilError> {
        self.record(hostname)?;
        Ok(format!("{{\"body\":{:?}}}", self.body).into_bytes())
    }
}
