// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Language-model client seam.

mod config;
mod openai;
#[cfg(any(test, feature = "test-support"))]
mod scripted;

pub use config::LmConfig;
pub use openai::OpenAiClient;
#[cfg(any(test, feature = "test-support"))]
pub use scripted::ScriptedLm;

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by the LM seam.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LmError {
    /// Credentials or endpoint are not configured.
    #[error("LM configuration missing: {0}")]
    ConfigurationMissing(String),
    /// The call reached the adapter but failed.
    #[error("LM invocation failed: {0}")]
    Invocation(String),
}

/// One completion request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LmRequest {
    pub prompt: String,
    pub system: Option<String>,
    pub temperature: Option<f32>,
}

impl LmRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self { prompt: prompt.into(), system: None, temperature: None }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// An opaque completion backend.
#[async_trait]
pub trait LmClient: Send + Sync {
    /// Run one completion and return the raw text.
    async fn complete(&self, request: LmRequest) -> Result<String, LmError>;

    /// Whether credentials are present. Callers that require an LM check
    /// this before doing any work.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Placeholder client used when the environment carries no credentials.
///
/// Every call fails with [`LmError::ConfigurationMissing`]; callers that
/// merely tolerate a missing LM check [`LmClient::is_configured`] first.
#[derive(Debug, Default, Clone)]
pub struct UnconfiguredLm;

#[async_trait]
impl LmClient for UnconfiguredLm {
    async fn complete(&self, _request: LmRequest) -> Result<String, LmError> {
        Err(LmError::ConfigurationMissing("no API key configured".into()))
    }

    fn is_configured(&self) -> bool {
        false
    }
}
