// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OpenAI-compatible chat-completions client.

use super::{LmClient, LmConfig, LmError, LmRequest};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// HTTP client for any `/chat/completions`-shaped endpoint.
pub struct OpenAiClient {
    http: reqwest::Client,
    config: LmConfig,
}

impl OpenAiClient {
    pub fn new(config: LmConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { http, config }
    }

    /// Client configured from the environment alias chain.
    pub fn from_env() -> Self {
        Self::new(LmConfig::from_env())
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LmClient for OpenAiClient {
    async fn complete(&self, request: LmRequest) -> Result<String, LmError> {
        let Some(api_key) = self.config.api_key.as_deref().filter(|k| !k.trim().is_empty())
        else {
            return Err(LmError::ConfigurationMissing("no API key configured".into()));
        };

        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": request.prompt }));

        let body = json!({
            "model": self.config.model,
            "temperature": request.temperature.unwrap_or(self.config.temperature),
            "messages": messages,
        });

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LmError::Invocation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LmError::Invocation(format!("{status}: {detail}")));
        }

        let parsed: ChatResponse =
            response.json().await.map_err(|e| LmError::Invocation(e.to_string()))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(LmError::Invocation("empty completion".into()));
        }
        Ok(content)
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }
}
