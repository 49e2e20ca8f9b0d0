// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LM adapter configuration from the environment.

/// Connection settings for an OpenAI-compatible chat endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct LmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub temperature: f32,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.7,
        }
    }
}

fn env_first(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

impl LmConfig {
    /// Read configuration from the environment, honoring the alias chain
    /// `LLM_*` then `OPENAI_*`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let temperature = env_first(&["LLM_TEMPERATURE"])
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.temperature);
        Self {
            model: env_first(&["LLM_MODEL", "OPENAI_MODEL"]).unwrap_or(defaults.model),
            api_key: env_first(&["LLM_API_KEY", "OPENAI_API_KEY"]),
            base_url: env_first(&["LLM_BASE_URL", "OPENAI_BASE_URL", "OPENAI_API_BASE"])
                .unwrap_or(defaults.base_url),
            temperature,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
