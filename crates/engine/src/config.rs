// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration from the environment.

/// Default realism blocklist for scenario candidates.
pub const DEFAULT_REALISM_BLOCKLIST: &[&str] = &[
    "魔法",
    "魔幻",
    "咒语",
    "巫师",
    "穿越",
    "外星",
    "异世界",
    "超能力",
    "科幻",
    "未来世界",
    "时空旅行",
    "量子穿梭",
    "magic",
    "wizard",
    "spell",
    "time travel",
    "alien",
    "sci-fi",
    "science fiction",
    "superpower",
];

/// Tunables read once at construction.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fail task creation/actions when the LM is unconfigured.
    pub llm_required: bool,
    /// Minimum entry-classifier confidence before asking back.
    pub entry_confidence_threshold: f64,
    /// Inactivity window before a passive reminder; 0 disables.
    pub user_action_timeout_seconds: u64,
    /// Terms that disqualify a scenario candidate.
    pub realism_blocklist: Vec<String>,
    /// Candidates per generation batch.
    pub candidate_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            llm_required: true,
            entry_confidence_threshold: 0.65,
            user_action_timeout_seconds: 3600,
            realism_blocklist: DEFAULT_REALISM_BLOCKLIST.iter().map(|s| s.to_string()).collect(),
            candidate_count: 3,
        }
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let threshold = std::env::var("ENTRY_CONFIDENCE_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .map(|v| v.clamp(0.0, 1.0))
            .unwrap_or(defaults.entry_confidence_threshold);
        let timeout = std::env::var("USER_ACTION_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .map(|v| v.max(0) as u64)
            .unwrap_or(defaults.user_action_timeout_seconds);
        let blocklist = match std::env::var("SCENARIO_REALISM_BLOCKLIST") {
            Ok(value) if !value.trim().is_empty() => value
                .split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
            _ => defaults.realism_blocklist.clone(),
        };
        Self {
            llm_required: env_bool("LLM_REQUIRED", defaults.llm_required),
            entry_confidence_threshold: threshold,
            user_action_timeout_seconds: timeout,
            realism_blocklist: blocklist,
            candidate_count: defaults.candidate_count,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
