// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tool seed: the tool-centric entry data for tasks that do not start
//! from a pre-authored scenario.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Free-form constraint mapping. Recognized keys: `topic`, `grade`,
/// `duration`, `classroom_mode`, `classroom_context`, `knowledge_snippets`,
/// `tool_constraints`.
pub type ConstraintMap = Map<String, Value>;

/// Malformed tool seed input from a client.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid tool_seed: {0}")]
pub struct InvalidToolSeed(pub String);

/// Tool-centric entry data. Immutable after task creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolSeed {
    pub tool_name: String,
    #[serde(default)]
    pub algorithms: Vec<String>,
    #[serde(default)]
    pub affordances: Vec<String>,
    #[serde(default)]
    pub constraints: ConstraintMap,
    pub user_intent: String,
}

impl ToolSeed {
    /// Constructor-time validation: both naming fields must be present and
    /// non-empty, which is the minimum the generators can work from.
    pub fn from_value(value: &Value) -> Result<Self, InvalidToolSeed> {
        let seed: ToolSeed = serde_json::from_value(value.clone())
            .map_err(|e| InvalidToolSeed(e.to_string()))?;
        if seed.tool_name.trim().is_empty() {
            return Err(InvalidToolSeed("tool_name must be non-empty".into()));
        }
        if seed.user_intent.trim().is_empty() {
            return Err(InvalidToolSeed("user_intent must be non-empty".into()));
        }
        Ok(seed)
    }

    /// String-valued constraint lookup, empty when absent or non-string.
    pub fn constraint_str(&self, key: &str) -> String {
        match self.constraints.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    /// Topic keyword: `constraints.topic`, falling back to the user intent,
    /// then the tool name.
    pub fn topic(&self) -> String {
        let topic = self.constraint_str("topic");
        if !topic.is_empty() {
            return topic;
        }
        if !self.user_intent.is_empty() {
            return self.user_intent.clone();
        }
        self.tool_name.clone()
    }

    /// Duration in minutes, 0 when absent.
    pub fn duration_minutes(&self) -> u32 {
        match self.constraints.get("duration") {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(0) as u32,
            Some(Value::String(s)) => s.parse().unwrap_or(0),
            _ => 0,
        }
    }

    /// Flatten constraints into `key:value` strings for generation context.
    pub fn constraints_applied(&self) -> Vec<String> {
        let mut applied = Vec::new();
        for (key, value) in &self.constraints {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    for item in items {
                        applied.push(format!("{key}:{}", value_text(item)));
                    }
                }
                other => applied.push(format!("{key}:{}", value_text(other))),
            }
        }
        applied
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

crate::builder! {
    pub struct ToolSeedBuilder => ToolSeed {
        into {
            tool_name: String = "Orange",
            user_intent: String = "Teach classification",
        }
        set {
            algorithms: Vec<String> = vec!["KNN".to_string()],
            affordances: Vec<String> = vec!["classification".to_string()],
            constraints: ConstraintMap = ConstraintMap::new(),
        }
    }
}

#[cfg(test)]
#[path = "seed_tests.rs"]
mod tests;
