// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Candidate: a single alternative produced by a stage generator.

use crate::types::CandidateStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Provenance of one generation batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationContext {
    #[serde(default)]
    pub based_on: Vec<String>,
    #[serde(default)]
    pub constraints_applied: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// One alternative surfaced to the user.
///
/// The id is positional within the artifact revision ("A", "B", "C", …).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    pub status: CandidateStatus,
    /// Stage-keyed content, e.g. `{"scenario": "..."}` or
    /// `{"question_chain": ["...", "...", "..."]}`.
    #[serde(default)]
    pub content: Map<String, Value>,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub derived_from: Vec<String>,
    #[serde(default)]
    pub alignment_score: f64,
    #[serde(default)]
    pub generation_context: GenerationContext,
}

impl Candidate {
    /// Copy with status forced to `Frozen` unless already `Selected`.
    pub fn frozen(&self) -> Self {
        let status = if self.status == CandidateStatus::Selected {
            CandidateStatus::Selected
        } else {
            CandidateStatus::Frozen
        };
        Self { status, ..self.clone() }
    }

    /// Copy with the given status.
    pub fn with_status(&self, status: CandidateStatus) -> Self {
        Self { status, ..self.clone() }
    }

    /// Extract the primary text of this candidate for the given stage key.
    ///
    /// Lists join with spaces; non-string scalars render as JSON; when the
    /// stage key is absent the whole content map renders as JSON.
    pub fn content_text(&self, stage_key: &str) -> String {
        match self.content.get(stage_key) {
            Some(value) => value_to_text(value),
            None => {
                if self.content.is_empty() {
                    String::new()
                } else {
                    Value::Object(self.content.clone()).to_string()
                }
            }
        }
    }

    /// The sub-question list when this candidate carries one.
    pub fn question_chain(&self) -> Vec<String> {
        match self.content.get("question_chain") {
            Some(Value::Array(items)) => items.iter().map(value_to_text).collect(),
            _ => Vec::new(),
        }
    }

    /// Positional id for the nth emitted candidate: "A", "B", "C", …
    pub fn position_id(index: usize) -> String {
        let c = (b'A' + (index % 26) as u8) as char;
        c.to_string()
    }
}

/// Render any JSON value as plain text (lists joined by spaces).
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}

crate::builder! {
    pub struct CandidateBuilder => Candidate {
        into {
            id: String = "A",
            title: String = "Test candidate",
            rationale: String = "",
        }
        set {
            status: CandidateStatus = CandidateStatus::Generated,
            content: Map<String, Value> = Map::new(),
            derived_from: Vec<String> = Vec::new(),
            alignment_score: f64 = 0.0,
            generation_context: GenerationContext = GenerationContext::default(),
        }
    }
}

#[cfg(test)]
#[path = "candidate_tests.rs"]
mod tests;
