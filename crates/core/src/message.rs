// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conversation messages recorded on a task.

use crate::types::{EntryPoint, StageType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of the chat entry classifier for one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDecision {
    pub chosen_entry_point: EntryPoint,
    #[serde(default)]
    pub rules_hit: Vec<String>,
    #[serde(default)]
    pub model_reason: String,
    pub confidence: f64,
}

/// One entry of the task's message transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<StageType>,
    #[serde(default = "default_kind")]
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    /// Present when this message records the entry classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_decision: Option<EntryDecision>,
}

fn default_kind() -> String {
    "assistant".to_string()
}

impl Message {
    pub fn assistant(text: impl Into<String>, stage: Option<StageType>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: "assistant".into(),
            text: text.into(),
            stage,
            kind: "assistant".into(),
            timestamp,
            entry_decision: None,
        }
    }

    pub fn system(text: impl Into<String>, stage: Option<StageType>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: "system".into(),
            text: text.into(),
            stage,
            kind: "system".into(),
            timestamp,
            entry_decision: None,
        }
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_entry_decision(mut self, decision: EntryDecision) -> Self {
        self.entry_decision = Some(decision);
        self
    }
}
