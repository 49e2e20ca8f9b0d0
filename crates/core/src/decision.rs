// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decision results emitted by the decision engine and recorded on tasks.

use crate::types::StageType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which way the flow should move next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    BackwardCompletion,
    Stay,
    Error,
    ForceExit,
}

crate::simple_display! {
    Direction {
        Forward => "forward",
        BackwardCompletion => "backward_completion",
        Stay => "stay",
        Error => "error",
        ForceExit => "force_exit",
    }
}

/// Human-readable reasoning attached to a decision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub summary: String,
    #[serde(default)]
    pub details: Vec<String>,
}

impl Explanation {
    pub fn new(summary: impl Into<String>) -> Self {
        Self { summary: summary.into(), details: Vec::new() }
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }
}

/// The decision engine's verdict for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_stage: Option<StageType>,
    pub direction: Direction,
    #[serde(default)]
    pub explanation: Explanation,
    #[serde(default)]
    pub user_message: String,
    #[serde(default)]
    pub constraints: Map<String, Value>,
}

impl DecisionResult {
    pub fn stay(summary: impl Into<String>, user_message: impl Into<String>) -> Self {
        Self {
            next_stage: None,
            direction: Direction::Stay,
            explanation: Explanation::new(summary),
            user_message: user_message.into(),
            constraints: Map::new(),
        }
    }

    pub fn forward(stage: StageType, summary: impl Into<String>) -> Self {
        Self {
            next_stage: Some(stage),
            direction: Direction::Forward,
            explanation: Explanation::new(summary),
            user_message: "Ready to proceed.".into(),
            constraints: Map::new(),
        }
    }

    pub fn constraint(mut self, key: impl Into<String>, value: Value) -> Self {
        self.constraints.insert(key.into(), value);
        self
    }
}

/// What kind of entry landed in the decision history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRecordKind {
    Decision,
    Selection,
    EntryDecision,
    CreativeContextUpdated,
    ClarificationRequested,
}

crate::simple_display! {
    DecisionRecordKind {
        Decision => "decision",
        Selection => "selection",
        EntryDecision => "entry_decision",
        CreativeContextUpdated => "creative_context_updated",
        ClarificationRequested => "clarification_requested",
    }
}

/// Append-only audit entry on the task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub timestamp: DateTime<Utc>,
    pub kind: DecisionRecordKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<StageType>,
    #[serde(default)]
    pub detail: Value,
}

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;
