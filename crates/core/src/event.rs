// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event envelope and payloads, the only legitimate mutators of a task.
//!
//! Serializes as `{event_id, type, task_id, stage?, timestamp, payload, trace?}`.
//! Unknown type tags deserialize to `Unknown` and reduce to a no-op.

use crate::artifact::RevisionId;
use crate::candidate::{Candidate, GenerationContext};
use crate::conflict::Conflict;
use crate::decision::DecisionResult;
use crate::message::Message;
use crate::seed::ToolSeed;
use crate::task::{SessionId, TaskId};
use crate::types::{EntryPoint, StageStatus, StageType, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

crate::define_id! {
    /// Unique identifier for an event.
    pub struct EventId("evt-");
}

/// Trace linkage carried on every event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

/// Typed event payloads, tagged by the wire event type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum EventPayload {
    #[serde(rename = "task_created")]
    TaskCreated {
        entry_point: EntryPoint,
        #[serde(default)]
        entry_data: Map<String, Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_seed: Option<ToolSeed>,
        current_stage: StageType,
        #[serde(default)]
        completed_stages: Vec<StageType>,
        status: TaskStatus,
        stage_status: StageStatus,
        session_id: SessionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_root_id: Option<String>,
    },

    #[serde(rename = "decision_emitted")]
    DecisionEmitted { decision: DecisionResult },

    #[serde(rename = "candidates_generated")]
    CandidatesGenerated {
        revision_id: RevisionId,
        candidates: Vec<Candidate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        generation_context: Option<GenerationContext>,
    },

    #[serde(rename = "candidates_regenerated")]
    CandidatesRegenerated {
        revision_id: RevisionId,
        candidates: Vec<Candidate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        generation_context: Option<GenerationContext>,
    },

    #[serde(rename = "candidate_selected")]
    CandidateSelected { candidate_id: String },

    #[serde(rename = "feedback_recorded")]
    FeedbackRecorded { feedback: String },

    #[serde(rename = "warnings_recorded")]
    WarningsRecorded { warnings: Vec<String> },

    #[serde(rename = "conflict_detected")]
    ConflictDetected { conflict: Conflict },

    #[serde(rename = "conflict_resolved")]
    ConflictResolved { conflict_id: String, option: String },

    #[serde(rename = "message_emitted")]
    MessageEmitted { message: Message },

    #[serde(rename = "intent_updated")]
    IntentUpdated {
        intent: String,
        trigger: String,
        #[serde(default)]
        user_confirmed: bool,
    },

    #[serde(rename = "creative_context_updated")]
    CreativeContextUpdated {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        intent: Option<String>,
        #[serde(default)]
        key_constraints: Vec<String>,
        #[serde(default)]
        anchor_concepts: Vec<String>,
        #[serde(default)]
        summary: String,
    },

    #[serde(rename = "stage_finalized")]
    StageFinalized {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        next_stage: Option<StageType>,
    },

    #[serde(rename = "stage_redirected")]
    StageRedirected { current_stage: StageType },

    #[serde(rename = "cascade_resolved")]
    CascadeResolved { confirm: bool },

    #[serde(rename = "task_completed")]
    TaskCompleted {},

    #[serde(rename = "error_raised")]
    ErrorRaised { message: String },

    /// Catch-all for unknown event types (extensibility)
    #[serde(other, skip_serializing)]
    Unknown,
}

impl EventPayload {
    /// The wire name of this event type.
    pub fn kind(&self) -> &'static str {
        match self {
            EventPayload::TaskCreated { .. } => "task_created",
            EventPayload::DecisionEmitted { .. } => "decision_emitted",
            EventPayload::CandidatesGenerated { .. } => "candidates_generated",
            EventPayload::CandidatesRegenerated { .. } => "candidates_regenerated",
            EventPayload::CandidateSelected { .. } => "candidate_selected",
            EventPayload::FeedbackRecorded { .. } => "feedback_recorded",
            EventPayload::WarningsRecorded { .. } => "warnings_recorded",
            EventPayload::ConflictDetected { .. } => "conflict_detected",
            EventPayload::ConflictResolved { .. } => "conflict_resolved",
            EventPayload::MessageEmitted { .. } => "message_emitted",
            EventPayload::IntentUpdated { .. } => "intent_updated",
            EventPayload::CreativeContextUpdated { .. } => "creative_context_updated",
            EventPayload::StageFinalized { .. } => "stage_finalized",
            EventPayload::StageRedirected { .. } => "stage_redirected",
            EventPayload::CascadeResolved { .. } => "cascade_resolved",
            EventPayload::TaskCompleted {} => "task_completed",
            EventPayload::ErrorRaised { .. } => "error_raised",
            EventPayload::Unknown => "unknown",
        }
    }
}

/// The persisted and published event envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: EventId,
    pub task_id: TaskId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<StageType>,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: EventPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<TraceContext>,
}

impl Event {
    pub fn new(
        task_id: TaskId,
        stage: Option<StageType>,
        timestamp: DateTime<Utc>,
        payload: EventPayload,
    ) -> Self {
        Self { event_id: EventId::new(), task_id, stage, timestamp, payload, trace: None }
    }

    pub fn with_trace(mut self, run_id: Option<String>) -> Self {
        self.trace = Some(TraceContext { run_id });
        self
    }

    pub fn kind(&self) -> &'static str {
        self.payload.kind()
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
