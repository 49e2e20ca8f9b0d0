// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task: the event-sourced aggregate owning all per-stage state.

use crate::artifact::StageArtifact;
use crate::candidate::Candidate;
use crate::conflict::Conflict;
use crate::creative::{CreativeContext, WorkingMemory};
use crate::decision::{DecisionRecord, DecisionResult};
use crate::message::Message;
use crate::seed::ToolSeed;
use crate::types::{DialogueState, EntryPoint, StageStatus, StageType, TaskStatus};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

crate::define_id! {
    /// Unique identifier for a task.
    pub struct TaskId("tsk-");
}

crate::define_id! {
    /// Unique identifier for a chat session.
    pub struct SessionId("ses-");
}

/// Deferred proposal to regenerate downstream stages after an upstream
/// change; the user confirms or skips it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCascade {
    pub from_stage: StageType,
    pub stages: Vec<StageType>,
    pub proposed_at: DateTime<Utc>,
}

/// The task aggregate.
///
/// A task exclusively owns its artifacts, conflicts, messages, and history;
/// the reducer is the only legitimate mutator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: TaskId,
    pub session_id: SessionId,
    pub entry_point: EntryPoint,
    #[serde(default)]
    pub entry_data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_seed: Option<ToolSeed>,
    pub current_stage: StageType,
    #[serde(default)]
    pub completed_stages: Vec<StageType>,
    #[serde(default)]
    pub artifacts: IndexMap<StageType, StageArtifact>,
    pub status: TaskStatus,
    pub stage_status: StageStatus,
    #[serde(default)]
    pub conflicts: IndexMap<StageType, Vec<Conflict>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_decision: Option<DecisionResult>,
    #[serde(default)]
    pub decision_history: Vec<DecisionRecord>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub creative_context: CreativeContext,
    pub dialogue_state: DialogueState,
    #[serde(default)]
    pub working_memory: WorkingMemory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_root_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_cascade: Option<PendingCascade>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Empty shell a `task_created` event folds its payload into.
    ///
    /// Also the starting point for replaying an event log from scratch.
    pub fn seed(task_id: TaskId) -> Self {
        Self {
            task_id,
            session_id: SessionId::from_string(""),
            entry_point: EntryPoint::Scenario,
            entry_data: Map::new(),
            tool_seed: None,
            current_stage: StageType::Scenario,
            completed_stages: Vec::new(),
            artifacts: IndexMap::new(),
            status: TaskStatus::InProgress,
            stage_status: StageStatus::Initialized,
            conflicts: IndexMap::new(),
            last_decision: None,
            decision_history: Vec::new(),
            messages: Vec::new(),
            creative_context: CreativeContext::default(),
            dialogue_state: DialogueState::Exploring,
            working_memory: WorkingMemory::default(),
            trace_root_id: None,
            pending_cascade: None,
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }

    pub fn artifact(&self, stage: StageType) -> Option<&StageArtifact> {
        self.artifacts.get(&stage)
    }

    /// The selected candidate of a stage, if any.
    pub fn selected_candidate(&self, stage: StageType) -> Option<&Candidate> {
        self.artifact(stage)?.selected_candidate()
    }

    pub fn stage_conflicts(&self, stage: StageType) -> &[Conflict] {
        self.conflicts.get(&stage).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_unresolved_blocking(&self, stage: StageType) -> bool {
        self.stage_conflicts(stage).iter().any(Conflict::is_blocking)
    }

    pub fn is_completed(&self, stage: StageType) -> bool {
        self.completed_stages.contains(&stage)
    }

    /// The selected question chain: from the question_chain stage, falling
    /// back to the chain carried by the driving question.
    pub fn selected_question_chain(&self) -> Vec<String> {
        if let Some(cand) = self.selected_candidate(StageType::QuestionChain) {
            let chain = cand.question_chain();
            if !chain.is_empty() {
                return chain;
            }
        }
        if let Some(cand) = self.selected_candidate(StageType::DrivingQuestion) {
            return cand.question_chain();
        }
        Vec::new()
    }
}

crate::builder! {
    pub struct TaskBuilder => Task {
        set {
            entry_point: EntryPoint = EntryPoint::Scenario,
            entry_data: Map<String, Value> = Map::new(),
            current_stage: StageType = StageType::Scenario,
            completed_stages: Vec<StageType> = Vec::new(),
            artifacts: IndexMap<StageType, StageArtifact> = IndexMap::new(),
            status: TaskStatus = TaskStatus::InProgress,
            stage_status: StageStatus = StageStatus::Initialized,
            conflicts: IndexMap<StageType, Vec<Conflict>> = IndexMap::new(),
            decision_history: Vec<DecisionRecord> = Vec::new(),
            messages: Vec<Message> = Vec::new(),
            creative_context: CreativeContext = CreativeContext::default(),
            dialogue_state: DialogueState = DialogueState::Exploring,
            working_memory: WorkingMemory = WorkingMemory::default(),
        }
        option {
            tool_seed: ToolSeed = None,
            last_decision: DecisionResult = None,
            trace_root_id: String = None,
            pending_cascade: PendingCascade = None,
        }
        computed {
            task_id: TaskId = TaskId::new(),
            session_id: SessionId = SessionId::new(),
            created_at: DateTime<Utc> = DateTime::UNIX_EPOCH,
            updated_at: DateTime<Utc> = DateTime::UNIX_EPOCH,
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
