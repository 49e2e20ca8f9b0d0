// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire enumerations shared across the task engine.
//!
//! Every enum serializes as its lowercase snake_case name, which is also the
//! canonical key form for stage-keyed maps in memory and on disk.

use serde::{Deserialize, Serialize};

/// A design stage of the course co-creation flow.
///
/// `ToolSeed` is a pseudo-stage: it is only ever a dependency (satisfied at
/// task creation for tool-seed entries) and never generates candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageType {
    ToolSeed,
    Scenario,
    DrivingQuestion,
    QuestionChain,
    Activity,
    Experiment,
}

crate::simple_display! {
    StageType {
        ToolSeed => "tool_seed",
        Scenario => "scenario",
        DrivingQuestion => "driving_question",
        QuestionChain => "question_chain",
        Activity => "activity",
        Experiment => "experiment",
    }
}

impl StageType {
    /// Canonical string key, equal to the serde representation.
    pub fn key(&self) -> &'static str {
        match self {
            StageType::ToolSeed => "tool_seed",
            StageType::Scenario => "scenario",
            StageType::DrivingQuestion => "driving_question",
            StageType::QuestionChain => "question_chain",
            StageType::Activity => "activity",
            StageType::Experiment => "experiment",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "tool_seed" => Some(StageType::ToolSeed),
            "scenario" => Some(StageType::Scenario),
            "driving_question" => Some(StageType::DrivingQuestion),
            "question_chain" => Some(StageType::QuestionChain),
            "activity" => Some(StageType::Activity),
            "experiment" => Some(StageType::Experiment),
            _ => None,
        }
    }
}

/// Where a task starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPoint {
    Scenario,
    ToolSeed,
}

crate::simple_display! {
    EntryPoint {
        Scenario => "scenario",
        ToolSeed => "tool_seed",
    }
}

/// Lifecycle of a single candidate within an artifact revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    Generated,
    Frozen,
    Selected,
}

crate::simple_display! {
    CandidateStatus {
        Generated => "generated",
        Frozen => "frozen",
        Selected => "selected",
    }
}

/// Status of a stage artifact, driving the per-stage state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Initialized,
    Generating,
    PendingChoice,
    FeedbackLoop,
    Modifying,
    Finalized,
}

crate::simple_display! {
    StageStatus {
        Initialized => "initialized",
        Generating => "generating",
        PendingChoice => "pending_choice",
        FeedbackLoop => "feedback_loop",
        Modifying => "modifying",
        Finalized => "finalized",
    }
}

/// How severe a validator-detected conflict is.
///
/// `Blocking` conflicts must be resolved before the stage can finalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictSeverity {
    Info,
    Warning,
    Blocking,
}

crate::simple_display! {
    ConflictSeverity {
        Info => "info",
        Warning => "warning",
        Blocking => "blocking",
    }
}

/// User actions accepted by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    SelectCandidate,
    RegenerateCandidates,
    ProvideFeedback,
    FinalizeStage,
    ResolveConflict,
}

crate::simple_display! {
    ActionType {
        SelectCandidate => "select_candidate",
        RegenerateCandidates => "regenerate_candidates",
        ProvideFeedback => "provide_feedback",
        FinalizeStage => "finalize_stage",
        ResolveConflict => "resolve_conflict",
    }
}

/// Mode of the dialogue layer that runs alongside stage work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueState {
    Exploring,
    Generating,
    Selecting,
    ConflictResolution,
}

crate::simple_display! {
    DialogueState {
        Exploring => "exploring",
        Generating => "generating",
        Selecting => "selecting",
        ConflictResolution => "conflict_resolution",
    }
}

/// Terminal-or-not status of the whole task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    InProgress,
    Completed,
    Error,
}

crate::simple_display! {
    TaskStatus {
        InProgress => "in_progress",
        Completed => "completed",
        Error => "error",
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
