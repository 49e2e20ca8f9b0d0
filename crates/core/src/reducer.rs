// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure reducer: `(task, event) → task`.
//!
//! # Idempotency Requirement
//!
//! **All event handlers MUST be idempotent.** Applying the same event twice
//! must produce the same state as applying it once: events are applied once
//! for immediate visibility and again during log replay.
//!
//! Guidelines:
//! - Use assignment instead of accumulation, except where a guard makes the
//!   accumulation single-shot (revision_id check for `iteration_count`).
//! - Guard inserts with existence checks (conflict ids, completed stages).
//! - Every timestamp written here comes from `event.timestamp`, never the
//!   wall clock, so replay reproduces snapshots exactly.

use crate::artifact::{RevisionSnapshot, StageArtifact};
use crate::creative::IntentRevision;
use crate::decision::{DecisionRecord, DecisionRecordKind};
use crate::deps::STAGE_SEQUENCE;
use crate::event::{Event, EventPayload};
use crate::task::{PendingCascade, Task};
use crate::types::{CandidateStatus, DialogueState, StageStatus, StageType, TaskStatus};
use serde_json::{json, Value};

fn ensure_artifact(task: &mut Task, stage: StageType) -> &mut StageArtifact {
    task.artifacts.entry(stage).or_insert_with(|| StageArtifact::new(stage))
}

/// Apply one event to a task, returning the updated task.
pub fn apply_event(mut task: Task, event: &Event) -> Task {
    task.updated_at = event.timestamp;

    match &event.payload {
        EventPayload::TaskCreated {
            entry_point,
            entry_data,
            tool_seed,
            current_stage,
            completed_stages,
            status,
            stage_status,
            session_id,
            trace_root_id,
        } => {
            task.entry_point = *entry_point;
            task.entry_data = entry_data.clone();
            task.tool_seed = tool_seed.clone();
            task.current_stage = *current_stage;
            task.completed_stages = completed_stages.clone();
            task.status = *status;
            task.stage_status = *stage_status;
            task.session_id = *session_id;
            task.trace_root_id = trace_root_id.clone();
            task.created_at = event.timestamp;
        }

        EventPayload::DecisionEmitted { decision } => {
            task.last_decision = Some(decision.clone());
            task.decision_history.push(DecisionRecord {
                timestamp: event.timestamp,
                kind: DecisionRecordKind::Decision,
                stage: event.stage,
                detail: serde_json::to_value(decision).unwrap_or(Value::Null),
            });
        }

        EventPayload::CandidatesGenerated { revision_id, candidates, generation_context }
        | EventPayload::CandidatesRegenerated { revision_id, candidates, generation_context } => {
            let Some(stage) = event.stage else { return task };
            let regenerate =
                matches!(event.payload, EventPayload::CandidatesRegenerated { .. });

            // Idempotent replay: same revision already installed.
            if task.artifacts.get(&stage).is_some_and(|a| a.revision_id == *revision_id) {
                return task;
            }

            let was_finalized = task
                .artifacts
                .get(&stage)
                .is_some_and(|a| a.status == StageStatus::Finalized);
            if was_finalized {
                task.completed_stages.retain(|s| *s != stage);
                let downstream: Vec<StageType> = STAGE_SEQUENCE
                    .iter()
                    .skip_while(|s| **s != stage)
                    .skip(1)
                    .filter(|s| task.completed_stages.contains(s))
                    .copied()
                    .collect();
                if !downstream.is_empty() {
                    task.pending_cascade = Some(PendingCascade {
                        from_stage: stage,
                        stages: downstream,
                        proposed_at: event.timestamp,
                    });
                }
                if task.status == TaskStatus::Completed {
                    task.status = TaskStatus::InProgress;
                }
            }

            let timestamp = event.timestamp;
            let reason = if regenerate { "candidates_regenerated" } else { "candidates_generated" };
            let artifact = ensure_artifact(&mut task, stage);
            if !artifact.candidates.is_empty() {
                let snapshot = RevisionSnapshot {
                    revision_id: Some(artifact.revision_id),
                    candidates: artifact.frozen_candidates(),
                    timestamp,
                    reason: reason.to_string(),
                    feedback: None,
                };
                artifact.history.push(snapshot);
            }
            artifact.revision_id = *revision_id;
            artifact.candidates = candidates.clone();
            artifact.generation_context = generation_context
                .clone()
                .or_else(|| candidates.first().map(|c| c.generation_context.clone()));
            artifact.selected_candidate_id = None;
            artifact.warnings.clear();
            artifact.status = StageStatus::PendingChoice;
            if regenerate {
                artifact.iteration_count += 1;
            }
            task.conflicts.insert(stage, Vec::new());
            task.stage_status = StageStatus::PendingChoice;
            task.dialogue_state = DialogueState::Selecting;
        }

        EventPayload::CandidateSelected { candidate_id } => {
            let Some(stage) = event.stage else { return task };
            let artifact = ensure_artifact(&mut task, stage);
            artifact.selected_candidate_id = Some(candidate_id.clone());
            let mut focus = candidate_id.clone();
            let updated: Vec<_> = artifact
                .candidates
                .iter()
                .map(|cand| {
                    if cand.id == *candidate_id {
                        if !cand.title.is_empty() {
                            focus = cand.title.clone();
                        }
                        cand.with_status(CandidateStatus::Selected)
                    } else {
                        cand.with_status(CandidateStatus::Frozen)
                    }
                })
                .collect();
            artifact.candidates = updated;
            task.stage_status =
                task.artifacts.get(&stage).map(|a| a.status).unwrap_or(task.stage_status);
            task.conflicts.insert(stage, Vec::new());
            task.working_memory.focus = focus;
            task.decision_history.push(DecisionRecord {
                timestamp: event.timestamp,
                kind: DecisionRecordKind::Selection,
                stage: Some(stage),
                detail: json!({ "candidate_id": candidate_id }),
            });
        }

        EventPayload::FeedbackRecorded { feedback } => {
            let Some(stage) = event.stage else { return task };
            let timestamp = event.timestamp;
            let artifact = ensure_artifact(&mut task, stage);
            artifact.status = StageStatus::FeedbackLoop;
            artifact.history.push(RevisionSnapshot {
                revision_id: None,
                candidates: Vec::new(),
                timestamp,
                reason: "feedback".to_string(),
                feedback: Some(feedback.clone()),
            });
            task.stage_status = StageStatus::FeedbackLoop;
            task.dialogue_state = DialogueState::Generating;
        }

        EventPayload::WarningsRecorded { warnings } => {
            let Some(stage) = event.stage else { return task };
            let artifact = ensure_artifact(&mut task, stage);
            for warning in warnings {
                if !artifact.warnings.contains(warning) {
                    artifact.warnings.push(warning.clone());
                }
            }
        }

        EventPayload::ConflictDetected { conflict } => {
            let stage = event.stage.unwrap_or(conflict.stage);
            let entries = task.conflicts.entry(stage).or_default();
            if !entries.iter().any(|c| c.conflict_id == conflict.conflict_id) {
                entries.push(conflict.clone());
            }
        }

        EventPayload::ConflictResolved { conflict_id, option } => {
            let Some(stage) = event.stage else { return task };
            if let Some(entries) = task.conflicts.get_mut(&stage) {
                for conflict in entries.iter_mut() {
                    if conflict.conflict_id == conflict_id.as_str() {
                        *conflict = conflict.resolve(option.clone());
                    }
                }
            }
        }

        EventPayload::MessageEmitted { message } => {
            if let Some(decision) = &message.entry_decision {
                task.decision_history.push(DecisionRecord {
                    timestamp: event.timestamp,
                    kind: DecisionRecordKind::EntryDecision,
                    stage: event.stage,
                    detail: serde_json::to_value(decision).unwrap_or(Value::Null),
                });
            }
            if message.kind == "clarification" {
                task.decision_history.push(DecisionRecord {
                    timestamp: event.timestamp,
                    kind: DecisionRecordKind::ClarificationRequested,
                    stage: event.stage,
                    detail: json!({ "question": message.text }),
                });
            }
            task.messages.push(message.clone());
        }

        EventPayload::IntentUpdated { intent, trigger, user_confirmed } => {
            task.creative_context.intent_evolution.push(IntentRevision {
                timestamp: event.timestamp,
                trigger: trigger.clone(),
                before: task.creative_context.original_intent.clone(),
                after: intent.clone(),
                user_confirmed: *user_confirmed,
            });
            task.creative_context.original_intent = intent.clone();
        }

        EventPayload::CreativeContextUpdated { intent, key_constraints, anchor_concepts, summary } => {
            if let Some(intent) = intent {
                if !intent.is_empty() && *intent != task.creative_context.original_intent {
                    task.creative_context.intent_evolution.push(IntentRevision {
                        timestamp: event.timestamp,
                        trigger: "dialogue".to_string(),
                        before: task.creative_context.original_intent.clone(),
                        after: intent.clone(),
                        user_confirmed: false,
                    });
                    task.creative_context.original_intent = intent.clone();
                }
            }
            task.creative_context.merge_constraints(key_constraints);
            task.creative_context.merge_anchors(anchor_concepts);
            if !summary.is_empty() {
                task.working_memory.push_note(summary.clone());
            }
            task.working_memory.truncate();
            task.decision_history.push(DecisionRecord {
                timestamp: event.timestamp,
                kind: DecisionRecordKind::CreativeContextUpdated,
                stage: event.stage,
                detail: json!({ "summary": summary }),
            });
        }

        EventPayload::StageFinalized { next_stage } => {
            let Some(stage) = event.stage else { return task };
            let artifact = ensure_artifact(&mut task, stage);
            artifact.status = StageStatus::Finalized;
            task.stage_status = StageStatus::Finalized;
            if !task.completed_stages.contains(&stage) {
                task.completed_stages.push(stage);
            }
            if let Some(next) = next_stage {
                task.current_stage = *next;
            }
        }

        EventPayload::StageRedirected { current_stage } => {
            task.current_stage = *current_stage;
            task.stage_status = StageStatus::Initialized;
        }

        EventPayload::CascadeResolved { confirm } => {
            if let Some(cascade) = task.pending_cascade.take() {
                if *confirm {
                    task.completed_stages.retain(|s| !cascade.stages.contains(s));
                }
            }
        }

        EventPayload::TaskCompleted {} => {
            task.status = TaskStatus::Completed;
        }

        EventPayload::ErrorRaised { .. } => {
            task.status = TaskStatus::Error;
        }

        EventPayload::Unknown => {}
    }

    task
}

/// Replay an ordered event log from an empty task shell.
pub fn replay<'a>(task_id: crate::task::TaskId, events: impl IntoIterator<Item = &'a Event>) -> Task {
    let mut task = Task::seed(task_id);
    for event in events {
        task = apply_event(task, event);
    }
    task
}

#[cfg(test)]
#[path = "reducer_tests.rs"]
mod tests;
