// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The apply-action flow: dependency checks, per-action branches, and
//! auto-finalization.

use super::{ActionOutcome, ActionPayload, GenerationJob, Orchestrator};
use crate::error::OrchestratorError;
use pbl_adapters::ChildSpan;
use pbl_core::{
    can_apply_action, make_decision, missing_chain, should_force_exit, ActionType,
    CandidateStatus, DecisionResult, Direction, Event, EventPayload, Explanation, Message,
    StageType, Task,
};
use serde_json::json;

impl Orchestrator {
    /// Apply one user action to a task.
    pub async fn apply_action(
        &self,
        task_id: &str,
        action_type: ActionType,
        payload: ActionPayload,
    ) -> Result<ActionOutcome, OrchestratorError> {
        let task = self.store.get(task_id).ok_or(OrchestratorError::NotFound)?;
        let lock = self.store.write_lock(task.task_id);
        let guard = lock.lock().await;

        // Re-read under the lock; another writer may have moved the task.
        let task = self.store.get(task_id).ok_or(OrchestratorError::NotFound)?;
        let task = self.maybe_emit_timeout(task)?;
        let stage = payload.stage.unwrap_or(task.current_stage);
        self.tracer.log_child(
            task.trace_root_id.as_deref(),
            ChildSpan::new(format!("api:action:{action_type}"), "chain")
                .input("stage", json!(stage.key()))
                .meta("task_id", json!(task.task_id.to_string())),
        );

        let outcome = self.apply_action_inner(task, stage, action_type, &payload).await;
        drop(guard);

        match outcome {
            Ok((outcome, followup)) => {
                if let Some(job) = followup {
                    self.schedule_candidates(job).await?;
                }
                Ok(outcome)
            }
            Err(err) => {
                if !err.is_validation() {
                    if let Some(task) = self.store.get(task_id) {
                        self.raise_error(task, Some(stage), &err.to_string());
                    }
                }
                Err(err)
            }
        }
    }

    async fn apply_action_inner(
        &self,
        task: Task,
        stage: StageType,
        action_type: ActionType,
        payload: &ActionPayload,
    ) -> Result<(ActionOutcome, Option<GenerationJob>), OrchestratorError> {
        if let Some(artifact) = task.artifact(stage) {
            if !can_apply_action(artifact.status, action_type) {
                return Err(OrchestratorError::ActionNotAllowed);
            }
        }

        // Dependency check: cycles poison the task, gaps redirect it.
        let chain = match missing_chain(stage, task.entry_point, &task.completed_stages) {
            Ok(chain) => chain,
            Err(cycle) => {
                let decision = DecisionResult {
                    next_stage: None,
                    direction: Direction::Error,
                    explanation: Explanation::new(cycle.to_string()),
                    user_message: "Dependency cycle detected. Please review the dependency table."
                        .into(),
                    constraints: {
                        let mut map = serde_json::Map::new();
                        map.insert("error".into(), json!("dependency_cycle"));
                        map
                    },
                };
                let task = self.emit_decision(task, &decision).await?;
                let task = self.raise_error(task, Some(stage), &cycle.to_string());
                let artifact = task.artifact(stage).cloned();
                return Ok(((task, decision, artifact), None));
            }
        };
        if let Some(head) = chain.first().copied() {
            if head != stage {
                let labels: Vec<String> = chain.iter().map(|s| s.key().to_string()).collect();
                let decision = DecisionResult {
                    next_stage: Some(head),
                    direction: Direction::BackwardCompletion,
                    explanation: Explanation::new("Missing dependencies detected.")
                        .detail(format!("Missing chain: {}", labels.join(", "))),
                    user_message: "Please complete prerequisite stages first.".into(),
                    constraints: {
                        let mut map = serde_json::Map::new();
                        map.insert("missing_chain".into(), json!(labels));
                        map
                    },
                };
                let task = self.emit_decision(task, &decision).await?;
                let task = self.emit_event(
                    task.clone(),
                    Event::new(
                        task.task_id,
                        Some(head),
                        self.now(),
                        EventPayload::StageRedirected { current_stage: head },
                    ),
                )?;
                let artifact = task.artifact(head).cloned();
                return Ok(((task, decision, artifact), None));
            }
        }

        match action_type {
            ActionType::ProvideFeedback => self.handle_feedback(task, stage, payload).await,
            ActionType::RegenerateCandidates => self.handle_regenerate(task, stage, payload).await,
            ActionType::SelectCandidate => self.handle_select(task, stage, payload).await,
            ActionType::FinalizeStage => self.handle_finalize(task, stage).await,
            ActionType::ResolveConflict => self.handle_resolve_conflict(task, stage, payload).await,
        }
    }

    async fn handle_feedback(
        &self,
        task: Task,
        stage: StageType,
        payload: &ActionPayload,
    ) -> Result<(ActionOutcome, Option<GenerationJob>), OrchestratorError> {
        let feedback = payload.feedback.clone().unwrap_or_default();
        let task = self.emit_event(
            task.clone(),
            Event::new(
                task.task_id,
                Some(stage),
                self.now(),
                EventPayload::FeedbackRecorded { feedback: feedback.clone() },
            ),
        )?;

        if let Some(artifact) = task.artifact(stage) {
            if should_force_exit(artifact.iteration_count) {
                let decision = Self::force_exit_decision(stage, Some(artifact));
                let artifact = artifact.clone();
                let task = self.emit_decision(task, &decision).await?;
                return Ok(((task, decision, Some(artifact)), None));
            }
        }

        let (task, artifact) =
            self.generate_install_validate(task, stage, Some(feedback.as_str()), true).await?;
        let decision = make_decision(&task, Some(stage), Some("provide_feedback"));
        let task = self.emit_decision(task, &decision).await?;
        Ok(((task, decision, Some(artifact)), None))
    }

    async fn handle_regenerate(
        &self,
        task: Task,
        stage: StageType,
        payload: &ActionPayload,
    ) -> Result<(ActionOutcome, Option<GenerationJob>), OrchestratorError> {
        let mut task = task;
        if let Some(cascade) = payload.cascade.as_deref() {
            if task.pending_cascade.is_some() {
                let confirm = cascade.eq_ignore_ascii_case("confirm");
                task = self.emit_event(
                    task.clone(),
                    Event::new(
                        task.task_id,
                        Some(stage),
                        self.now(),
                        EventPayload::CascadeResolved { confirm },
                    ),
                )?;
            }
        }

        if let Some(artifact) = task.artifact(stage) {
            if should_force_exit(artifact.iteration_count) {
                let decision = Self::force_exit_decision(stage, Some(artifact));
                let artifact = artifact.clone();
                let task = self.emit_decision(task, &decision).await?;
                return Ok(((task, decision, Some(artifact)), None));
            }
        }

        let (task, artifact) = self
            .generate_install_validate(task, stage, payload.feedback.as_deref(), true)
            .await?;
        let decision = make_decision(&task, Some(stage), Some("regenerate_candidates"));
        let task = self.emit_decision(task, &decision).await?;
        Ok(((task, decision, Some(artifact)), None))
    }

    async fn handle_select(
        &self,
        task: Task,
        stage: StageType,
        payload: &ActionPayload,
    ) -> Result<(ActionOutcome, Option<GenerationJob>), OrchestratorError> {
        let artifact = task
            .artifact(stage)
            .ok_or_else(|| OrchestratorError::validation("No candidates to select"))?;
        let candidate_id = payload
            .candidate_id
            .clone()
            .ok_or_else(|| OrchestratorError::validation("candidate_id is required"))?;
        match artifact.candidate(&candidate_id) {
            Some(candidate) if candidate.status != CandidateStatus::Frozen => {}
            _ => return Err(OrchestratorError::validation("Candidate not selectable")),
        }

        let task = self.emit_event(
            task.clone(),
            Event::new(
                task.task_id,
                Some(stage),
                self.now(),
                EventPayload::CandidateSelected { candidate_id },
            ),
        )?;
        let task = self.run_validators(task, stage)?;

        if !Self::can_finalize(&task, stage) {
            let decision = DecisionResult {
                next_stage: Some(stage),
                direction: Direction::Stay,
                explanation: Explanation::new("Finalize conditions not met.")
                    .detail("Resolve blocking conflicts before moving on."),
                user_message: "Selection saved. Resolve blocking conflicts to proceed.".into(),
                constraints: serde_json::Map::new(),
            };
            let mut task = self.emit_decision(task, &decision).await?;
            if let Some(conflict) =
                task.stage_conflicts(stage).iter().find(|c| c.is_blocking()).cloned()
            {
                let options_text = conflict
                    .conflict_options
                    .iter()
                    .map(|opt| format!("{}:{}", opt.option, opt.title))
                    .collect::<Vec<_>>()
                    .join(" | ");
                let message = Message::assistant(
                    format!(
                        "Blocking conflict: {}. Options: {options_text}. Reply with option \
                         letter to resolve.",
                        conflict.summary
                    ),
                    Some(stage),
                    self.now(),
                )
                .kind("conflict");
                task = self.emit_event(
                    task.clone(),
                    Event::new(
                        task.task_id,
                        Some(stage),
                        self.now(),
                        EventPayload::MessageEmitted { message },
                    ),
                )?;
            }
            let artifact = task.artifact(stage).cloned();
            return Ok(((task, decision, artifact), None));
        }

        self.finalize_and_advance(task, stage, "auto_finalize_after_select").await
    }

    async fn handle_finalize(
        &self,
        task: Task,
        stage: StageType,
    ) -> Result<(ActionOutcome, Option<GenerationJob>), OrchestratorError> {
        if !Self::can_finalize(&task, stage) {
            let decision = DecisionResult {
                next_stage: Some(stage),
                direction: Direction::Stay,
                explanation: Explanation::new("Finalize conditions not met.")
                    .detail("Select a candidate and resolve blocking conflicts before finalizing."),
                user_message: "Finalize conditions not met.".into(),
                constraints: serde_json::Map::new(),
            };
            let task = self.emit_decision(task, &decision).await?;
            let artifact = task.artifact(stage).cloned();
            return Ok(((task, decision, artifact), None));
        }
        self.finalize_and_advance(task, stage, "finalize_stage").await
    }

    async fn handle_resolve_conflict(
        &self,
        task: Task,
        stage: StageType,
        payload: &ActionPayload,
    ) -> Result<(ActionOutcome, Option<GenerationJob>), OrchestratorError> {
        let conflict_id = payload
            .conflict_id
            .clone()
            .or_else(|| task.stage_conflicts(stage).last().map(|c| c.conflict_id.to_string()));
        let (Some(conflict_id), Some(option)) = (conflict_id, payload.option.clone()) else {
            return Err(OrchestratorError::validation(
                "conflict_id and option are required to resolve conflicts",
            ));
        };

        let task = self.emit_event(
            task.clone(),
            Event::new(
                task.task_id,
                Some(stage),
                self.now(),
                EventPayload::ConflictResolved { conflict_id, option },
            ),
        )?;

        if Self::can_finalize(&task, stage) {
            return self.finalize_and_advance(task, stage, "auto_finalize_after_conflict").await;
        }
        let decision = make_decision(&task, Some(stage), Some("resolve_conflict"));
        let task = self.emit_decision(task, &decision).await?;
        let artifact = task.artifact(stage).cloned();
        Ok(((task, decision, artifact), None))
    }

    /// Finalize the stage, emit the follow-up decision, and hand back a
    /// generation job for the next stage when the flow moves forward.
    async fn finalize_and_advance(
        &self,
        task: Task,
        stage: StageType,
        requested_action: &str,
    ) -> Result<(ActionOutcome, Option<GenerationJob>), OrchestratorError> {
        let (task, _next) = self.finalize_stage(task, stage)?;
        let decision = make_decision(&task, Some(task.current_stage), Some(requested_action));
        let task = self.emit_decision(task, &decision).await?;
        let mut followup = None;
        if decision.direction == Direction::Forward {
            if let Some(next_stage) = decision.next_stage {
                followup = Some(GenerationJob {
                    task_id: task.task_id,
                    stage: next_stage,
                    feedback: None,
                    count: self.config.candidate_count,
                    regenerate: false,
                });
            }
        }
        Ok(((task, decision, None), followup))
    }
}
