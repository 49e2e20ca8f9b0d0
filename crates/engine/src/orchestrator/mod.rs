// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The task orchestrator: applies user actions, drives candidate
//! generation, runs validators, and emits every mutation as an event.

mod actions;
mod create;
mod dialogue;
mod generation;

pub use generation::{GenerationJob, GenerationMode};

use crate::bus::EventBus;
use crate::config::EngineConfig;
use crate::error::OrchestratorError;
use crate::generators::{GeneratorSet, PromptLibrary};
use crate::messenger::DecisionMessenger;
use crate::validators::{validate_activity_alignment, validate_non_empty, ValidationResult};
use pbl_adapters::{ChildSpan, LmClient, TraceManager};
use pbl_core::{
    Candidate, Clock, DecisionResult, Direction, EntryPoint, Event, EventPayload, Explanation,
    Message, StageArtifact, StageStatus, StageType, Task, MAX_ITERATIONS,
};
use pbl_storage::{JsonPersistence, TaskStore};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Everything the orchestrator needs at construction.
pub struct OrchestratorDeps {
    pub store: Arc<TaskStore>,
    pub persistence: Arc<JsonPersistence>,
    pub bus: Arc<EventBus>,
    pub lm: Arc<dyn LmClient>,
    pub clock: Arc<dyn Clock>,
    pub tracer: Arc<TraceManager>,
    pub config: EngineConfig,
}

/// Recognized action payload keys.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ActionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<StageType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict_id: Option<String>,
    /// "confirm" or "skip" for a pending downstream cascade.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cascade: Option<String>,
}

/// Result triple of the public entry points.
pub type ActionOutcome = (Task, DecisionResult, Option<StageArtifact>);

pub struct Orchestrator {
    store: Arc<TaskStore>,
    persistence: Arc<JsonPersistence>,
    bus: Arc<EventBus>,
    lm: Arc<dyn LmClient>,
    clock: Arc<dyn Clock>,
    tracer: Arc<TraceManager>,
    config: EngineConfig,
    generators: GeneratorSet,
    messenger: DecisionMessenger,
    generation_tx: parking_lot::Mutex<Option<mpsc::Sender<GenerationJob>>>,
}

impl Orchestrator {
    /// Orchestrator with the five standard generators.
    pub fn new(deps: OrchestratorDeps) -> Arc<Self> {
        let prompts = Arc::new(PromptLibrary::default());
        let generators = GeneratorSet::standard(
            Arc::clone(&deps.lm),
            Arc::clone(&prompts),
            Arc::new(deps.config.realism_blocklist.clone()),
            Arc::clone(&deps.clock),
        );
        Self::with_generators(deps, generators, prompts)
    }

    /// Orchestrator with an injected generator map (tests, custom stages).
    pub fn with_generators(
        deps: OrchestratorDeps,
        generators: GeneratorSet,
        prompts: Arc<PromptLibrary>,
    ) -> Arc<Self> {
        let messenger = DecisionMessenger::new(Arc::clone(&deps.lm), prompts);
        Arc::new(Self {
            store: deps.store,
            persistence: deps.persistence,
            bus: deps.bus,
            lm: deps.lm,
            clock: deps.clock,
            tracer: deps.tracer,
            config: deps.config,
            generators,
            messenger,
            generation_tx: parking_lot::Mutex::new(None),
        })
    }

    pub fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn lm(&self) -> &Arc<dyn LmClient> {
        &self.lm
    }

    /// Fetch a task snapshot.
    pub fn get_task(&self, task_id: &str) -> Result<Task, OrchestratorError> {
        self.store.get(task_id).ok_or(OrchestratorError::NotFound)
    }

    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now_utc()
    }

    /// Apply, persist, and publish one event. The single mutation funnel.
    pub(crate) fn emit_event(
        &self,
        task: Task,
        mut event: Event,
    ) -> Result<Task, OrchestratorError> {
        if event.trace.is_none() {
            let run_id = match &event.payload {
                EventPayload::TaskCreated { trace_root_id, .. } => trace_root_id.clone(),
                _ => task.trace_root_id.clone(),
            };
            event = event.with_trace(run_id);
        }
        let task = pbl_core::apply_event(task, &event);
        self.store.save(task.clone());
        self.persistence.save_snapshot(&task)?;
        self.persistence.append_event(&event)?;
        self.bus.publish(&event);
        match &event.payload {
            EventPayload::TaskCompleted {} => {
                self.tracer.end_root(task.trace_root_id.as_deref(), "completed");
            }
            EventPayload::ErrorRaised { .. } => {
                self.tracer.end_root(task.trace_root_id.as_deref(), "error");
            }
            _ => {}
        }
        tracing::info!(
            task_id = %task.task_id,
            event = event.kind(),
            stage = event.stage.map(|s| s.key()).unwrap_or(""),
            "applied event"
        );
        Ok(task)
    }

    /// Emit a decision plus its assistant message.
    pub(crate) async fn emit_decision(
        &self,
        task: Task,
        decision: &DecisionResult,
    ) -> Result<Task, OrchestratorError> {
        self.tracer.log_child(
            task.trace_root_id.as_deref(),
            ChildSpan::new(format!("decision:{}", task.current_stage.key()), "chain")
                .input("stage", json!(task.current_stage.key()))
                .output("direction", json!(decision.direction.to_string()))
                .output(
                    "next_stage",
                    json!(decision.next_stage.map(|s| s.key())),
                ),
        );
        let stage = task.current_stage;
        let event = Event::new(
            task.task_id,
            Some(stage),
            self.now(),
            EventPayload::DecisionEmitted { decision: decision.clone() },
        );
        let task = self.emit_event(task, event)?;
        let text = self.messenger.build_message(&task, decision).await;
        let message = Message::assistant(text, Some(stage), self.now()).kind("decision");
        self.emit_event(
            task.clone(),
            Event::new(
                task.task_id,
                Some(stage),
                self.now(),
                EventPayload::MessageEmitted { message },
            ),
        )
    }

    /// Inactivity reminder: a passive message when the task sat in
    /// `pending_choice`/`feedback_loop` past the timeout.
    pub(crate) fn maybe_emit_timeout(&self, task: Task) -> Result<Task, OrchestratorError> {
        let timeout = self.config.user_action_timeout_seconds;
        if timeout == 0 {
            return Ok(task);
        }
        if !matches!(task.stage_status, StageStatus::PendingChoice | StageStatus::FeedbackLoop) {
            return Ok(task);
        }
        let age = self.now().signed_duration_since(task.updated_at).num_seconds();
        if age < timeout as i64 {
            return Ok(task);
        }
        let message = Message::system(
            "No selection for a while. You can resume by selecting a candidate or regenerating.",
            Some(task.current_stage),
            self.now(),
        );
        self.emit_event(
            task.clone(),
            Event::new(
                task.task_id,
                Some(task.current_stage),
                self.now(),
                EventPayload::MessageEmitted { message },
            ),
        )
    }

    /// Candidate with the highest alignment score (first wins ties).
    pub(crate) fn recommend_candidate(artifact: Option<&StageArtifact>) -> Option<&Candidate> {
        let artifact = artifact?;
        let mut best: Option<&Candidate> = None;
        for candidate in &artifact.candidates {
            if best.map(|b| candidate.alignment_score > b.alignment_score).unwrap_or(true) {
                best = Some(candidate);
            }
        }
        best
    }

    /// The force-exit decision emitted at the iteration ceiling.
    pub(crate) fn force_exit_decision(
        stage: StageType,
        artifact: Option<&StageArtifact>,
    ) -> DecisionResult {
        let mut explanation = Explanation::new("Maximum iterations reached.")
            .detail(format!("MAX_ITERATIONS={MAX_ITERATIONS}"));
        let mut constraints = serde_json::Map::new();
        constraints.insert("force_exit".into(), json!(true));
        let mut user_message =
            "Iteration limit reached. Please select a candidate to proceed.".to_string();
        if let Some(recommended) = Self::recommend_candidate(artifact) {
            constraints.insert("recommended_candidate_id".into(), json!(recommended.id));
            constraints.insert("recommended_title".into(), json!(recommended.title));
            constraints
                .insert("recommended_alignment_score".into(), json!(recommended.alignment_score));
            explanation = explanation
                .detail(format!("Recommended: {} - {}", recommended.id, recommended.title));
            user_message = format!(
                "Iteration limit reached. Recommended candidate {}: {}. Please confirm selection.",
                recommended.id, recommended.title
            );
        }
        DecisionResult {
            next_stage: Some(stage),
            direction: Direction::ForceExit,
            explanation,
            user_message,
            constraints,
        }
    }

    /// Finalize gate: a selected candidate in `selected` status and no
    /// unresolved blocking conflict.
    pub(crate) fn can_finalize(task: &Task, stage: StageType) -> bool {
        let Some(artifact) = task.artifact(stage) else {
            return false;
        };
        if artifact.selected_candidate_id.is_none() {
            return false;
        }
        let Some(selected) = artifact.selected_candidate() else {
            return false;
        };
        if selected.status != pbl_core::CandidateStatus::Selected {
            return false;
        }
        !task.has_unresolved_blocking(stage)
    }

    /// Next incomplete stage after `stage` in the canonical sequence.
    pub(crate) fn compute_next_stage(task: &Task, stage: StageType) -> Option<StageType> {
        pbl_core::STAGE_SEQUENCE
            .iter()
            .skip_while(|s| **s != stage)
            .skip(1)
            .find(|s| !task.completed_stages.contains(s))
            .copied()
    }

    /// Emit `stage_finalized` (and `task_completed` when nothing remains).
    pub(crate) fn finalize_stage(
        &self,
        task: Task,
        stage: StageType,
    ) -> Result<(Task, Option<StageType>), OrchestratorError> {
        let next_stage = Self::compute_next_stage(&task, stage);
        let task = self.emit_event(
            task.clone(),
            Event::new(
                task.task_id,
                Some(stage),
                self.now(),
                EventPayload::StageFinalized { next_stage },
            ),
        )?;
        if next_stage.is_none() {
            let task = self.emit_event(
                task.clone(),
                Event::new(task.task_id, Some(stage), self.now(), EventPayload::TaskCompleted {}),
            )?;
            return Ok((task, None));
        }
        Ok((task, next_stage))
    }

    /// Run validators for a stage and emit their findings as events.
    pub(crate) fn run_validators(
        &self,
        mut task: Task,
        stage: StageType,
    ) -> Result<Task, OrchestratorError> {
        let candidates = task
            .artifact(stage)
            .map(|a| a.candidates.clone())
            .unwrap_or_default();
        let mut result: ValidationResult = validate_non_empty(&candidates);

        if stage == StageType::Activity
            && !candidates.is_empty()
            && task.entry_point == EntryPoint::ToolSeed
        {
            let seed = crate::generators::tool_seed_of(&task);
            let chain = task.selected_question_chain();
            if let Some(selected) = task.selected_candidate(StageType::Activity) {
                let activity_text = selected.content_text("activity");
                result.merge(validate_activity_alignment(&seed, &chain, &activity_text));
            }
        }

        if !result.warnings.is_empty() {
            task = self.emit_event(
                task.clone(),
                Event::new(
                    task.task_id,
                    Some(stage),
                    self.now(),
                    EventPayload::WarningsRecorded { warnings: result.warnings.clone() },
                ),
            )?;
        }
        for conflict in &result.conflicts {
            task = self.emit_event(
                task.clone(),
                Event::new(
                    task.task_id,
                    Some(stage),
                    self.now(),
                    EventPayload::ConflictDetected { conflict: conflict.clone() },
                ),
            )?;
        }
        self.tracer.log_child(
            task.trace_root_id.as_deref(),
            ChildSpan::new(format!("validator:{}", stage.key()), "tool")
                .input("candidates", json!(candidates.len()))
                .output("conflicts", json!(result.conflicts.len()))
                .output("warnings", json!(result.warnings.len())),
        );
        Ok(task)
    }

    /// Raise a terminal error on the task, best effort.
    pub(crate) fn raise_error(&self, task: Task, stage: Option<StageType>, message: &str) -> Task {
        let event = Event::new(
            task.task_id,
            stage,
            self.now(),
            EventPayload::ErrorRaised { message: message.to_string() },
        );
        match self.emit_event(task.clone(), event) {
            Ok(task) => task,
            Err(err) => {
                tracing::error!(task_id = %task.task_id, error = %err, "failed to record error");
                task
            }
        }
    }
}

#[cfg(test)]
#[path = "../orchestrator_tests.rs"]
mod tests;
