// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Candidate generation plumbing: inline generation on the action path and
//! a background worker for post-finalize scheduling.

use super::Orchestrator;
use crate::error::OrchestratorError;
use crate::generators::StageGenerator;
use pbl_adapters::ChildSpan;
use pbl_core::{Candidate, Event, EventPayload, RevisionId, StageArtifact, StageType, Task, TaskId};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;

/// How newly scheduled generation runs: inline on the calling path until
/// [`Orchestrator::start_background_generation`] hands it to a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    Immediate,
    Background,
}

/// One queued generation request.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub task_id: TaskId,
    pub stage: StageType,
    pub feedback: Option<String>,
    pub count: usize,
    pub regenerate: bool,
}

const GENERATION_QUEUE_DEPTH: usize = 64;

impl Orchestrator {
    /// Switch scheduled generation onto a background worker task.
    ///
    /// Requires a running tokio runtime; without one the orchestrator stays
    /// in immediate mode.
    pub fn start_background_generation(self: &Arc<Self>) {
        let (tx, mut rx) = mpsc::channel::<GenerationJob>(GENERATION_QUEUE_DEPTH);
        *self.generation_tx.lock() = Some(tx);
        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                if let Err(err) = orchestrator.run_generation(job.clone()).await {
                    tracing::error!(
                        task_id = %job.task_id,
                        stage = job.stage.key(),
                        error = %err,
                        "background generation failed"
                    );
                    if let Some(task) = orchestrator.store.get(&job.task_id) {
                        orchestrator.raise_error(task, Some(job.stage), &err.to_string());
                    }
                }
            }
        });
    }

    /// The currently active scheduling mode.
    pub fn generation_mode(&self) -> GenerationMode {
        if self.generation_tx.lock().is_some() {
            GenerationMode::Background
        } else {
            GenerationMode::Immediate
        }
    }

    /// Invoke the stage generator, with a trace span around the call.
    pub(crate) async fn generate_candidates(
        &self,
        task: &Task,
        stage: StageType,
        feedback: Option<&str>,
        count: usize,
    ) -> Result<Vec<Candidate>, OrchestratorError> {
        let generator = self
            .generators
            .get(stage)
            .ok_or_else(|| OrchestratorError::validation("No generator for stage"))?;
        let started = std::time::Instant::now();
        let outcome = generator.generate(task, count, feedback).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let mut span = ChildSpan::new(format!("generator:{}", stage.key()), "tool")
            .input("stage", json!(stage.key()))
            .input("feedback", json!(feedback.unwrap_or("")));
        span.elapsed_ms = Some(elapsed_ms);
        match &outcome {
            Ok(candidates) => {
                span = span.output("count", json!(candidates.len()));
            }
            Err(err) => {
                span = span.error(err.to_string());
            }
        }
        self.tracer.log_child(task.trace_root_id.as_deref(), span);
        outcome.map_err(|err| match err {
            crate::generators::GenerateError::Lm(e) => OrchestratorError::Lm(e),
            other => OrchestratorError::Generation(other.to_string()),
        })
    }

    /// Install a generated batch as a new revision and validate it.
    pub(crate) fn apply_candidates(
        &self,
        task: Task,
        stage: StageType,
        candidates: Vec<Candidate>,
        regenerate: bool,
    ) -> Result<(Task, StageArtifact), OrchestratorError> {
        let revision_id = RevisionId::new();
        let generation_context = candidates.first().map(|c| c.generation_context.clone());
        let payload = if regenerate {
            EventPayload::CandidatesRegenerated { revision_id, candidates, generation_context }
        } else {
            EventPayload::CandidatesGenerated { revision_id, candidates, generation_context }
        };
        let task = self.emit_event(
            task.clone(),
            Event::new(task.task_id, Some(stage), self.now(), payload),
        )?;
        let artifact = task
            .artifact(stage)
            .cloned()
            .ok_or_else(|| OrchestratorError::Generation("artifact missing after install".into()))?;
        Ok((task, artifact))
    }

    /// Generate + install + validate for one stage, inline.
    pub(crate) async fn generate_install_validate(
        &self,
        task: Task,
        stage: StageType,
        feedback: Option<&str>,
        regenerate: bool,
    ) -> Result<(Task, StageArtifact), OrchestratorError> {
        let count = self.config.candidate_count;
        let candidates = self.generate_candidates(&task, stage, feedback, count).await?;
        let (task, artifact) = self.apply_candidates(task, stage, candidates, regenerate)?;
        let task = self.run_validators(task, stage)?;
        Ok((task, artifact))
    }

    /// Schedule generation for a stage: inline in immediate mode, queued in
    /// background mode.
    pub(crate) async fn schedule_candidates(
        &self,
        job: GenerationJob,
    ) -> Result<(), OrchestratorError> {
        let tx = self.generation_tx.lock().clone();
        match tx {
            Some(tx) => match tx.send(job).await {
                Ok(()) => Ok(()),
                Err(send_error) => {
                    tracing::warn!("generation worker gone; running inline");
                    self.run_generation(send_error.0).await
                }
            },
            None => self.run_generation(job).await,
        }
    }

    /// Execute one generation job against the latest task state.
    pub(crate) async fn run_generation(&self, job: GenerationJob) -> Result<(), OrchestratorError> {
        let lock = self.store.write_lock(job.task_id);
        let _guard = lock.lock().await;
        let Some(task) = self.store.get(&job.task_id) else {
            return Ok(());
        };
        let candidates = self
            .generate_candidates(&task, job.stage, job.feedback.as_deref(), job.count)
            .await?;
        // Re-read: the task may have moved while the LM call ran; the
        // revision id keeps replays idempotent.
        let latest = self.store.get(&job.task_id).unwrap_or(task);
        let (task, _) = self.apply_candidates(latest, job.stage, candidates, job.regenerate)?;
        self.run_validators(task, job.stage)?;
        Ok(())
    }
}
