// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task creation.

use super::{ActionOutcome, Orchestrator};
use crate::error::OrchestratorError;
use pbl_adapters::{ChildSpan, LmClient, LmError};
use pbl_core::{
    next_required_stage, Direction, EntryPoint, Event, EventPayload, SessionId, StageStatus,
    StageType, Task, TaskId, TaskStatus, ToolSeed,
};
use serde_json::{json, Map, Value};

impl Orchestrator {
    /// Create a task from entry data and kick off first-stage generation.
    pub async fn create_task(
        &self,
        entry_point: EntryPoint,
        entry_data: Map<String, Value>,
    ) -> Result<ActionOutcome, OrchestratorError> {
        if self.config().llm_required && !self.lm().is_configured() {
            return Err(OrchestratorError::Lm(LmError::ConfigurationMissing(
                "LLM is required but not configured".into(),
            )));
        }

        let tool_seed = match entry_point {
            EntryPoint::Scenario => {
                let scenario = entry_data.get("scenario").and_then(Value::as_str).unwrap_or("");
                if scenario.trim().is_empty() {
                    return Err(OrchestratorError::validation("Missing scenario"));
                }
                None
            }
            EntryPoint::ToolSeed => Some(
                ToolSeed::from_value(&Value::Object(entry_data.clone()))
                    .map_err(|e| OrchestratorError::validation(e.to_string()))?,
            ),
        };

        let task_id = TaskId::new();
        let session_id = SessionId::new();
        let completed_stages = match entry_point {
            EntryPoint::ToolSeed => vec![StageType::ToolSeed],
            EntryPoint::Scenario => Vec::new(),
        };
        let trace_root_id =
            self.tracer.start_root(&task_id, &entry_point.to_string(), "task_created");

        let task = Task::seed(task_id);
        let created = Event::new(
            task_id,
            None,
            self.now(),
            EventPayload::TaskCreated {
                entry_point,
                entry_data,
                tool_seed,
                current_stage: StageType::Scenario,
                completed_stages,
                status: TaskStatus::InProgress,
                stage_status: StageStatus::Initialized,
                session_id,
                trace_root_id: trace_root_id.clone(),
            },
        );
        let task = self.emit_event(task, created)?;

        let outcome = self.bootstrap(task).await;
        match &outcome {
            Ok((task, ..)) => {
                self.tracer.log_child(
                    trace_root_id.as_deref(),
                    ChildSpan::new("api:create_task", "chain")
                        .input("entry_point", json!(entry_point.to_string()))
                        .output("task_id", json!(task.task_id.to_string())),
                );
            }
            Err(err) if !err.is_validation() => {
                self.tracer.log_child(
                    trace_root_id.as_deref(),
                    ChildSpan::new("api:create_task", "chain")
                        .input("entry_point", json!(entry_point.to_string()))
                        .error(err.to_string()),
                );
                if let Some(task) = self.store.get(&task_id) {
                    self.raise_error(task, Some(StageType::Scenario), &err.to_string());
                }
            }
            Err(_) => {}
        }
        outcome
    }

    /// First decision plus first-stage candidates for a fresh task.
    async fn bootstrap(&self, task: Task) -> Result<ActionOutcome, OrchestratorError> {
        let target = next_required_stage(&task).unwrap_or(task.current_stage);
        let decision = pbl_core::make_decision(&task, Some(target), Some("create_task"));
        let task = self.emit_decision(task, &decision).await?;

        if decision.direction == Direction::Forward {
            if let Some(stage) = decision.next_stage {
                let (task, artifact) =
                    self.generate_install_validate(task, stage, None, false).await?;
                return Ok((task, decision, Some(artifact)));
            }
        }
        Ok((task, decision, None))
    }
}
