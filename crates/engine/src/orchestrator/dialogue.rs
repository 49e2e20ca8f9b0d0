// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dialogue-driven mutations: intent updates, creative-context merges, and
//! free-standing messages, all through the event funnel.

use super::Orchestrator;
use crate::dialogue::IntentExtraction;
use crate::error::OrchestratorError;
use pbl_core::{Event, EventPayload, Message, Task};

impl Orchestrator {
    /// Replace the task's creative intent (explicit edit or confirmed
    /// revision).
    pub async fn update_intent(
        &self,
        task_id: &str,
        intent: &str,
        trigger: &str,
        user_confirmed: bool,
    ) -> Result<Task, OrchestratorError> {
        let task = self.get_task(task_id)?;
        let lock = self.store().write_lock(task.task_id);
        let _guard = lock.lock().await;
        let task = self.get_task(task_id)?;
        self.emit_event(
            task.clone(),
            Event::new(
                task.task_id,
                None,
                self.now(),
                EventPayload::IntentUpdated {
                    intent: intent.to_string(),
                    trigger: trigger.to_string(),
                    user_confirmed,
                },
            ),
        )
    }

    /// Merge an intent extraction into the task's creative context.
    pub async fn update_creative_context(
        &self,
        task_id: &str,
        extraction: &IntentExtraction,
    ) -> Result<Task, OrchestratorError> {
        let task = self.get_task(task_id)?;
        let lock = self.store().write_lock(task.task_id);
        let _guard = lock.lock().await;
        let task = self.get_task(task_id)?;
        let intent = (!extraction.intent.is_empty()).then(|| extraction.intent.clone());
        self.emit_event(
            task.clone(),
            Event::new(
                task.task_id,
                None,
                self.now(),
                EventPayload::CreativeContextUpdated {
                    intent,
                    key_constraints: extraction.key_constraints.clone(),
                    anchor_concepts: extraction.anchor_concepts.clone(),
                    summary: extraction.summary.clone(),
                },
            ),
        )
    }

    /// Append a message to the task transcript.
    pub async fn append_message(
        &self,
        task_id: &str,
        message: Message,
    ) -> Result<Task, OrchestratorError> {
        let task = self.get_task(task_id)?;
        let lock = self.store().write_lock(task.task_id);
        let _guard = lock.lock().await;
        let task = self.get_task(task_id)?;
        let stage = message.stage;
        self.emit_event(
            task.clone(),
            Event::new(
                task.task_id,
                stage,
                self.now(),
                EventPayload::MessageEmitted { message },
            ),
        )
    }
}
