// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decision messenger: turns each emitted decision into an assistant
//! message, via the LM when possible and deterministic fallbacks when not.

use crate::generators::prompts::render;
use crate::generators::{tool_seed_of, PromptLibrary};
use pbl_adapters::{LmClient, LmRequest};
use pbl_core::{DecisionResult, Direction, StageType, Task};
use std::sync::Arc;

pub struct DecisionMessenger {
    lm: Arc<dyn LmClient>,
    prompts: Arc<PromptLibrary>,
}

impl DecisionMessenger {
    pub fn new(lm: Arc<dyn LmClient>, prompts: Arc<PromptLibrary>) -> Self {
        Self { lm, prompts }
    }

    fn summarize_candidates(task: &Task, stage: StageType) -> String {
        let Some(artifact) = task.artifact(stage) else {
            return String::new();
        };
        artifact
            .candidates
            .iter()
            .map(|cand| {
                let snippet = crate::generators::parse::summarize(
                    &cand.content_text(stage.key()),
                    120,
                );
                format!("{}: {} | {snippet}", cand.id, cand.title)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn summarize_conflicts(task: &Task, stage: StageType) -> String {
        task.stage_conflicts(stage)
            .iter()
            .map(|c| format!("{}:{}", c.severity, c.summary))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Compose the assistant message for a freshly emitted decision.
    pub async fn build_message(&self, task: &Task, decision: &DecisionResult) -> String {
        let stage = task.current_stage;
        if self.lm.is_configured() {
            let seed = tool_seed_of(task);
            let candidates = Self::summarize_candidates(task, stage);
            let conflicts = Self::summarize_conflicts(task, stage);
            let grade = seed.constraint_str("grade");
            let classroom = {
                let context = seed.constraint_str("classroom_context");
                if context.is_empty() {
                    seed.constraint_str("classroom_mode")
                } else {
                    context
                }
            };
            let prompt = render(
                &self.prompts.decision_message,
                &[
                    ("direction", &decision.direction.to_string()),
                    ("next_stage", decision.next_stage.map(|s| s.key()).unwrap_or("")),
                    ("user_message", decision.user_message.as_str()),
                    ("summary", decision.explanation.summary.as_str()),
                    ("grade", if grade.is_empty() { "unknown" } else { &grade }),
                    ("classroom", if classroom.is_empty() { "unknown" } else { &classroom }),
                    ("stage", stage.key()),
                    ("candidates", if candidates.is_empty() { "none" } else { &candidates }),
                    ("conflicts", if conflicts.is_empty() { "none" } else { &conflicts }),
                ],
            );
            if let Ok(text) = self.lm.complete(LmRequest::new(prompt)).await {
                let text = text.trim();
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }
        Self::fallback(decision)
    }

    fn fallback(decision: &DecisionResult) -> String {
        match decision.direction {
            Direction::BackwardCompletion => {
                "A previous stage still needs confirmation: select one of its candidates first, \
                 then we continue."
                    .to_string()
            }
            Direction::ForceExit | Direction::Error => {
                "We cannot continue yet: resolve the highlighted issue or confirm a candidate, \
                 and I will pick up the next step."
                    .to_string()
            }
            Direction::Stay | Direction::Forward => {
                "Candidates are ready: pick the one you prefer, or tell me what to change and I \
                 will generate another round."
                    .to_string()
            }
        }
    }
}

#[cfg(test)]
#[path = "messenger_tests.rs"]
mod tests;
