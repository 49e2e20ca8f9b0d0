// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt context assembly: everything a stage generator tells the LM
//! about the task before asking for options.

use super::diversity::collect_avoid_list;
use crate::intake::{intake_to_constraints, Intake};
use pbl_core::{ConstraintMap, StageType, Task, ToolSeed};
use serde_json::Value;

/// How many recent decision-history entries feed the prompt.
const RECENT_DECISIONS: usize = 3;

/// Assembled generation context for one stage invocation.
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    pub topic: String,
    pub grade_level: String,
    pub duration: u32,
    pub context_summary: String,
    pub classroom_mode: String,
    pub classroom_context: String,
    pub tool_name: String,
    pub tool_constraints: String,
    pub knowledge_snippets: ConstraintMap,
    pub intent_summary: String,
    pub recent_decisions: Vec<String>,
    pub memory_notes: Vec<String>,
    pub avoid_list: Vec<String>,
    pub constraints_applied: Vec<String>,
}

/// The task's tool seed, or one derived from entry data when the task
/// started from a scenario.
pub fn tool_seed_of(task: &Task) -> ToolSeed {
    if let Some(seed) = &task.tool_seed {
        return seed.clone();
    }
    let entry = &task.entry_data;
    let source = match entry.get("tool_seed") {
        Some(Value::Object(map)) => map,
        _ => entry,
    };
    let mut seed = ToolSeed::default();
    if let Some(Value::String(name)) = source.get("tool_name") {
        seed.tool_name = name.clone();
    }
    if let Some(Value::Array(items)) = source.get("algorithms") {
        seed.algorithms = items.iter().filter_map(|v| v.as_str().map(String::from)).collect();
    }
    if let Some(Value::Array(items)) = source.get("affordances") {
        seed.affordances = items.iter().filter_map(|v| v.as_str().map(String::from)).collect();
    }
    match source.get("constraints") {
        Some(Value::Object(map)) => seed.constraints = map.clone(),
        _ => {
            if let Some(intake) = source.get("intake") {
                if let Ok(intake) = serde_json::from_value::<Intake>(intake.clone()) {
                    seed.constraints = intake_to_constraints(&intake);
                }
            }
        }
    }
    if let Some(Value::String(intent)) = source.get("user_intent") {
        seed.user_intent = intent.clone();
    } else if let Some(Value::String(scenario)) = source.get("scenario") {
        seed.user_intent = scenario.clone();
    } else {
        seed.user_intent = seed.constraint_str("topic");
    }
    if seed.tool_name.is_empty() {
        seed.tool_name = seed.user_intent.clone();
    }
    seed
}

impl PromptContext {
    pub fn for_stage(task: &Task, stage: StageType) -> Self {
        let seed = tool_seed_of(task);
        let knowledge_snippets = match seed.constraints.get("knowledge_snippets") {
            Some(Value::Object(map)) => map.clone(),
            _ => ConstraintMap::new(),
        };
        let context_summary = {
            let summary = seed.constraint_str("context_summary");
            if summary.is_empty() {
                seed.user_intent.clone()
            } else {
                summary
            }
        };
        let recent_decisions = task
            .decision_history
            .iter()
            .rev()
            .take(RECENT_DECISIONS)
            .map(|record| {
                format!(
                    "{}{}",
                    record.kind,
                    record.stage.map(|s| format!(" @{}", s.key())).unwrap_or_default()
                )
            })
            .collect();
        Self {
            topic: seed.topic(),
            grade_level: seed.constraint_str("grade"),
            duration: seed.duration_minutes(),
            context_summary,
            classroom_mode: {
                let mode = seed.constraint_str("classroom_mode");
                if mode.is_empty() {
                    "normal".to_string()
                } else {
                    mode
                }
            },
            classroom_context: seed.constraint_str("classroom_context"),
            tool_name: seed.tool_name.clone(),
            tool_constraints: seed.constraint_str("tool_constraints"),
            knowledge_snippets,
            intent_summary: task.creative_context.original_intent.clone(),
            recent_decisions,
            memory_notes: task.working_memory.notes.clone(),
            avoid_list: collect_avoid_list(task, stage),
            constraints_applied: seed.constraints_applied(),
        }
    }

    /// The shared "extras" prompt block: creative intent, recent decisions,
    /// working notes, classroom setting, and the avoid list.
    pub fn extras_block(&self) -> String {
        let mut lines = Vec::new();
        if !self.intent_summary.is_empty() {
            lines.push(format!("Creative intent: {}", self.intent_summary));
        }
        if !self.recent_decisions.is_empty() {
            lines.push(format!("Recent decisions: {}", self.recent_decisions.join("; ")));
        }
        if !self.memory_notes.is_empty() {
            lines.push(format!("Working notes: {}", self.memory_notes.join("; ")));
        }
        if !self.classroom_context.is_empty() {
            lines.push(format!(
                "Classroom: {} ({})",
                self.classroom_context, self.classroom_mode
            ));
        } else if self.classroom_mode != "normal" {
            lines.push(format!("Classroom mode: {}", self.classroom_mode));
        }
        for (key, value) in &self.knowledge_snippets {
            lines.push(format!("{key}: {}", pbl_core::value_to_text(value)));
        }
        if !self.avoid_list.is_empty() {
            lines.push("Avoid paraphrasing any of these previously shown options:".to_string());
            for (index, item) in self.avoid_list.iter().enumerate() {
                lines.push(format!("  {}. {item}", index + 1));
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
