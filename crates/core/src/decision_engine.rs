// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decision engine: given a task and a requested stage, decide where the
//! flow goes next.

use crate::decision::{DecisionResult, Direction, Explanation};
use crate::deps::{missing_chain, STAGE_SEQUENCE};
use crate::task::Task;
use crate::types::{StageType, TaskStatus};
use serde_json::{json, Map};

/// First stage of the canonical sequence not yet completed.
pub fn next_required_stage(task: &Task) -> Option<StageType> {
    STAGE_SEQUENCE.iter().find(|s| !task.completed_stages.contains(s)).copied()
}

/// Decide the next move for `target_stage` (defaulting to the task's
/// current stage, then the first incomplete stage).
pub fn make_decision(
    task: &Task,
    target_stage: Option<StageType>,
    requested_action: Option<&str>,
) -> DecisionResult {
    if task.status == TaskStatus::Completed {
        return DecisionResult {
            next_stage: None,
            direction: Direction::Stay,
            explanation: Explanation::new("Task already completed."),
            user_message: "Task is already completed.".into(),
            constraints: Map::new(),
        };
    }

    // current_stage is never null in this model, so the requested stage
    // always resolves.
    let stage = target_stage.unwrap_or(task.current_stage);

    let chain = match missing_chain(stage, task.entry_point, &task.completed_stages) {
        Ok(chain) => chain,
        Err(err) => {
            return DecisionResult {
                next_stage: None,
                direction: Direction::Error,
                explanation: Explanation::new(err.to_string()),
                user_message: "Dependency cycle detected. Please review the dependency table."
                    .into(),
                constraints: constraint_map("error", json!("dependency_cycle")),
            };
        }
    };

    if let Some(head) = chain.first() {
        if *head != stage {
            let labels: Vec<String> = chain.iter().map(|s| s.key().to_string()).collect();
            return DecisionResult {
                next_stage: Some(*head),
                direction: Direction::BackwardCompletion,
                explanation: Explanation::new("Missing dependencies detected.")
                    .detail(format!("Missing chain: {}", labels.join(", "))),
                user_message: "Please complete prerequisite stages first.".into(),
                constraints: constraint_map("missing_chain", json!(labels)),
            };
        }
    }

    DecisionResult {
        next_stage: Some(stage),
        direction: Direction::Forward,
        explanation: Explanation::new("Ready to proceed.")
            .detail(format!("Requested action: {}", requested_action.unwrap_or("none"))),
        user_message: "Ready to proceed.".into(),
        constraints: Map::new(),
    }
}

/// What would happen next, without acting: [`make_decision`] against the
/// task's current stage.
pub fn dry_run_next_steps(task: &Task) -> DecisionResult {
    make_decision(task, Some(task.current_stage), None)
}

fn constraint_map(key: &str, value: serde_json::Value) -> Map<String, serde_json::Value> {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    map
}

#[cfg(test)]
#[path = "decision_engine_tests.rs"]
mod tests;
