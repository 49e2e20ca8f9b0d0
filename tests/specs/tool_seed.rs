// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tool-seed entry with an activity alignment conflict.

use super::support::harness;
use pbl_core::{ConflictSeverity, Direction, EntryPoint, StageType, TaskStatus};
use pbl_engine::{ActionPayload, ActionRequest, CreateTaskRequest};
use serde_json::json;

fn select_a() -> ActionRequest {
    ActionRequest {
        action: "select".into(),
        payload: ActionPayload { candidate_id: Some("A".into()), ..ActionPayload::default() },
    }
}

#[tokio::test]
async fn activity_conflict_blocks_until_resolved() {
    let h = harness();
    let envelope = h
        .api
        .create_task(CreateTaskRequest {
            entry_point: EntryPoint::ToolSeed,
            scenario: None,
            tool_seed: Some(json!({
                "tool_name": "Orange",
                "algorithms": ["KNN"],
                "affordances": ["classification"],
                "constraints": {"topic": "Test Topic", "grade": "G5", "duration": 45},
                "user_intent": "Teach classification"
            })),
        })
        .await
        .expect("create task");
    let task_id = envelope.task.task_id.to_string();
    assert_eq!(envelope.task.completed_stages, vec![StageType::ToolSeed]);
    assert_eq!(envelope.task.tool_seed.as_ref().expect("seed").tool_name, "Orange");

    // scenario → driving_question → question_chain
    for _ in 0..3 {
        let outcome = h.api.task_action(&task_id, select_a()).await.expect("select");
        assert_eq!(outcome.decision.direction, Direction::Forward);
    }
    let task = h.api.get_task(&task_id).expect("task");
    assert_eq!(task.current_stage, StageType::Activity);

    // The generated activity names neither the topic nor the chain, so
    // selecting it raises a blocking conflict.
    let outcome = h.api.task_action(&task_id, select_a()).await.expect("select");
    assert_eq!(outcome.decision.direction, Direction::Stay);
    let task = h.api.get_task(&task_id).expect("task");
    let conflicts = task.stage_conflicts(StageType::Activity);
    assert_eq!(conflicts.len(), 1);
    let conflict = &conflicts[0];
    assert_eq!(conflict.severity, ConflictSeverity::Blocking);
    assert_eq!(conflict.conflict_options.len(), 3);
    assert!(!task.is_completed(StageType::Activity));

    // Resolution unblocks and auto-finalizes the stage.
    let outcome = h
        .api
        .task_action(
            &task_id,
            ActionRequest {
                action: "resolve_conflict".into(),
                payload: ActionPayload {
                    conflict_id: Some(conflict.conflict_id.to_string()),
                    option: Some("C".into()),
                    ..ActionPayload::default()
                },
            },
        )
        .await
        .expect("resolve");
    assert_eq!(outcome.decision.direction, Direction::Forward);
    assert_eq!(outcome.decision.next_stage, Some(StageType::Experiment));

    let task = h.api.get_task(&task_id).expect("task");
    assert!(task.is_completed(StageType::Activity));
    let resolved = &task.stage_conflicts(StageType::Activity)[0];
    assert!(resolved.resolved);
    assert_eq!(resolved.resolved_option.as_deref(), Some("C"));

    // Final selection completes the task.
    h.api.task_action(&task_id, select_a()).await.expect("select");
    let task = h.api.get_task(&task_id).expect("task");
    assert_eq!(task.status, TaskStatus::Completed);
}

#[tokio::test]
async fn resolving_without_option_is_a_validation_error() {
    let h = harness();
    let envelope = h
        .api
        .create_task(CreateTaskRequest {
            entry_point: EntryPoint::Scenario,
            scenario: Some(json!("Test scenario")),
            tool_seed: None,
        })
        .await
        .expect("create task");
    let err = h
        .api
        .task_action(
            &envelope.task.task_id.to_string(),
            ActionRequest { action: "resolve_conflict".into(), payload: ActionPayload::default() },
        )
        .await
        .expect_err("should fail");
    assert!(err.to_string().contains("conflict_id and option"));
}
