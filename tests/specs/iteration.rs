// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Feedback regeneration and the iteration ceiling.

use super::support::harness;
use pbl_core::{Direction, EntryPoint, StageType, MAX_ITERATIONS};
use pbl_engine::{ActionPayload, ActionRequest, CreateTaskRequest};
use serde_json::json;

async fn scenario_task(h: &super::support::SpecHarness) -> String {
    let envelope = h
        .api
        .create_task(CreateTaskRequest {
            entry_point: EntryPoint::Scenario,
            scenario: Some(json!("Test scenario")),
            tool_seed: None,
        })
        .await
        .expect("create task");
    envelope.task.task_id.to_string()
}

#[tokio::test]
async fn feedback_increments_iteration_count_by_one() {
    let h = harness();
    let task_id = scenario_task(&h).await;
    let before = h
        .api
        .get_task(&task_id)
        .expect("task")
        .artifact(StageType::Scenario)
        .expect("artifact")
        .iteration_count;

    let outcome = h
        .api
        .task_action(
            &task_id,
            ActionRequest {
                action: "feedback".into(),
                payload: ActionPayload {
                    stage: Some(StageType::Scenario),
                    feedback: Some("Add more detail.".into()),
                    ..ActionPayload::default()
                },
            },
        )
        .await
        .expect("feedback");
    let artifact = outcome.current_stage_artifact.expect("artifact");
    assert_eq!(artifact.iteration_count, before + 1);
    // A fresh revision replaced the batch; the old one is in history.
    assert!(artifact.history.iter().any(|s| s.reason == "candidates_regenerated"));
    assert!(artifact.history.iter().any(|s| s.reason == "feedback"));
}

#[tokio::test]
async fn ceiling_switches_to_force_exit() {
    let h = harness();
    let task_id = scenario_task(&h).await;
    let regenerate = || ActionRequest {
        action: "regenerate".into(),
        payload: ActionPayload::default(),
    };

    for round in 0..MAX_ITERATIONS {
        let outcome = h.api.task_action(&task_id, regenerate()).await.expect("regenerate");
        assert_ne!(outcome.decision.direction, Direction::ForceExit, "round {round}");
    }

    let outcome = h.api.task_action(&task_id, regenerate()).await.expect("final call");
    assert_eq!(outcome.decision.direction, Direction::ForceExit);
    assert_eq!(outcome.decision.constraints["force_exit"], json!(true));
    assert!(outcome
        .decision
        .constraints
        .get("recommended_candidate_id")
        .and_then(|v| v.as_str())
        .is_some());
    assert!(outcome.decision.constraints.contains_key("recommended_title"));

    // Feedback at the ceiling also force-exits instead of regenerating.
    let outcome = h
        .api
        .task_action(
            &task_id,
            ActionRequest {
                action: "feedback".into(),
                payload: ActionPayload {
                    feedback: Some("One more try?".into()),
                    ..ActionPayload::default()
                },
            },
        )
        .await
        .expect("feedback");
    assert_eq!(outcome.decision.direction, Direction::ForceExit);
    let task = h.api.get_task(&task_id).expect("task");
    assert_eq!(
        task.artifact(StageType::Scenario).expect("artifact").iteration_count,
        MAX_ITERATIONS
    );
}
