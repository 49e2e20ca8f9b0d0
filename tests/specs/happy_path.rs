// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario entry, happy path: five selections complete the task.

use super::support::harness;
use pbl_core::{Direction, EntryPoint, StageStatus, StageType, TaskStatus};
use pbl_engine::{ActionPayload, ActionRequest, CreateTaskRequest};
use serde_json::json;

fn select_a() -> ActionRequest {
    ActionRequest {
        action: "select".into(),
        payload: ActionPayload { candidate_id: Some("A".into()), ..ActionPayload::default() },
    }
}

#[tokio::test]
async fn scenario_entry_runs_to_completion() {
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
    let task_id = envelope.task.task_id.to_string();
    let stages = [
        StageType::Scenario,
        StageType::DrivingQuestion,
        StageType::QuestionChain,
        StageType::Activity,
        StageType::Experiment,
    ];

    let mut subscription = h.api.subscribe(&task_id).expect("subscribe");

    for (index, stage) in stages.iter().enumerate() {
        let task = h.api.get_task(&task_id).expect("task");
        assert_eq!(task.current_stage, *stage, "stage {index}");
        let artifact = task.artifact(*stage).expect("artifact");
        assert_eq!(artifact.stage, *stage);
        assert_eq!(artifact.status, StageStatus::PendingChoice);
        assert!(artifact.candidates.iter().any(|c| c.id == "A"));

        let outcome = h.api.task_action(&task_id, select_a()).await.expect("select");
        if index + 1 == stages.len() {
            assert_eq!(outcome.decision.direction, Direction::Stay);
            assert!(outcome.current_stage_artifact.is_none());
        } else {
            assert_eq!(outcome.decision.direction, Direction::Forward);
        }
    }

    let task = h.api.get_task(&task_id).expect("task");
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.completed_stages, stages.to_vec());

    // Exactly-one-selection invariant across every artifact.
    for artifact in task.artifacts.values() {
        assert!(artifact.selection_consistent());
    }

    // The progress projection reflects completion.
    let progress = h.api.progress(&task_id).expect("progress");
    assert_eq!(progress.status, TaskStatus::Completed);
    assert_eq!(progress.completed_stages.len(), 5);

    // The plan assembles every selected stage.
    let plan = h.api.plan(&task_id).expect("plan");
    assert!(!plan.scenario.is_empty());
    assert!(!plan.driving_question.is_empty());
    assert_eq!(plan.question_chain.len(), 3);
    assert!(!plan.activity.is_empty());
    assert!(!plan.experiment.is_empty());

    // The bus delivered an ordered stream including completion.
    let mut kinds = Vec::new();
    while let Some(event) = subscription.try_recv() {
        kinds.push(event.kind().to_string());
    }
    assert!(kinds.iter().any(|k| k == "task_completed"));
    let selections: Vec<usize> = kinds
        .iter()
        .enumerate()
        .filter_map(|(i, k)| (k == "candidate_selected").then_some(i))
        .collect();
    assert_eq!(selections.len(), 5);
    assert!(selections.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn event_log_replays_to_the_snapshot() {
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
    let task_id = envelope.task.task_id;
    for _ in 0..5 {
        h.api.task_action(&task_id, select_a()).await.expect("select");
    }

    let snapshot = h.persistence.load_snapshot(&task_id).expect("read").expect("snapshot");
    let replayed = h.persistence.replay_task(task_id).expect("read").expect("replay");
    similar_asserts::assert_eq!(replayed, snapshot);

    // And the persisted JSON uses string enum values and ISO timestamps.
    let events = h.persistence.load_events(&task_id).expect("events");
    assert!(!events.is_empty());
    let raw = serde_json::to_value(&events[0]).expect("event json");
    assert_eq!(raw["type"], "task_created");
    assert!(raw["timestamp"].as_str().expect("ts").contains('T'));
}
