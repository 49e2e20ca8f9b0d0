// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chat entry resolution end to end.

use super::support::harness;
use pbl_core::{DecisionRecordKind, EntryPoint, StageType};
use pbl_engine::ChatRequest;

#[tokio::test]
async fn strong_signal_creates_a_scenario_task() {
    let h = harness();
    let response = h
        .api
        .chat(ChatRequest {
            session_id: None,
            message: "start from scenario".into(),
            task_id: None,
            intake: None,
        })
        .await
        .expect("chat");

    assert_eq!(response.status, "ready");
    assert_eq!(response.entry_point, Some(EntryPoint::Scenario));
    let decision = response.entry_decision.expect("decision");
    assert!(decision.confidence >= 0.95);
    assert!(decision.rules_hit.iter().any(|h| h.starts_with("strong:scenario:")));

    // The task exists, records the entry decision, and is already
    // generating scenario candidates.
    let task_id = response.task_id.expect("task id");
    let task = h.api.get_task(&task_id).expect("task");
    assert_eq!(task.entry_point, EntryPoint::Scenario);
    assert!(task.messages.iter().any(|m| m.entry_decision.is_some()));
    assert!(task
        .decision_history
        .iter()
        .any(|r| r.kind == DecisionRecordKind::EntryDecision));
    assert!(task.artifact(StageType::Scenario).is_some());
    // The short utterance was not used verbatim: a starter scenario was
    // synthesized instead.
    let scenario = task.entry_data.get("scenario").and_then(|v| v.as_str()).expect("scenario");
    assert!(scenario.contains("noise levels"));
}

#[tokio::test]
async fn tool_signal_extracts_a_tool_seed() {
    let h = harness();
    let response = h
        .api
        .chat(ChatRequest {
            session_id: None,
            message: "start from tool please".into(),
            task_id: None,
            intake: None,
        })
        .await
        .expect("chat");
    assert_eq!(response.status, "ready");
    assert_eq!(response.entry_point, Some(EntryPoint::ToolSeed));
    let task = h.api.get_task(&response.task_id.expect("task id")).expect("task");
    assert_eq!(task.tool_seed.as_ref().expect("seed").tool_name, "Orange");
    assert!(task.is_completed(StageType::ToolSeed));
}

#[tokio::test]
async fn sessions_thread_across_messages() {
    let h = harness();
    let first = h
        .api
        .chat(ChatRequest {
            session_id: None,
            message: "start from scenario".into(),
            task_id: None,
            intake: None,
        })
        .await
        .expect("chat");
    let second = h
        .api
        .chat(ChatRequest {
            session_id: Some(first.session_id.clone()),
            message: "start from scenario again with the garden theme".into(),
            task_id: None,
            intake: None,
        })
        .await
        .expect("chat");
    assert_eq!(first.session_id, second.session_id);
}
