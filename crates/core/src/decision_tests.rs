// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[yare::parameterized(
    forward  = { Direction::Forward, "forward" },
    backward = { Direction::BackwardCompletion, "backward_completion" },
    stay     = { Direction::Stay, "stay" },
    error    = { Direction::Error, "error" },
    force    = { Direction::ForceExit, "force_exit" },
)]
fn direction_roundtrips(direction: Direction, wire: &str) {
    let json = serde_json::to_string(&direction).unwrap();
    assert_eq!(json, format!("\"{wire}\""));
    let back: Direction = serde_json::from_str(&json).unwrap();
    assert_eq!(back, direction);
}

#[test]
fn forward_helper_sets_stage() {
    let decision = DecisionResult::forward(StageType::Activity, "Ready to proceed.");
    assert_eq!(decision.direction, Direction::Forward);
    assert_eq!(decision.next_stage, Some(StageType::Activity));
}

#[test]
fn constraint_builder_appends() {
    let decision = DecisionResult::stay("Finalize conditions not met.", "Stay put.")
        .constraint("force_exit", json!(true))
        .constraint("recommended_candidate_id", json!("B"));
    assert_eq!(decision.constraints["force_exit"], json!(true));
    assert_eq!(decision.constraints["recommended_candidate_id"], json!("B"));
}

#[test]
fn record_kind_wire_names() {
    assert_eq!(
        serde_json::to_string(&DecisionRecordKind::CreativeContextUpdated).unwrap(),
        "\"creative_context_updated\""
    );
    assert_eq!(DecisionRecordKind::ClarificationRequested.to_string(), "clarification_requested");
}
