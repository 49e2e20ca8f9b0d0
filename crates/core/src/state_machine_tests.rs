// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    initialized    = { StageStatus::Initialized },
    pending_choice = { StageStatus::PendingChoice },
    feedback_loop  = { StageStatus::FeedbackLoop },
    modifying      = { StageStatus::Modifying },
)]
fn open_statuses_accept_all_actions(status: StageStatus) {
    assert_eq!(allowed_actions(status).len(), 5);
    assert!(can_apply_action(status, ActionType::SelectCandidate));
    assert!(can_apply_action(status, ActionType::FinalizeStage));
    assert!(can_apply_action(status, ActionType::ResolveConflict));
}

#[test]
fn generating_only_accepts_regenerate_and_feedback() {
    assert!(can_apply_action(StageStatus::Generating, ActionType::RegenerateCandidates));
    assert!(can_apply_action(StageStatus::Generating, ActionType::ProvideFeedback));
    assert!(!can_apply_action(StageStatus::Generating, ActionType::SelectCandidate));
    assert!(!can_apply_action(StageStatus::Generating, ActionType::FinalizeStage));
    assert!(!can_apply_action(StageStatus::Generating, ActionType::ResolveConflict));
}

#[test]
fn finalized_reopens_via_feedback_or_regenerate() {
    assert!(can_apply_action(StageStatus::Finalized, ActionType::ProvideFeedback));
    assert!(can_apply_action(StageStatus::Finalized, ActionType::RegenerateCandidates));
    assert!(!can_apply_action(StageStatus::Finalized, ActionType::SelectCandidate));
    assert!(!can_apply_action(StageStatus::Finalized, ActionType::FinalizeStage));
}

#[yare::parameterized(
    below   = { MAX_ITERATIONS - 1, false },
    at      = { MAX_ITERATIONS, true },
    above   = { MAX_ITERATIONS + 1, true },
    zero    = { 0, false },
)]
fn force_exit_at_ceiling(count: u32, expected: bool) {
    assert_eq!(should_force_exit(count), expected);
}
