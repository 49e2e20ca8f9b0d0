// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn frozen_preserves_selected() {
    let selected = Candidate::builder().status(CandidateStatus::Selected).build();
    assert_eq!(selected.frozen().status, CandidateStatus::Selected);
    let generated = Candidate::builder().build();
    assert_eq!(generated.frozen().status, CandidateStatus::Frozen);
}

#[test]
fn content_text_reads_stage_key() {
    let mut content = Map::new();
    content.insert("scenario".into(), json!("A market stall sells fruit."));
    let cand = Candidate::builder().content(content).build();
    assert_eq!(cand.content_text("scenario"), "A market stall sells fruit.");
}

#[test]
fn content_text_joins_lists() {
    let mut content = Map::new();
    content.insert("question_chain".into(), json!(["Q1?", "Q2?", "Q3?"]));
    let cand = Candidate::builder().content(content).build();
    assert_eq!(cand.content_text("question_chain"), "Q1? Q2? Q3?");
    assert_eq!(cand.question_chain(), vec!["Q1?", "Q2?", "Q3?"]);
}

#[test]
fn content_text_falls_back_to_whole_map() {
    let mut content = Map::new();
    content.insert("activity".into(), json!("Build a classifier."));
    let cand = Candidate::builder().content(content).build();
    let text = cand.content_text("scenario");
    assert!(text.contains("Build a classifier."));
}

#[test]
fn empty_content_is_empty_text() {
    let cand = Candidate::builder().build();
    assert_eq!(cand.content_text("scenario"), "");
    assert!(cand.question_chain().is_empty());
}

#[yare::parameterized(
    first  = { 0, "A" },
    second = { 1, "B" },
    third  = { 2, "C" },
)]
fn position_ids_are_letters(index: usize, expected: &str) {
    assert_eq!(Candidate::position_id(index), expected);
}

#[test]
fn serde_defaults_tolerate_sparse_json() {
    let cand: Candidate =
        serde_json::from_value(json!({"id": "A", "title": "t", "status": "generated"})).unwrap();
    assert_eq!(cand.alignment_score, 0.0);
    assert!(cand.generation_context.timestamp.is_none());
}
