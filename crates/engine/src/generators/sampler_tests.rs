// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pbl_adapters::ScriptedLm;
use serde_json::json;

fn options_json(texts: &[&str]) -> String {
    let options: Vec<_> = texts
        .iter()
        .map(|t| json!({"title": t, "scenario": t}))
        .collect();
    json!({ "options": options }).to_string()
}

fn sampler<'a>(lm: &'a ScriptedLm) -> OptionSampler<'a> {
    OptionSampler::new(lm, "Generate scenarios. Feedback: {feedback}\n{format}".into(), "scenario")
}

#[tokio::test]
async fn distinct_batch_passes_through() {
    let lm = ScriptedLm::new();
    lm.push_response(options_json(&[
        "students run a market stall and track sales",
        "a weather station logs rainfall on the roof",
        "the class plans a recycling drive for the school",
    ]));
    let options = sampler(&lm).sample_distinct(3, Vec::new(), None).await.unwrap();
    assert_eq!(options.len(), 3);
    assert_eq!(lm.call_count(), 1);
}

#[tokio::test]
async fn duplicate_slot_is_replaced_with_force_rewrite() {
    let lm = ScriptedLm::new();
    lm.push_response(options_json(&[
        "students run a market stall and track sales",
        "students run a market stall and track sales",
        "the class plans a recycling drive for the school",
    ]));
    lm.push_response(options_json(&["a weather station logs rainfall on the roof"]));
    let options = sampler(&lm).sample_distinct(3, Vec::new(), None).await.unwrap();
    assert_eq!(options.len(), 3);
    let rewrite_call = &lm.calls()[1];
    assert!(rewrite_call.prompt.contains("rewrite with a clearly different angle"));
}

#[tokio::test]
async fn persistent_duplicates_fail_generation() {
    let lm = ScriptedLm::new();
    let dup = "students run a market stall and track sales";
    lm.push_response(options_json(&[dup, dup]));
    lm.push_response(options_json(&[dup]));
    lm.push_response(options_json(&[dup]));
    let err = sampler(&lm).sample_distinct(2, Vec::new(), None).await.unwrap_err();
    assert!(matches!(err, GenerateError::Duplicates));
}

#[tokio::test]
async fn avoid_list_counts_as_seen() {
    let lm = ScriptedLm::new();
    let avoided = "students run a market stall and track sales";
    lm.push_response(options_json(&[avoided]));
    lm.push_response(options_json(&[avoided]));
    lm.push_response(options_json(&[avoided]));
    let err = sampler(&lm)
        .sample_distinct(1, vec![avoided.to_string()], None)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerateError::Duplicates));
}

#[tokio::test]
async fn short_batch_fills_one_at_a_time() {
    let lm = ScriptedLm::new();
    lm.push_response(options_json(&["students run a market stall and track sales"]));
    lm.push_response(options_json(&["a weather station logs rainfall on the roof"]));
    lm.push_response(options_json(&["the class plans a recycling drive for the school"]));
    let options = sampler(&lm).sample_distinct(3, Vec::new(), None).await.unwrap();
    assert_eq!(options.len(), 3);
    assert_eq!(lm.call_count(), 3);
}

#[tokio::test]
async fn exhausted_fill_budget_fails_insufficient() {
    let lm = ScriptedLm::new();
    let only = "students run a market stall and track sales";
    lm.push_response(options_json(&[only]));
    lm.respond_with(move |_| Ok(options_json(&["students run a market stall and track sales"])));
    let err = sampler(&lm).sample_distinct(3, Vec::new(), None).await.unwrap_err();
    assert!(matches!(err, GenerateError::Insufficient));
}

#[tokio::test]
async fn validity_check_rejects_and_replaces() {
    let lm = ScriptedLm::new();
    lm.push_response(options_json(&["a wizard casts spells in class"]));
    lm.push_response(options_json(&["students run a market stall and track sales"]));
    let check: ValidityCheck =
        &|text: &str| text.contains("wizard").then(|| "unrealistic".to_string());
    let options = OptionSampler::new(
        &lm,
        "Generate scenarios. Feedback: {feedback}\n{format}".into(),
        "scenario",
    )
    .with_validity(check)
    .sample_distinct(1, Vec::new(), None)
    .await
    .unwrap();
    assert!(options[0]["scenario"].as_str().unwrap().contains("market stall"));
}

#[tokio::test]
async fn feedback_reaches_the_prompt() {
    let lm = ScriptedLm::new();
    lm.push_response(options_json(&["students run a market stall and track sales"]));
    sampler(&lm)
        .sample_distinct(1, Vec::new(), Some("Add more detail."))
        .await
        .unwrap();
    assert!(lm.calls()[0].prompt.contains("Add more detail."));
}
