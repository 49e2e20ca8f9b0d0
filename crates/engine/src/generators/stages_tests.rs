// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::stages::*;
use super::*;
use pbl_adapters::ScriptedLm;
use pbl_core::{CandidateStatus, FakeClock, StageArtifact, ToolSeed};
use serde_json::json;

fn clock() -> Arc<dyn Clock> {
    let clock = FakeClock::new();
    clock.set_epoch_ms(1_700_000_000_000);
    Arc::new(clock)
}

fn seeded_task() -> Task {
    let mut seed = ToolSeed::builder().build();
    seed.constraints.insert("topic".into(), json!("Test Topic"));
    seed.constraints.insert("grade".into(), json!("G5"));
    seed.constraints.insert("duration".into(), json!(45));
    Task::builder()
        .entry_point(pbl_core::EntryPoint::ToolSeed)
        .tool_seed(seed)
        .completed_stages(vec![StageType::ToolSeed])
        .build()
}

fn with_selected(task: &mut Task, stage: StageType, key: &str, value: serde_json::Value) {
    let mut content = serde_json::Map::new();
    content.insert(key.into(), value);
    let candidate = pbl_core::Candidate::builder()
        .id("A")
        .status(CandidateStatus::Selected)
        .content(content)
        .build();
    task.artifacts.insert(
        stage,
        StageArtifact::builder()
            .stage(stage)
            .candidates(vec![candidate])
            .selected_candidate_id("A")
            .build(),
    );
}

fn scenario_options() -> String {
    json!({"options": [
        {"title": "Market stall", "scenario": "Students run a market stall and track daily fruit sales.", "alignment_score": 0.8},
        {"title": "Weather station", "scenario": "The class builds a rooftop weather station and logs rainfall.", "alignment_score": 0.6},
        {"title": "Recycling drive", "scenario": "Students organize a school-wide recycling drive and weigh the results.", "alignment_score": 0.7},
    ]})
    .to_string()
}

#[tokio::test]
async fn scenario_generator_emits_positional_candidates() {
    let lm = Arc::new(ScriptedLm::new());
    lm.push_response(scenario_options());
    let generator = ScenarioGenerator::new(
        lm.clone(),
        Arc::new(PromptLibrary::default()),
        Arc::new(vec!["magic".into(), "wizard".into()]),
        clock(),
    );
    let candidates = generator.generate(&seeded_task(), 3, None).await.unwrap();
    assert_eq!(candidates.len(), 3);
    assert_eq!(candidates[0].id, "A");
    assert_eq!(candidates[1].id, "B");
    assert_eq!(candidates[2].id, "C");
    assert!(candidates.iter().all(|c| c.status == CandidateStatus::Generated));
    assert_eq!(candidates[0].derived_from, vec!["tool_seed"]);
    assert_eq!(candidates[0].alignment_score, 0.8);
    assert!(candidates[0].generation_context.timestamp.is_some());
    assert!(candidates[0]
        .generation_context
        .constraints_applied
        .iter()
        .any(|c| c == "topic:Test Topic"));
    // The prompt carried the tool-seed topic.
    assert!(lm.calls()[0].prompt.contains("Test Topic"));
}

#[tokio::test]
async fn scenario_generator_replaces_unrealistic_candidates() {
    let lm = Arc::new(ScriptedLm::new());
    lm.push_response(
        json!({"options": [
            {"title": "Wizard school", "scenario": "A wizard teaches spells to students."},
        ]})
        .to_string(),
    );
    lm.push_response(
        json!({"options": [
            {"title": "Market stall", "scenario": "Students run a market stall and track daily sales."},
        ]})
        .to_string(),
    );
    let generator = ScenarioGenerator::new(
        lm.clone(),
        Arc::new(PromptLibrary::default()),
        Arc::new(vec!["wizard".into()]),
        clock(),
    );
    let candidates = generator.generate(&seeded_task(), 1, None).await.unwrap();
    assert!(candidates[0].content_text("scenario").contains("market stall"));
}

#[tokio::test]
async fn driving_question_generator_enforces_three_sub_questions() {
    let lm = Arc::new(ScriptedLm::new());
    lm.push_response(
        json!({"options": [
            {"title": "How do sales work?", "driving_question": "How can students predict tomorrow's fruit sales?", "question_chain": ["What data do we have?"]},
        ]})
        .to_string(),
    );
    let mut task = seeded_task();
    with_selected(&mut task, StageType::Scenario, "scenario", json!("Students run a market stall."));
    let generator =
        DrivingQuestionGenerator::new(lm.clone(), Arc::new(PromptLibrary::default()), clock());
    let candidates = generator.generate(&task, 1, None).await.unwrap();
    let chain = candidates[0].question_chain();
    assert_eq!(chain.len(), 3);
    assert_eq!(chain[0], "What data do we have?");
    assert!(chain[1].starts_with("TBD"));
    // The selected scenario reached the prompt.
    assert!(lm.calls()[0].prompt.contains("market stall"));
}

#[tokio::test]
async fn question_chain_generator_truncates_long_chains() {
    let lm = Arc::new(ScriptedLm::new());
    lm.push_response(
        json!({"options": [
            {"title": "Chain", "question_chain": ["q1?", "q2?", "q3?", "q4?", "q5?"]},
        ]})
        .to_string(),
    );
    let mut task = seeded_task();
    with_selected(
        &mut task,
        StageType::DrivingQuestion,
        "driving_question",
        json!("How can students predict sales?"),
    );
    let generator =
        QuestionChainGenerator::new(lm.clone(), Arc::new(PromptLibrary::default()), clock());
    let candidates = generator.generate(&task, 1, None).await.unwrap();
    assert_eq!(candidates[0].question_chain(), vec!["q1?", "q2?", "q3?"]);
}

#[tokio::test]
async fn activity_generator_feeds_chain_and_tool() {
    let lm = Arc::new(ScriptedLm::new());
    lm.push_response(
        json!({"options": [
            {"title": "Classify fruit", "activity": "Using Orange, students classify fruit by sweetness."},
        ]})
        .to_string(),
    );
    let mut task = seeded_task();
    with_selected(
        &mut task,
        StageType::QuestionChain,
        "question_chain",
        json!(["q1?", "q2?", "q3?"]),
    );
    let generator = ActivityGenerator::new(lm.clone(), Arc::new(PromptLibrary::default()), clock());
    let candidates = generator.generate(&task, 1, None).await.unwrap();
    assert_eq!(candidates[0].derived_from, vec!["question_chain", "tool_seed"]);
    let prompt = &lm.calls()[0].prompt;
    assert!(prompt.contains("1. q1?"));
    assert!(prompt.contains("Orange"));
}

#[tokio::test]
async fn experiment_generator_builds_on_activity() {
    let lm = Arc::new(ScriptedLm::new());
    lm.push_response(
        json!({"options": [
            {"title": "Sweetness test", "experiment": "Students measure sugar content with a refractometer."},
        ]})
        .to_string(),
    );
    let mut task = seeded_task();
    with_selected(&mut task, StageType::Activity, "activity", json!("Classify fruit with Orange."));
    let generator =
        ExperimentGenerator::new(lm.clone(), Arc::new(PromptLibrary::default()), clock());
    let candidates = generator.generate(&task, 1, None).await.unwrap();
    assert_eq!(candidates[0].derived_from, vec!["activity"]);
    assert!(lm.calls()[0].prompt.contains("Classify fruit with Orange."));
}

#[tokio::test]
async fn generator_set_standard_covers_all_stages() {
    let set = GeneratorSet::standard(
        Arc::new(ScriptedLm::new()),
        Arc::new(PromptLibrary::default()),
        Arc::new(vec![]),
        clock(),
    );
    for stage in pbl_core::STAGE_SEQUENCE {
        assert!(set.get(stage).is_some(), "missing generator for {stage}");
    }
    assert!(set.get(StageType::ToolSeed).is_none());
}

#[test]
fn enforce_chain_shape_parses_string_chains() {
    let mut raw = serde_json::Map::new();
    raw.insert("question_chain".into(), json!("1. first?\n2. second?\n3. third?\n4. fourth?"));
    enforce_chain_shape(&mut raw);
    let chain = raw["question_chain"].as_array().unwrap();
    assert_eq!(chain.len(), 3);
    assert_eq!(chain[0], "first?");
}
