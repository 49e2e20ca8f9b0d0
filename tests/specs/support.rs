// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared spec harness: a stage-aware scripted LM and an api built over
//! temp-dir persistence.

use pbl_adapters::{LmRequest, ScriptedLm, TraceManager};
use pbl_core::FakeClock;
use pbl_engine::{Api, EngineConfig, EventBus, Orchestrator, OrchestratorDeps};
use pbl_storage::{JsonPersistence, TaskStore};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

pub struct SpecHarness {
    pub api: Api,
    pub persistence: Arc<JsonPersistence>,
    _dir: TempDir,
}

/// Deterministic, always-distinct option text.
pub fn distinct_text(seed: usize) -> String {
    const TOPICS: [&str; 8] = [
        "rainfall on the school roof",
        "fruit sales at the market stall",
        "noise levels in the corridor",
        "plant growth in the window boxes",
        "waste sorting in the canteen",
        "foot traffic at the library",
        "temperatures across the classroom",
        "battery use of the class tablets",
    ];
    const FRAMES: [&str; 3] = [
        "Students {v} {t} over two weeks",
        "The class will {v} {t} and present findings",
        "Groups {v} {t} using a shared notebook",
    ];
    const VERBS: [&str; 5] = ["measure", "chart", "compare", "survey", "log"];
    FRAMES[seed % FRAMES.len()]
        .replace("{v}", VERBS[seed % VERBS.len()])
        .replace("{t}", TOPICS[seed % TOPICS.len()])
}

/// A scripted LM that answers every engine prompt with valid, distinct
/// payloads.
pub fn stage_aware_lm() -> Arc<ScriptedLm> {
    let lm = Arc::new(ScriptedLm::new());
    let counter = Arc::new(AtomicUsize::new(0));
    lm.respond_with(move |req: &LmRequest| {
        let prompt = req.prompt.as_str();
        let stage_key = if prompt.starts_with("You design realistic project-based learning scenarios")
        {
            Some("scenario")
        } else if prompt.starts_with("You write driving questions") {
            Some("driving_question")
        } else if prompt.starts_with("You decompose driving questions") {
            Some("question_chain")
        } else if prompt.starts_with("You design classroom activities") {
            Some("activity")
        } else if prompt.starts_with("You design hands-on experiments") {
            Some("experiment")
        } else if prompt.starts_with("You classify how a course-design task should start") {
            return Ok(json!({
                "entry_point": "scenario",
                "confidence": 0.7,
                "reason": "descriptive utterance"
            })
            .to_string());
        } else if prompt.starts_with("Write one short, realistic classroom scenario") {
            return Ok(
                "Students map the noise levels around their school and propose quiet zones."
                    .to_string(),
            );
        } else if prompt.starts_with("Extract a tool seed") {
            return Ok(json!({
                "tool_name": "Orange",
                "algorithms": ["KNN"],
                "affordances": ["classification"],
                "constraints": {},
                "user_intent": "Teach classification"
            })
            .to_string());
        } else if prompt.starts_with("You distill creative intent") {
            return Ok(json!({
                "intent": "teach data collection",
                "key_constraints": ["grade:G5"],
                "anchor_concepts": ["data"],
                "needs_confirmation": false,
                "question": null,
                "summary": "Data collection unit"
            })
            .to_string());
        } else {
            None
        };
        if let Some(stage_key) = stage_key {
            let count = if prompt.contains("Produce exactly 1 options") { 1 } else { 3 };
            let options: Vec<serde_json::Value> = (0..count)
                .map(|_| {
                    let seed = counter.fetch_add(1, Ordering::Relaxed);
                    let text = distinct_text(seed);
                    match stage_key {
                        "driving_question" => json!({
                            "title": format!("Option {seed}"),
                            "driving_question": format!("How can we understand {text}?"),
                            "question_chain": [
                                format!("What is known about {text}?"),
                                format!("How do we collect data on {text}?"),
                                format!("What do results say about {text}?"),
                            ],
                            "alignment_score": (seed % 10) as f64 / 10.0,
                        }),
                        "question_chain" => json!({
                            "title": format!("Option {seed}"),
                            "question_chain": [
                                format!("What is {text}?"),
                                format!("How do we measure {text}?"),
                                format!("What changes {text}?"),
                            ],
                            "alignment_score": (seed % 10) as f64 / 10.0,
                        }),
                        other => json!({
                            "title": format!("Option {seed}"),
                            other: text,
                            "alignment_score": (seed % 10) as f64 / 10.0,
                        }),
                    }
                })
                .collect();
            return Ok(json!({ "options": options }).to_string());
        }
        Ok("Candidates are ready; pick one or ask for changes.".to_string())
    });
    lm
}

pub fn harness() -> SpecHarness {
    harness_with(EngineConfig::default())
}

pub fn harness_with(config: EngineConfig) -> SpecHarness {
    let dir = tempfile::tempdir().expect("tempdir");
    let clock = FakeClock::new();
    clock.set_epoch_ms(1_700_000_000_000);
    let lm = stage_aware_lm();
    let persistence = Arc::new(JsonPersistence::open(dir.path()).expect("persistence"));
    let orchestrator = Orchestrator::new(OrchestratorDeps {
        store: Arc::new(TaskStore::new()),
        persistence: Arc::clone(&persistence),
        bus: Arc::new(EventBus::new()),
        lm: lm.clone(),
        clock: Arc::new(clock.clone()),
        tracer: Arc::new(TraceManager::disabled()),
        config,
    });
    SpecHarness { api: Api::new(orchestrator), persistence, _dir: dir }
}
