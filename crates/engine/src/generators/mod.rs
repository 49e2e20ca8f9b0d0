// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Candidate generation: per-stage generators behind one trait, with a
//! shared distinctness-enforcing sampler.

pub mod context;
pub mod diversity;
pub mod parse;
pub mod prompts;
mod sampler;
pub mod stages;

pub use context::{tool_seed_of, PromptContext};
pub use prompts::PromptLibrary;
pub use sampler::OptionSampler;

use async_trait::async_trait;
use pbl_adapters::{LmClient, LmError};
use pbl_core::{Candidate, CandidateStatus, Clock, GenerationContext, StageType, Task};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Candidate generation failure.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Lm(#[from] LmError),
    #[error("{0}")]
    Parse(#[from] parse::ParseError),
    #[error("duplicate candidates detected")]
    Duplicates,
    #[error("insufficient candidates")]
    Insufficient,
    #[error("No generator for stage")]
    NoGenerator,
}

/// One stage's candidate generator.
#[async_trait]
pub trait StageGenerator: Send + Sync {
    fn stage(&self) -> StageType;

    async fn generate(
        &self,
        task: &Task,
        count: usize,
        feedback: Option<&str>,
    ) -> Result<Vec<Candidate>, GenerateError>;
}

/// Injected map of stage generators.
pub struct GeneratorSet {
    map: HashMap<StageType, Arc<dyn StageGenerator>>,
}

impl GeneratorSet {
    pub fn new(generators: Vec<Arc<dyn StageGenerator>>) -> Self {
        let map = generators.into_iter().map(|g| (g.stage(), g)).collect();
        Self { map }
    }

    /// The five production generators over one LM client.
    pub fn standard(
        lm: Arc<dyn LmClient>,
        prompts: Arc<PromptLibrary>,
        realism_blocklist: Arc<Vec<String>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(vec![
            Arc::new(stages::ScenarioGenerator::new(
                Arc::clone(&lm),
                Arc::clone(&prompts),
                realism_blocklist,
                Arc::clone(&clock),
            )),
            Arc::new(stages::DrivingQuestionGenerator::new(
                Arc::clone(&lm),
                Arc::clone(&prompts),
                Arc::clone(&clock),
            )),
            Arc::new(stages::QuestionChainGenerator::new(
                Arc::clone(&lm),
                Arc::clone(&prompts),
                Arc::clone(&clock),
            )),
            Arc::new(stages::ActivityGenerator::new(
                Arc::clone(&lm),
                Arc::clone(&prompts),
                Arc::clone(&clock),
            )),
            Arc::new(stages::ExperimentGenerator::new(lm, prompts, clock)),
        ])
    }

    pub fn get(&self, stage: StageType) -> Option<&Arc<dyn StageGenerator>> {
        self.map.get(&stage)
    }
}

/// Assemble raw option objects into positional candidates.
pub(crate) fn finish_candidates(
    raws: Vec<Map<String, Value>>,
    stage_key: &str,
    based_on: &[&str],
    context: &PromptContext,
    timestamp: chrono::DateTime<chrono::Utc>,
) -> Vec<Candidate> {
    let generation_context = GenerationContext {
        based_on: based_on.iter().map(|s| s.to_string()).collect(),
        constraints_applied: context.constraints_applied.clone(),
        timestamp: Some(timestamp),
    };
    raws.into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let text = parse::option_text(&raw, stage_key);
            let title = match raw.get("title").and_then(Value::as_str) {
                Some(title) if !title.trim().is_empty() => title.trim().to_string(),
                _ => default_title(stage_key, &text, index),
            };
            let mut content = Map::new();
            match raw.get(stage_key) {
                Some(value) => {
                    content.insert(stage_key.to_string(), value.clone());
                }
                None => {
                    content.insert(stage_key.to_string(), Value::String(text.clone()));
                }
            }
            // Driving questions carry their sub-question chain alongside.
            if stage_key == "driving_question" {
                if let Some(chain) = raw.get("question_chain") {
                    content.insert("question_chain".to_string(), chain.clone());
                }
            }
            Candidate {
                id: Candidate::position_id(index),
                title,
                status: CandidateStatus::Generated,
                content,
                rationale: raw
                    .get("rationale")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                derived_from: based_on.iter().map(|s| s.to_string()).collect(),
                alignment_score: raw.get("alignment_score").and_then(Value::as_f64).unwrap_or(0.0),
                generation_context: generation_context.clone(),
            }
        })
        .collect()
}

fn default_title(stage_key: &str, text: &str, index: usize) -> String {
    let first_line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    if !first_line.is_empty() {
        return parse::summarize(first_line, 60);
    }
    format!("Option {} ({stage_key})", Candidate::position_id(index))
}

#[cfg(test)]
#[path = "stages_tests.rs"]
mod stages_tests;
