// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario generator: realism-gated classroom scenarios.

use crate::generators::prompts::render;
use crate::generators::{finish_candidates, GenerateError, OptionSampler, PromptContext, PromptLibrary, StageGenerator};
use crate::validators::realism::find_unrealistic_term;
use async_trait::async_trait;
use pbl_adapters::LmClient;
use pbl_core::{Candidate, Clock, StageType, Task};
use std::sync::Arc;

pub struct ScenarioGenerator {
    lm: Arc<dyn LmClient>,
    prompts: Arc<PromptLibrary>,
    blocklist: Arc<Vec<String>>,
    clock: Arc<dyn Clock>,
}

impl ScenarioGenerator {
    pub fn new(
        lm: Arc<dyn LmClient>,
        prompts: Arc<PromptLibrary>,
        blocklist: Arc<Vec<String>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { lm, prompts, blocklist, clock }
    }
}

#[async_trait]
impl StageGenerator for ScenarioGenerator {
    fn stage(&self) -> StageType {
        StageType::Scenario
    }

    async fn generate(
        &self,
        task: &Task,
        count: usize,
        feedback: Option<&str>,
    ) -> Result<Vec<Candidate>, GenerateError> {
        let ctx = PromptContext::for_stage(task, StageType::Scenario);
        let prompt = render(
            &self.prompts.scenario,
            &[
                ("topic", ctx.topic.as_str()),
                ("grade_level", ctx.grade_level.as_str()),
                ("duration", &ctx.duration.to_string()),
                ("context_summary", ctx.context_summary.as_str()),
                ("extras", &ctx.extras_block()),
            ],
        );
        let blocklist = Arc::clone(&self.blocklist);
        let realism = move |text: &str| {
            find_unrealistic_term(text, blocklist.iter().map(String::as_str))
                .map(|term| format!("unrealistic term: {term}"))
        };
        let raws = OptionSampler::new(self.lm.as_ref(), prompt, "scenario")
            .with_validity(&realism)
            .sample_distinct(count, ctx.avoid_list.clone(), feedback)
            .await?;
        Ok(finish_candidates(raws, "scenario", &["tool_seed"], &ctx, self.clock.now_utc()))
    }
}
