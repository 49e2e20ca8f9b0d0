// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Driving-question generator: one open question plus a three-step
//! sub-question chain.

use super::enforce_chain_shape;
use crate::generators::prompts::render;
use crate::generators::{finish_candidates, GenerateError, OptionSampler, PromptContext, PromptLibrary, StageGenerator};
use async_trait::async_trait;
use pbl_adapters::LmClient;
use pbl_core::{Candidate, Clock, StageType, Task};
use std::sync::Arc;

pub struct DrivingQuestionGenerator {
    lm: Arc<dyn LmClient>,
    prompts: Arc<PromptLibrary>,
    clock: Arc<dyn Clock>,
}

impl DrivingQuestionGenerator {
    pub fn new(lm: Arc<dyn LmClient>, prompts: Arc<PromptLibrary>, clock: Arc<dyn Clock>) -> Self {
        Self { lm, prompts, clock }
    }
}

#[async_trait]
impl StageGenerator for DrivingQuestionGenerator {
    fn stage(&self) -> StageType {
        StageType::DrivingQuestion
    }

    async fn generate(
        &self,
        task: &Task,
        count: usize,
        feedback: Option<&str>,
    ) -> Result<Vec<Candidate>, GenerateError> {
        let ctx = PromptContext::for_stage(task, StageType::DrivingQuestion);
        let scenario = task
            .selected_candidate(StageType::Scenario)
            .map(|c| c.content_text("scenario"))
            .unwrap_or_default();
        let prompt = render(
            &self.prompts.driving_question,
            &[
                ("scenario", scenario.as_str()),
                ("grade_level", ctx.grade_level.as_str()),
                ("context_summary", ctx.context_summary.as_str()),
                ("extras", &ctx.extras_block()),
            ],
        );
        let mut raws = OptionSampler::new(self.lm.as_ref(), prompt, "driving_question")
            .sample_distinct(count, ctx.avoid_list.clone(), feedback)
            .await?;
        for raw in &mut raws {
            enforce_chain_shape(raw);
        }
        Ok(finish_candidates(raws, "driving_question", &["scenario"], &ctx, self.clock.now_utc()))
    }
}
