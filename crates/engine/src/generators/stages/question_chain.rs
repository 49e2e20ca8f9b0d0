// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Question-chain generator: three sub-questions scaffolding the selected
//! driving question.

use super::enforce_chain_shape;
use crate::generators::prompts::render;
use crate::generators::{finish_candidates, GenerateError, OptionSampler, PromptContext, PromptLibrary, StageGenerator};
use async_trait::async_trait;
use pbl_adapters::LmClient;
use pbl_core::{Candidate, Clock, StageType, Task};
use std::sync::Arc;

pub struct QuestionChainGenerator {
    lm: Arc<dyn LmClient>,
    prompts: Arc<PromptLibrary>,
    clock: Arc<dyn Clock>,
}

impl QuestionChainGenerator {
    pub fn new(lm: Arc<dyn LmClient>, prompts: Arc<PromptLibrary>, clock: Arc<dyn Clock>) -> Self {
        Self { lm, prompts, clock }
    }
}

#[async_trait]
impl StageGenerator for QuestionChainGenerator {
    fn stage(&self) -> StageType {
        StageType::QuestionChain
    }

    async fn generate(
        &self,
        task: &Task,
        count: usize,
        feedback: Option<&str>,
    ) -> Result<Vec<Candidate>, GenerateError> {
        let ctx = PromptContext::for_stage(task, StageType::QuestionChain);
        let driving_question = task
            .selected_candidate(StageType::DrivingQuestion)
            .map(|c| c.content_text("driving_question"))
            .unwrap_or_default();
        let prompt = render(
            &self.prompts.question_chain,
            &[
                ("driving_question", driving_question.as_str()),
                ("grade_level", ctx.grade_level.as_str()),
                ("context_summary", ctx.context_summary.as_str()),
                ("extras", &ctx.extras_block()),
            ],
        );
        let mut raws = OptionSampler::new(self.lm.as_ref(), prompt, "question_chain")
            .sample_distinct(count, ctx.avoid_list.clone(), feedback)
            .await?;
        for raw in &mut raws {
            enforce_chain_shape(raw);
        }
        Ok(finish_candidates(raws, "question_chain", &["driving_question"], &ctx, self.clock.now_utc()))
    }
}
