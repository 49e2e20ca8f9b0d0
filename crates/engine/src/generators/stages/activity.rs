// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Activity generator: tool-aware activity plans walking the selected
//! question chain.

use crate::generators::prompts::render;
use crate::generators::{finish_candidates, GenerateError, OptionSampler, PromptContext, PromptLibrary, StageGenerator};
use async_trait::async_trait;
use pbl_adapters::LmClient;
use pbl_core::{Candidate, Clock, StageType, Task};
use std::sync::Arc;

pub struct ActivityGenerator {
    lm: Arc<dyn LmClient>,
    prompts: Arc<PromptLibrary>,
    clock: Arc<dyn Clock>,
}

impl ActivityGenerator {
    pub fn new(lm: Arc<dyn LmClient>, prompts: Arc<PromptLibrary>, clock: Arc<dyn Clock>) -> Self {
        Self { lm, prompts, clock }
    }
}

#[async_trait]
impl StageGenerator for ActivityGenerator {
    fn stage(&self) -> StageType {
        StageType::Activity
    }

    async fn generate(
        &self,
        task: &Task,
        count: usize,
        feedback: Option<&str>,
    ) -> Result<Vec<Candidate>, GenerateError> {
        let ctx = PromptContext::for_stage(task, StageType::Activity);
        let chain = task.selected_question_chain();
        let chain_text = chain
            .iter()
            .enumerate()
            .map(|(i, q)| format!("{}. {q}", i + 1))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = render(
            &self.prompts.activity,
            &[
                ("topic", ctx.topic.as_str()),
                ("question_chain", chain_text.as_str()),
                ("tool_name", ctx.tool_name.as_str()),
                ("tool_constraints", ctx.tool_constraints.as_str()),
                ("duration", &ctx.duration.to_string()),
                ("extras", &ctx.extras_block()),
            ],
        );
        let raws = OptionSampler::new(self.lm.as_ref(), prompt, "activity")
            .sample_distinct(count, ctx.avoid_list.clone(), feedback)
            .await?;
        Ok(finish_candidates(
            raws,
            "activity",
            &["question_chain", "tool_seed"],
            &ctx,
            self.clock.now_utc(),
        ))
    }
}
