// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Experiment generator: hands-on extensions of the selected activity.

use crate::generators::prompts::render;
use crate::generators::{finish_candidates, GenerateError, OptionSampler, PromptContext, PromptLibrary, StageGenerator};
use async_trait::async_trait;
use pbl_adapters::LmClient;
use pbl_core::{Candidate, Clock, StageType, Task};
use std::sync::Arc;

pub struct ExperimentGenerator {
    lm: Arc<dyn LmClient>,
    prompts: Arc<PromptLibrary>,
    clock: Arc<dyn Clock>,
}

impl ExperimentGenerator {
    pub fn new(lm: Arc<dyn LmClient>, prompts: Arc<PromptLibrary>, clock: Arc<dyn Clock>) -> Self {
        Self { lm, prompts, clock }
    }
}

#[async_trait]
impl StageGenerator for ExperimentGenerator {
    fn stage(&self) -> StageType {
        StageType::Experiment
    }

    async fn generate(
        &self,
        task: &Task,
        count: usize,
        feedback: Option<&str>,
    ) -> Result<Vec<Candidate>, GenerateError> {
        let ctx = PromptContext::for_stage(task, StageType::Experiment);
        let activity = task
            .selected_candidate(StageType::Activity)
            .map(|c| c.content_text("activity"))
            .unwrap_or_default();
        let prompt = render(
            &self.prompts.experiment,
            &[
                ("activity", activity.as_str()),
                ("topic", ctx.topic.as_str()),
                ("duration", &ctx.duration.to_string()),
                ("extras", &ctx.extras_block()),
            ],
        );
        let raws = OptionSampler::new(self.lm.as_ref(), prompt, "experiment")
            .sample_distinct(count, ctx.avoid_list.clone(), feedback)
            .await?;
        Ok(finish_candidates(raws, "experiment", &["activity"], &ctx, self.clock.now_utc()))
    }
}
