// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Distinctness-enforcing option sampling shared by all stage generators.
//!
//! The incoming batch is screened against a rolling seen set (primed with
//! the stage's avoid list) and a stage validity check. Duplicates and
//! invalid options are replaced one at a time with `force_rewrite`
//! re-invocations; a slot that stays duplicate after the per-slot retries
//! fails the whole generation.

use super::parse::{extract_json, normalize_options, option_text};
use super::{diversity, GenerateError};
use pbl_adapters::{LmClient, LmRequest};
use serde_json::{Map, Value};

/// Re-invocations allowed for one duplicate slot.
const RETRIES_PER_SLOT: usize = 2;

/// Validity check for one option's primary text. `Some(reason)` rejects.
pub type ValidityCheck<'a> = &'a (dyn Fn(&str) -> Option<String> + Send + Sync);

/// Batch/single option fetcher bound to one rendered stage prompt.
pub struct OptionSampler<'a> {
    lm: &'a dyn LmClient,
    /// Prompt with `{feedback}` and `{format}` placeholders still open.
    prompt_template: String,
    stage_key: &'static str,
    validity: Option<ValidityCheck<'a>>,
}

impl<'a> OptionSampler<'a> {
    pub fn new(lm: &'a dyn LmClient, prompt_template: String, stage_key: &'static str) -> Self {
        Self { lm, prompt_template, stage_key, validity: None }
    }

    pub fn with_validity(mut self, check: ValidityCheck<'a>) -> Self {
        self.validity = Some(check);
        self
    }

    fn render(&self, count: usize, feedback: &str) -> String {
        let format = super::PromptLibrary::options_format(self.stage_key, count);
        self.prompt_template
            .replace("{feedback}", if feedback.is_empty() { "none" } else { feedback })
            .replace("{format}", &format)
    }

    async fn fetch(&self, count: usize, feedback: &str) -> Result<Vec<Map<String, Value>>, GenerateError> {
        let response = self.lm.complete(LmRequest::new(self.render(count, feedback))).await?;
        let payload = extract_json(&response)?;
        Ok(normalize_options(&payload)?)
    }

    async fn fetch_one(
        &self,
        feedback: &str,
        seen: &[String],
        force_rewrite: bool,
    ) -> Result<Option<Map<String, Value>>, GenerateError> {
        let mut full_feedback = String::from(feedback);
        if force_rewrite {
            if !full_feedback.is_empty() {
                full_feedback.push_str("; ");
            }
            full_feedback.push_str("rewrite with a clearly different angle");
        }
        if !seen.is_empty() {
            full_feedback.push_str("; avoid paraphrasing: ");
            full_feedback.push_str(&seen.join(" | "));
        }
        Ok(self.fetch(1, &full_feedback).await?.into_iter().next())
    }

    fn reject_reason(&self, text: &str, seen: &[String]) -> Option<String> {
        if let Some(check) = self.validity {
            if let Some(reason) = check(text) {
                return Some(reason);
            }
        }
        diversity::is_duplicate(text, seen).then(|| "duplicate".to_string())
    }

    /// Produce exactly `count` distinct, valid options.
    pub async fn sample_distinct(
        &self,
        count: usize,
        avoid: Vec<String>,
        feedback: Option<&str>,
    ) -> Result<Vec<Map<String, Value>>, GenerateError> {
        let feedback = feedback.unwrap_or("");
        let mut seen = avoid;
        let mut accepted: Vec<Map<String, Value>> = Vec::new();

        let batch = self.fetch(count, feedback).await?;
        for option in batch {
            if accepted.len() >= count {
                break;
            }
            let text = option_text(&option, self.stage_key);
            if self.reject_reason(&text, &seen).is_none() {
                seen.push(text);
                accepted.push(option);
                continue;
            }
            // Replace this slot with up to RETRIES_PER_SLOT rewrites.
            let mut replaced = false;
            for _ in 0..RETRIES_PER_SLOT {
                let Some(retry) = self.fetch_one(feedback, &seen, true).await? else {
                    continue;
                };
                let retry_text = option_text(&retry, self.stage_key);
                if self.reject_reason(&retry_text, &seen).is_none() {
                    seen.push(retry_text);
                    accepted.push(retry);
                    replaced = true;
                    break;
                }
            }
            if !replaced {
                return Err(GenerateError::Duplicates);
            }
        }

        // The batch came back short: fill one at a time on a hard budget.
        let mut budget = 2 * count;
        while accepted.len() < count {
            if budget == 0 {
                return Err(GenerateError::Insufficient);
            }
            budget -= 1;
            let Some(option) = self.fetch_one(feedback, &seen, false).await? else {
                continue;
            };
            let text = option_text(&option, self.stage_key);
            if self.reject_reason(&text, &seen).is_none() {
                seen.push(text);
                accepted.push(option);
            }
        }

        Ok(accepted)
    }
}

#[cfg(test)]
#[path = "sampler_tests.rs"]
mod tests;
