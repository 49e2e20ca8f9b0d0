// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry resolution: rules first, LM fallback, confidence gate, divergence
//! check, then per-entry-point intake.

use super::rules::{apply_keyword_rules, apply_strong_signals, has_entry_keywords, known_tool_in};
use crate::config::EngineConfig;
use crate::dialogue::divergence_score;
use crate::generators::parse::extract_json;
use crate::generators::prompts::{render, PromptLibrary};
use crate::intake::{intake_to_constraints, Intake};
use crate::validators::realism::is_realistic;
use pbl_adapters::{LmClient, LmError, LmRequest};
use pbl_core::{EntryDecision, EntryPoint, ToolSeed};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Divergence at or above this asks about updating intent first.
const DIVERGENCE_THRESHOLD: f64 = 0.6;

/// Utterances at least this long (and tool-free) become the scenario text.
const SCENARIO_TEXT_MIN_CHARS: usize = 20;

const STARTER_RETRIES: usize = 2;

/// Outcome of resolving one utterance.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatResolution {
    /// More information needed before a task can start.
    Ask { question: String },
    /// Entry resolved; hand the entry data to the orchestrator.
    Ready { entry_point: EntryPoint, entry_data: Map<String, Value>, decision: EntryDecision },
}

pub struct EntryResolver {
    lm: Arc<dyn LmClient>,
    prompts: Arc<PromptLibrary>,
    confidence_threshold: f64,
    realism_blocklist: Vec<String>,
}

impl EntryResolver {
    pub fn new(lm: Arc<dyn LmClient>, prompts: Arc<PromptLibrary>, config: &EngineConfig) -> Self {
        Self {
            lm,
            prompts,
            confidence_threshold: config.entry_confidence_threshold,
            realism_blocklist: config.realism_blocklist.clone(),
        }
    }

    /// Classify the utterance: rules at 0.95/0.75 confidence, then the LM
    /// (which also sees the recent session transcript).
    pub async fn classify(&self, text: &str, history: &str) -> Result<EntryDecision, LmError> {
        let strong = apply_strong_signals(text);
        if let Some(choice) = strong.choice {
            return Ok(EntryDecision {
                chosen_entry_point: choice,
                rules_hit: strong.hits,
                model_reason: "strong_signal".into(),
                confidence: 0.95,
            });
        }
        let keywords = apply_keyword_rules(text);
        if let Some(choice) = keywords.choice {
            let mut hits = strong.hits;
            hits.extend(keywords.hits);
            return Ok(EntryDecision {
                chosen_entry_point: choice,
                rules_hit: hits,
                model_reason: "keyword_rule".into(),
                confidence: 0.75,
            });
        }

        let mut decision = self.lm_classify(text, history).await?;
        let mut hits = strong.hits;
        hits.extend(keywords.hits);
        decision.rules_hit = hits;
        Ok(decision)
    }

    async fn lm_classify(&self, text: &str, history: &str) -> Result<EntryDecision, LmError> {
        let prompt =
            render(&self.prompts.entry_classifier, &[("text", text), ("history", history)]);
        let response = self.lm.complete(LmRequest::new(prompt)).await?;
        let data = extract_json(&response).map_err(|e| LmError::Invocation(e.to_string()))?;
        let entry_point = match data.get("entry_point").and_then(Value::as_str) {
            Some("tool_seed") => EntryPoint::ToolSeed,
            _ => EntryPoint::Scenario,
        };
        let confidence =
            data.get("confidence").and_then(Value::as_f64).unwrap_or(0.5).clamp(0.0, 1.0);
        let reason = data
            .get("reason")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or("llm_fallback")
            .to_string();
        Ok(EntryDecision {
            chosen_entry_point: entry_point,
            rules_hit: Vec::new(),
            model_reason: reason,
            confidence,
        })
    }

    /// Full resolution of one utterance against optional intake and the
    /// session's prior intent.
    pub async fn resolve(
        &self,
        text: &str,
        intake: Option<&Intake>,
        prior_intent: Option<&str>,
        history: &str,
    ) -> Result<ChatResolution, LmError> {
        if text.trim().is_empty() {
            return Ok(ChatResolution::Ask {
                question: "Would you like to start from a tool/software, or from a teaching \
                           scenario?"
                    .into(),
            });
        }

        let decision = self.classify(text, history).await?;

        if decision.confidence < self.confidence_threshold {
            return Ok(ChatResolution::Ask {
                question: "Would you like to start from a tool/software, or from a teaching \
                           scenario?"
                    .into(),
            });
        }

        if let Some(prior) = prior_intent {
            let score = divergence_score(prior, text);
            if score >= DIVERGENCE_THRESHOLD
                && decision.model_reason != "strong_signal"
                && !has_entry_keywords(text)
            {
                return Ok(ChatResolution::Ask {
                    question: "This sounds different from your earlier goal. Update the \
                               project intent first, or keep it and continue?"
                        .into(),
                });
            }
        }

        match decision.chosen_entry_point {
            EntryPoint::ToolSeed => self.resolve_tool_seed(text, intake, decision).await,
            EntryPoint::Scenario => self.resolve_scenario(text, intake, decision).await,
        }
    }

    /// Extract a tool seed via the LM (one retry), then backfill from the
    /// utterance and intake.
    async fn resolve_tool_seed(
        &self,
        text: &str,
        intake: Option<&Intake>,
        decision: EntryDecision,
    ) -> Result<ChatResolution, LmError> {
        let intake_json = intake
            .map(|i| serde_json::to_value(i).unwrap_or(Value::Null))
            .unwrap_or(Value::Null);
        let prompt = render(
            &self.prompts.tool_seed_extract,
            &[("text", text), ("intake", &intake_json.to_string())],
        );

        let mut extracted: Option<Map<String, Value>> = None;
        for _ in 0..2 {
            let Ok(response) = self.lm.complete(LmRequest::new(prompt.clone())).await else {
                continue;
            };
            if let Ok(Value::Object(map)) = extract_json(&response) {
                extracted = Some(map);
                break;
            }
        }
        let mut seed = extracted.unwrap_or_default();

        let tool_name_missing = seed
            .get("tool_name")
            .and_then(Value::as_str)
            .map(|s| s.trim().is_empty())
            .unwrap_or(true);
        if tool_name_missing {
            if let Some(tool) = known_tool_in(text) {
                seed.insert("tool_name".into(), json!(tool));
            }
        }
        let intent_missing = seed
            .get("user_intent")
            .and_then(Value::as_str)
            .map(|s| s.trim().is_empty())
            .unwrap_or(true);
        if intent_missing {
            if let Some(intake) = intake {
                if !intake.knowledge_point.trim().is_empty() {
                    seed.insert("user_intent".into(), json!(intake.knowledge_point.trim()));
                }
            }
        }
        let constraints_missing = !matches!(seed.get("constraints"), Some(Value::Object(map)) if !map.is_empty());
        if constraints_missing {
            if let Some(intake) = intake {
                let constraints = intake_to_constraints(intake);
                if !constraints.is_empty() {
                    seed.insert("constraints".into(), Value::Object(constraints));
                }
            }
        }

        match ToolSeed::from_value(&Value::Object(seed.clone())) {
            Ok(_) => Ok(ChatResolution::Ready {
                entry_point: EntryPoint::ToolSeed,
                entry_data: seed,
                decision,
            }),
            Err(_) => Ok(ChatResolution::Ask {
                question: "Which tool will the class use, and what should students learn with \
                           it?"
                    .into(),
            }),
        }
    }

    /// Use a long tool-free utterance as the scenario, otherwise synthesize
    /// a realism-gated starter scenario.
    async fn resolve_scenario(
        &self,
        text: &str,
        intake: Option<&Intake>,
        decision: EntryDecision,
    ) -> Result<ChatResolution, LmError> {
        let trimmed = text.trim();
        let scenario = if trimmed.chars().count() >= SCENARIO_TEXT_MIN_CHARS
            && known_tool_in(trimmed).is_none()
        {
            trimmed.to_string()
        } else {
            self.synthesize_starter(trimmed, intake).await
        };

        let mut entry_data = Map::new();
        entry_data.insert("scenario".into(), json!(scenario));
        if let Some(intake) = intake {
            if !intake.is_empty() {
                entry_data
                    .insert("intake".into(), serde_json::to_value(intake).unwrap_or(Value::Null));
            }
        }
        Ok(ChatResolution::Ready { entry_point: EntryPoint::Scenario, entry_data, decision })
    }

    async fn synthesize_starter(&self, text: &str, intake: Option<&Intake>) -> String {
        let topic = intake.map(|i| i.knowledge_point.trim()).unwrap_or("");
        let grade = intake.map(|i| i.age_group.trim()).unwrap_or("");
        let prompt = render(
            &self.prompts.starter_scenario,
            &[("topic", topic), ("grade_level", grade), ("text", text)],
        );
        for _ in 0..STARTER_RETRIES {
            let Ok(response) = self.lm.complete(LmRequest::new(prompt.clone())).await else {
                continue;
            };
            let candidate = response.trim();
            if !candidate.is_empty()
                && is_realistic(candidate, self.realism_blocklist.iter().map(String::as_str))
            {
                return candidate.to_string();
            }
        }
        // Deterministic fallback when synthesis keeps failing.
        let subject = if topic.is_empty() { "an everyday classroom question" } else { topic };
        format!(
            "Students investigate {subject} through a small real-world project in their own \
             school, collecting simple data and presenting what they find."
        )
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
